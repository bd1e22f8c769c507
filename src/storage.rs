//! Local persistence for deals, chat logs, and the key-value store.
//!
//! Each deal lives in its own directory under the storage root:
//!
//! ```text
//! <root>/<uuid>/
//!   deal.json      # Deal record, outreach profile included
//!   chat.jsonl     # Append-only assistant chat log
//! ```
//!
//! The key-value [`Store`] is a single `SQLite` file kept next to the deals.

mod chat;
mod deal;
mod store;

use std::{fs, io, path::PathBuf};

use uuid::Uuid;

pub use store::{SqliteStore, Store};

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("deal not found: {0}")]
    DealNotFound(Uuid),

    #[error("deal already exists: {0}")]
    DealAlreadyExists(Uuid),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("corrupt data: {0}")]
    Corrupt(String),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// Local file-based storage for deals and their chat logs.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Creates a new storage instance rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Returns the default storage root: `~/.outreach/deals/`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".outreach").join("deals"))
    }

    fn deal_dir(&self, id: Uuid) -> PathBuf {
        self.root.join(id.to_string())
    }
}
