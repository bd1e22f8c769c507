//! Contact and company lookup.
//!
//! Read-only from outreach's point of view. The bundled implementation reads
//! a JSON file of the form:
//!
//! ```text
//! { "contacts": [ { "id": "...", "name": "...", "role": "...", "company": "..." } ],
//!   "companies": [ { "id": "...", "name": "..." } ] }
//! ```

use std::{fs, io, path::Path};

use serde::Deserialize;

use crate::model::{Company, Contact};

/// Errors that can occur while loading a directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Looks up contacts and companies by id.
pub trait Directory {
    fn find_contact(&self, id: &str) -> Option<Contact>;

    fn find_company(&self, id: &str) -> Option<Company>;
}

/// A directory held in memory, loaded from JSON.
#[derive(Debug, Default, Deserialize)]
pub struct JsonDirectory {
    #[serde(default)]
    contacts: Vec<Contact>,

    #[serde(default)]
    companies: Vec<Company>,
}

impl JsonDirectory {
    pub fn new(contacts: Vec<Contact>, companies: Vec<Company>) -> Self {
        Self {
            contacts,
            companies,
        }
    }

    /// Load a directory file. A missing file is an empty directory.
    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let json = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&json)?)
    }
}

impl Directory for JsonDirectory {
    /// Directory entries are never new or confirmed; those flags belong to
    /// a deal's copy of the contact.
    fn find_contact(&self, id: &str) -> Option<Contact> {
        self.contacts.iter().find(|c| c.id == id).map(|c| Contact {
            is_new: false,
            confirmed: false,
            ..c.clone()
        })
    }

    fn find_company(&self, id: &str) -> Option<Company> {
        self.companies.iter().find(|c| c.id == id).cloned()
    }
}
