//! Outreach configuration.
//!
//! Loaded from `~/.outreach/config.toml`. A missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Outreach configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// The owner for new deals when `--as` and `OUTREACH_OWNER` are absent.
    pub default_owner: Option<String>,

    /// Pause before printing assistant responses, in milliseconds.
    pub response_delay_ms: u64,

    /// Contact directory JSON file. Defaults to `~/.outreach/directory.json`.
    pub directory: Option<PathBuf>,
}

impl Config {
    /// Load config from `~/.outreach/config.toml`.
    pub fn load() -> Result<Self, String> {
        let path = Self::path().ok_or("could not determine home directory")?;
        Self::load_from(&path)
    }

    /// Load config from an explicit path. Returns defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.outreach/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".outreach").join("config.toml"))
    }

    /// The directory file to load, configured or default.
    pub fn directory_path(&self) -> Option<PathBuf> {
        self.directory.clone().or_else(|| {
            dirs::home_dir().map(|h| h.join(".outreach").join("directory.json"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config.default_owner, None);
        assert_eq!(config.response_delay_ms, 0);
    }

    #[test]
    fn reads_kebab_case_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "default-owner = \"jordan\"\n\
             response-delay-ms = 400\n\
             directory = \"/tmp/contacts.json\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.default_owner.as_deref(), Some("jordan"));
        assert_eq!(config.response_delay_ms, 400);
        assert_eq!(
            config.directory_path(),
            Some(PathBuf::from("/tmp/contacts.json"))
        );
    }

    #[test]
    fn invalid_toml_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "response-delay-ms = \"soon\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.contains("config.toml"));
    }
}
