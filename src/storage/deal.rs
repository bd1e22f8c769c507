//! Deal storage: create, load, update, and list deals.

use std::{fs, io};

use uuid::Uuid;

use crate::model::Deal;

use super::{Result, Storage, StorageError};

impl Storage {
    /// Creates a new deal, writing its record to disk.
    pub fn create_deal(&self, deal: &Deal) -> Result<()> {
        let dir = self.deal_dir(deal.id);
        if dir.exists() {
            return Err(StorageError::DealAlreadyExists(deal.id));
        }
        fs::create_dir_all(&dir)?;
        let json = serde_json::to_string_pretty(deal)?;
        fs::write(dir.join("deal.json"), json)?;
        Ok(())
    }

    /// Replaces a deal's record on disk.
    ///
    /// Written to a temporary file first and renamed into place, so a
    /// reader never sees a half-written deal.
    pub fn update_deal(&self, deal: &Deal) -> Result<()> {
        let dir = self.deal_dir(deal.id);
        let path = dir.join("deal.json");
        if !path.exists() {
            return Err(StorageError::DealNotFound(deal.id));
        }
        let json = serde_json::to_string_pretty(deal)?;
        let tmp = dir.join("deal.json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Loads a single deal.
    pub fn load_deal(&self, id: Uuid) -> Result<Deal> {
        let path = self.deal_dir(id).join("deal.json");
        if !path.exists() {
            return Err(StorageError::DealNotFound(id));
        }
        let json = fs::read_to_string(path)?;
        let deal: Deal = serde_json::from_str(&json)?;
        if deal.id != id {
            return Err(StorageError::Corrupt(format!(
                "deal directory {id} holds deal {}",
                deal.id
            )));
        }
        Ok(deal)
    }

    /// Lists all deals, oldest first.
    ///
    /// Directories without a readable `deal.json` are skipped.
    pub fn list_deals(&self) -> Result<Vec<Deal>> {
        let mut deals = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(deals),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let path = entry?.path().join("deal.json");
            if !path.is_file() {
                continue;
            }
            let Ok(json) = fs::read_to_string(&path) else {
                continue;
            };
            match serde_json::from_str::<Deal>(&json) {
                Ok(deal) => deals.push(deal),
                Err(e) => log::warn!("skipping {}: {e}", path.display()),
            }
        }
        deals.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(deals)
    }
}
