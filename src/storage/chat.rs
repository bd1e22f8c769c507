//! Chat log storage: the append-only assistant conversation for a deal.

use std::{fs, io};

// Traits must be in scope for `.lines()` on BufReader and `.write_all()` on File.
use io::{BufRead, Write};

use uuid::Uuid;

use crate::model::ChatTurn;

use super::{Result, Storage, StorageError};

impl Storage {
    /// Appends a turn to a deal's chat log.
    pub fn append_turn(&self, deal_id: Uuid, turn: &ChatTurn) -> Result<()> {
        let dir = self.deal_dir(deal_id);
        if !dir.exists() {
            return Err(StorageError::DealNotFound(deal_id));
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("chat.jsonl"))?;
        let mut line = serde_json::to_string(turn)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Loads a deal's chat log, oldest turn first.
    ///
    /// Returns an empty vec if nothing has been said yet.
    pub fn load_chat(&self, deal_id: Uuid) -> Result<Vec<ChatTurn>> {
        let dir = self.deal_dir(deal_id);
        let path = dir.join("chat.jsonl");
        if !path.exists() {
            if !dir.exists() {
                return Err(StorageError::DealNotFound(deal_id));
            }
            return Ok(Vec::new());
        }
        let file = fs::File::open(path)?;
        let reader = io::BufReader::new(file);
        let mut turns = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if !line.is_empty() {
                turns.push(serde_json::from_str(&line)?);
            }
        }
        Ok(turns)
    }
}
