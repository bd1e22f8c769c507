//! Notes and favorites, kept in the key-value store rather than on the deal.
//!
//! Values are JSON: a list of notes under `notes:<deal id>`, and a list of
//! deal ids under `favorites`.

use clap::Subcommand;
use jiff::Timestamp;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::directory::Directory;
use crate::model::Deal;
use crate::service::Outreach;
use crate::storage::Store;
use crate::transport::Transport;

use super::format;

const FAVORITES_KEY: &str = "favorites";

#[derive(Debug, Subcommand)]
pub enum NoteCommand {
    /// Add a note to the deal.
    Add { text: String },

    /// Print the deal's notes, oldest first.
    Show,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Note {
    text: String,
    at: Timestamp,
}

pub(super) fn run<D: Directory, T: Transport>(
    store: &impl Store,
    svc: &Outreach<'_, D, T>,
    deal_id: Uuid,
    command: NoteCommand,
) -> Result<(), String> {
    match command {
        NoteCommand::Add { text } => {
            add_note(store, deal_id, &text, svc.now())?;
            eprintln!("Note added");
            Ok(())
        }
        NoteCommand::Show => {
            let notes: Vec<Note> = read(store, &notes_key(deal_id))?;
            if notes.is_empty() {
                println!("No notes");
            }
            for note in &notes {
                println!("{}  {}", note.at.strftime("%Y-%m-%d %H:%M"), note.text);
            }
            Ok(())
        }
    }
}

/// Toggle the deal in favorites.
pub(super) fn cmd_favorite(store: &impl Store, deal: &Deal) -> Result<(), String> {
    if toggle_favorite(store, deal.id)? {
        eprintln!("Deal {} added to favorites", format::short_id(deal.id));
    } else {
        eprintln!("Deal {} removed from favorites", format::short_id(deal.id));
    }
    Ok(())
}

pub(super) fn cmd_favorites<D: Directory, T: Transport>(
    store: &impl Store,
    svc: &Outreach<'_, D, T>,
) -> Result<(), String> {
    let ids: Vec<Uuid> = read(store, FAVORITES_KEY)?;
    if ids.is_empty() {
        println!("No favorites");
        return Ok(());
    }
    for id in ids {
        match svc.deal(id) {
            Ok(deal) => println!("{}", format::format_deal_line(&deal)),
            Err(e) => log::warn!("favorite {id} skipped: {e}"),
        }
    }
    Ok(())
}

fn add_note(store: &impl Store, deal_id: Uuid, text: &str, at: Timestamp) -> Result<(), String> {
    let key = notes_key(deal_id);
    let mut notes: Vec<Note> = read(store, &key)?;
    notes.push(Note {
        text: text.to_string(),
        at,
    });
    write(store, &key, &notes)
}

/// Returns whether the deal is a favorite afterwards.
fn toggle_favorite(store: &impl Store, deal_id: Uuid) -> Result<bool, String> {
    let mut ids: Vec<Uuid> = read(store, FAVORITES_KEY)?;
    let added = if let Some(pos) = ids.iter().position(|id| *id == deal_id) {
        ids.remove(pos);
        false
    } else {
        ids.push(deal_id);
        true
    };
    write(store, FAVORITES_KEY, &ids)?;
    Ok(added)
}

fn notes_key(deal_id: Uuid) -> String {
    format!("notes:{deal_id}")
}

/// Read a JSON value, treating a missing key as the default.
fn read<V: DeserializeOwned + Default>(store: &impl Store, key: &str) -> Result<V, String> {
    let Some(bytes) = store
        .get(key)
        .map_err(|e| format!("failed to read {key}: {e}"))?
    else {
        return Ok(V::default());
    };
    serde_json::from_slice(&bytes).map_err(|e| format!("corrupt value at {key}: {e}"))
}

fn write<V: Serialize>(store: &impl Store, key: &str, value: &V) -> Result<(), String> {
    let bytes = serde_json::to_vec(value).map_err(|e| format!("failed to encode {key}: {e}"))?;
    store
        .set(key, &bytes)
        .map_err(|e| format!("failed to write {key}: {e}"))
}
