//! Signals: discovered external facts about a project.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::Contact;

/// A discovered external fact, e.g. "first renderings published".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub description: String,
    pub kind: SignalKind,
    pub observed_at: Timestamp,

    /// Where the signal was found. Cited when the assistant explains readiness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    /// A contact surfaced alongside the signal (e.g. the architect named
    /// on the published renderings).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
}

/// Whether a signal bears on readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignalKind {
    /// A project milestone that justifies outreach.
    Milestone,

    /// Context only; never changes readiness.
    Informational,
}
