//! Phone call types: the live session and the summary left behind.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// An open phone call against the active `PhoneCall` step.
///
/// Discarded when the call ends; only its [`CallRecord`] survives,
/// attached to the step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSession {
    /// Index of the owning step in the run.
    pub step_index: usize,

    /// Set exactly once per call.
    pub outcome: Option<CallOutcome>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub voicemail_message: String,

    /// Handle the transport returned when the call was placed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,

    pub started_at: Timestamp,
}

/// How a call went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallOutcome {
    /// Reached the contact and talked.
    Success,

    /// Left a voicemail.
    Voicemail,

    /// Nobody picked up and no message was left.
    NoAnswer,
}

impl CallOutcome {
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "connected",
            Self::Voicemail => "left voicemail",
            Self::NoAnswer => "no answer",
        }
    }
}

/// What a finished call leaves on its step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub outcome: CallOutcome,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub transcript: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub voicemail_message: String,

    /// Draft follow-up generated after a connected call. Empty otherwise.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub follow_up_email: String,

    pub started_at: Timestamp,
    pub ended_at: Timestamp,
}
