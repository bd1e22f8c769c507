//! Contacts and companies as the directory hands them to us.

use serde::{Deserialize, Serialize};

/// A person at a prospective account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Directory id (e.g. `"c-sarah-chen"`).
    pub id: String,
    pub name: String,

    /// Free-text job title, e.g. "Principal Architect".
    pub role: String,
    pub company: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Set when a readiness signal surfaced this contact and the operator
    /// has not yet confirmed or declined it. Drives the "new" badge.
    #[serde(default)]
    pub is_new: bool,

    /// Terminal once set.
    #[serde(default)]
    pub confirmed: bool,
}

impl Contact {
    /// Whether the operator still owes a confirm/decline decision.
    pub fn awaiting_confirmation(&self) -> bool {
        self.is_new && !self.confirmed
    }

    /// The address outgoing mail is sent to: email when known, else the name.
    pub fn address(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.name)
    }

    /// First name for salutations.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

/// A company record from the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}
