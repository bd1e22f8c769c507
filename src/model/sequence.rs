//! Sequence types: what the catalog recommends and what a run tracks.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::CallRecord;

/// A recommended multi-step outreach sequence. Immutable once selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceDefinition {
    pub name: String,
    pub steps: Vec<StepTemplate>,

    /// Number of contact attempts (every non-wait step).
    pub touchpoints: u32,
}

impl SequenceDefinition {
    /// Calendar length of the sequence, in days.
    pub fn span_days(&self) -> u32 {
        self.steps.iter().map(|s| s.offset_days).max().unwrap_or(0)
    }
}

/// One step of a definition, independent of how the run executes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepTemplate {
    pub kind: TouchKind,

    /// Days after the first touch.
    pub offset_days: u32,
    pub description: String,
}

/// Mode-independent kind of touch in a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TouchKind {
    Email,
    PhoneCall,
    Wait,
}

/// How a sequence runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunMode {
    /// Unattended, email-only.
    Automated,

    /// Operator sends every email and places every call.
    Manual,
}

impl RunMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Automated => "automated",
            Self::Manual => "manual",
        }
    }
}

/// Where a run stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunStatus {
    NotStarted,
    AwaitingModeChoice,
    Running,
    Completed,
}

/// A sequence being executed against the deal's confirmed contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceRun {
    pub definition: SequenceDefinition,

    /// `None` until the run leaves `AwaitingModeChoice`.
    pub mode: Option<RunMode>,
    pub status: RunStatus,

    /// Empty until a mode is chosen; step kinds depend on the mode.
    #[serde(default)]
    pub steps: Vec<StepInstance>,
    pub current_step_index: usize,

    /// When step 1 completed. Every `scheduled_at` is measured from here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_at: Option<Timestamp>,

    /// Replies received from the contact. Steps scheduled at or after the
    /// first reply never advance on a tick.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<Reply>,
}

impl SequenceRun {
    /// When the first reply arrived, if any.
    pub fn paused_at(&self) -> Option<Timestamp> {
        self.replies.iter().map(|r| r.received_at).min()
    }

    /// The single `Active` step, if any.
    pub fn active_step(&self) -> Option<(usize, &StepInstance)> {
        self.steps
            .iter()
            .enumerate()
            .find(|(_, s)| s.status == StepStatus::Active)
    }
}

/// A concrete step of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInstance {
    pub kind: StepKind,
    pub status: StepStatus,
    pub description: String,
    pub offset_days: u32,

    /// `reference_at + offset_days`; unknown until step 1 completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<Timestamp>,

    /// Draft or sent text. For calls, a summary of the outcome.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call: Option<CallRecord>,
}

impl StepInstance {
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, StepStatus::Done | StepStatus::Skipped)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    AutoEmail,
    ManualEmail,
    PhoneCall,
    Wait,
}

impl StepKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::AutoEmail => "auto email",
            Self::ManualEmail => "manual email",
            Self::PhoneCall => "phone call",
            Self::Wait => "wait",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepStatus {
    Pending,

    /// Actionable: a draft awaiting send, or a call ready to place.
    Active,
    Done,
    Skipped,
}

/// A reply from the contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub content: String,
    pub received_at: Timestamp,
}
