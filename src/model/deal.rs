//! Deal types: the unit of work for outreach.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CallSession, Contact, SequenceRun, Signal};

/// A prospective deal and everything outreach knows about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: Uuid,
    pub title: String,

    /// Estimated deal value in whole dollars.
    pub value: u64,
    pub stage: DealStage,

    /// The rep who owns the deal. Signs generated emails.
    pub owner: String,

    /// Account name.
    pub company: String,

    /// The building project the deal is attached to.
    pub project: String,
    pub phase: ProjectPhase,
    pub product: ProductType,
    pub created_at: Timestamp,

    /// Every signal recorded against the deal, in arrival order.
    #[serde(default)]
    pub signals: Vec<Signal>,

    pub profile: OutreachProfile,
}

/// Pipeline stage. Outreach only drives deals in `Outreach`, but the stage
/// is carried so the deal record stays whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DealStage {
    Prospecting,
    Outreach,
    Engaged,
    ClosedWon,
    ClosedLost,
}

/// Design and construction phase of the underlying project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectPhase {
    Planning,
    SchematicDesign,
    DesignDevelopment,
    ConstructionDocuments,
    Construction,
}

impl ProjectPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::SchematicDesign => "schematic design",
            Self::DesignDevelopment => "design development",
            Self::ConstructionDocuments => "construction documents",
            Self::Construction => "construction",
        }
    }
}

/// Product line being sold into the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductType {
    Flooring,
    Acoustics,
    Furniture,
    Lighting,
    Other,
}

impl ProductType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Flooring => "flooring",
            Self::Acoustics => "acoustics",
            Self::Furniture => "furniture",
            Self::Lighting => "lighting",
            Self::Other => "other",
        }
    }
}

/// Outreach state for one deal. Owned exclusively by the deal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutreachProfile {
    pub readiness_status: ReadinessStatus,
    pub readiness_reason: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_triggers: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_contact: Option<Contact>,

    /// The contact a newly discovered one replaced. Restored on decline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displaced_contact: Option<Contact>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_run: Option<SequenceRun>,

    /// At most one open call per deal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_session: Option<CallSession>,
}

impl OutreachProfile {
    /// A fresh profile: not ready, with the given primary contact (if any).
    pub fn new(primary_contact: Option<Contact>) -> Self {
        Self {
            readiness_status: ReadinessStatus::NotReady,
            readiness_reason: String::new(),
            ready_triggers: None,
            primary_contact,
            displaced_contact: None,
            sequence_run: None,
            call_session: None,
        }
    }

    /// Whether the operator owes a confirm/decline decision on the contact.
    pub fn confirmation_pending(&self) -> bool {
        self.primary_contact
            .as_ref()
            .is_some_and(Contact::awaiting_confirmation)
    }

    /// Whether a sequence run is waiting for the operator to pick a mode.
    pub fn mode_choice_pending(&self) -> bool {
        self.sequence_run
            .as_ref()
            .is_some_and(|run| run.status == super::RunStatus::AwaitingModeChoice)
    }
}

/// Whether outreach is timely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReadinessStatus {
    NotReady,
    Ready,
}
