//! Core data model for outreach.
//!
//! These types are plain data: deals, contacts, signals, sequences, calls,
//! and chat turns. All behavior lives in the engine; nothing here mutates
//! state on its own.

mod call;
mod chat;
mod contact;
mod deal;
mod sequence;
mod signal;

pub use call::{CallOutcome, CallRecord, CallSession};
pub use chat::{ChatRole, ChatTurn, SourceLink};
pub use contact::{Company, Contact};
pub use deal::{Deal, DealStage, OutreachProfile, ProductType, ProjectPhase, ReadinessStatus};
pub use sequence::{
    Reply, RunMode, RunStatus, SequenceDefinition, SequenceRun, StepInstance, StepKind,
    StepStatus, StepTemplate, TouchKind,
};
pub use signal::{Signal, SignalKind};
