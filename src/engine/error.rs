//! Engine errors. Every variant leaves the deal unchanged.
//!
//! The engine never reaches a transport, so delivery failures surface from
//! the service as `ServiceError::Transport`.

/// Errors that can occur when applying a command to a deal.
#[derive(Debug, thiserror::Error)]
pub enum OutreachError {
    /// The command is not valid in the deal's current state.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// The command targets a step of the wrong kind or status.
    #[error("invalid step: {0}")]
    InvalidStep(String),

    /// A call cannot end before its outcome is chosen.
    #[error("call outcome required before ending the call")]
    OutcomeRequired,

    #[error("precondition failed: {0}")]
    PreconditionFailed(String),
}

pub type Result<T> = core::result::Result<T, OutreachError>;
