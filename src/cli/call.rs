//! Phone call commands for the active call step.

use std::fs;
use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};
use uuid::Uuid;

use crate::directory::Directory;
use crate::model::CallOutcome;
use crate::service::{self, Applied, Outreach};
use crate::transport::Transport;

#[derive(Debug, Subcommand)]
pub enum CallCommand {
    /// Place the call for the active phone call step.
    Start,

    /// Record how the call went. Only once per call.
    Outcome {
        #[arg(value_enum)]
        outcome: OutcomeArg,
    },

    /// Finish the call and log it onto the step.
    End {
        /// What to remember from the call.
        #[arg(long, default_value = "")]
        notes: String,

        /// Transcript text. Only kept for connected calls.
        #[arg(long, conflicts_with = "transcript_file")]
        transcript: Option<String>,

        /// Read the transcript from a file.
        #[arg(long)]
        transcript_file: Option<PathBuf>,
    },

    /// Hang up without logging. Only before an outcome is recorded.
    Cancel,
}

/// CLI-facing call outcome, mapped to the domain `CallOutcome`.
#[derive(Debug, Clone, ValueEnum)]
pub enum OutcomeArg {
    /// Reached the contact and talked.
    Success,
    /// Left a voicemail.
    Voicemail,
    /// Nobody picked up.
    NoAnswer,
}

impl OutcomeArg {
    fn to_domain(&self) -> CallOutcome {
        match self {
            Self::Success => CallOutcome::Success,
            Self::Voicemail => CallOutcome::Voicemail,
            Self::NoAnswer => CallOutcome::NoAnswer,
        }
    }
}

pub(super) fn run<D: Directory, T: Transport>(
    svc: &Outreach<'_, D, T>,
    id: Uuid,
    command: CallCommand,
) -> Result<service::Result<Applied>, String> {
    Ok(match command {
        CallCommand::Start => svc.start_call(id),
        CallCommand::Outcome { outcome } => svc.set_call_outcome(id, outcome.to_domain()),
        CallCommand::End {
            notes,
            transcript,
            transcript_file,
        } => {
            let transcript = match transcript_file {
                Some(path) => Some(
                    fs::read_to_string(&path)
                        .map_err(|e| format!("failed to read {}: {e}", path.display()))?,
                ),
                None => transcript,
            };
            svc.end_call(id, &notes, transcript.as_deref())
        }
        CallCommand::Cancel => svc.cancel_call(id),
    })
}
