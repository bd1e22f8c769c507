//! Phone call sub-workflow for the active `PhoneCall` step.
//!
//! `Closed → Active → OutcomeChosen → Closed(recorded)`. A session opens on
//! [`start_call`], takes exactly one outcome, and closes on [`end_call`]
//! (recorded onto the step) or [`cancel_call`] (before any outcome, leaving
//! the step ready to call again).

use jiff::Timestamp;

use crate::model::{CallOutcome, CallRecord, CallSession, Deal, RunStatus, StepKind, StepStatus};

use super::error::{OutreachError, Result};
use super::{Effect, compose, run};

/// Open a call against the active phone call step.
pub fn start_call(deal: &mut Deal, now: Timestamp) -> Result<Vec<Effect>> {
    if deal.profile.call_session.is_some() {
        return Err(OutreachError::InvalidTransition(
            "a call is already in progress".to_string(),
        ));
    }
    let Some(run) = deal
        .profile
        .sequence_run
        .as_ref()
        .filter(|r| r.status == RunStatus::Running)
    else {
        return Err(OutreachError::InvalidTransition(
            "no running sequence to call from".to_string(),
        ));
    };
    let step_index = match run.active_step() {
        Some((index, step)) if step.kind == StepKind::PhoneCall => index,
        Some((_, step)) => {
            return Err(OutreachError::InvalidStep(format!(
                "active step is a {}, not a phone call",
                step.kind.label()
            )));
        }
        None => {
            return Err(OutreachError::InvalidStep(
                "no phone call is ready yet".to_string(),
            ));
        }
    };
    let contact = deal
        .profile
        .primary_contact
        .clone()
        .filter(|c| c.confirmed)
        .ok_or_else(|| {
            OutreachError::PreconditionFailed("calls require a confirmed contact".to_string())
        })?;

    deal.profile.call_session = Some(CallSession {
        step_index,
        outcome: None,
        voicemail_message: String::new(),
        handle: None,
        started_at: now,
    });
    log::debug!("deal {}: call opened on step {}", deal.id, step_index + 1);
    Ok(vec![Effect::PlaceCall { contact }])
}

/// Choose the call's outcome. Only once per call.
///
/// A voicemail outcome generates the message to leave.
pub fn set_outcome(deal: &mut Deal, outcome: CallOutcome) -> Result<()> {
    let voicemail = match (&deal.profile.primary_contact, outcome) {
        (Some(contact), CallOutcome::Voicemail) => compose::voicemail(deal, contact),
        _ => String::new(),
    };
    let session = open_session(deal)?;
    if let Some(existing) = session.outcome {
        return Err(OutreachError::InvalidTransition(format!(
            "call outcome already recorded as '{}'",
            existing.label()
        )));
    }
    session.outcome = Some(outcome);
    session.voicemail_message = voicemail;
    Ok(())
}

/// Close the call, recording its summary onto the step and marking it done.
///
/// A connected call also yields a follow-up email draft, which becomes the
/// next step's draft right away when that step is a manual email.
pub fn end_call(
    deal: &mut Deal,
    notes: &str,
    transcript: Option<&str>,
    now: Timestamp,
) -> Result<CallRecord> {
    let session = open_session(deal)?.clone();
    let Some(outcome) = session.outcome else {
        return Err(OutreachError::OutcomeRequired);
    };
    let transcript = transcript.unwrap_or_default().trim();
    if !transcript.is_empty() && outcome != CallOutcome::Success {
        return Err(OutreachError::PreconditionFailed(format!(
            "a transcript is only kept for connected calls (outcome was '{}')",
            outcome.label()
        )));
    }

    let follow_up_email = match (&deal.profile.primary_contact, outcome) {
        (Some(contact), CallOutcome::Success) => {
            compose::call_follow_up(deal, contact, transcript, notes).render()
        }
        _ => String::new(),
    };
    let record = CallRecord {
        outcome,
        notes: notes.trim().to_string(),
        transcript: transcript.to_string(),
        voicemail_message: session.voicemail_message,
        follow_up_email,
        started_at: session.started_at,
        ended_at: now,
    };

    let Some(run) = deal.profile.sequence_run.as_mut() else {
        return Err(OutreachError::InvalidTransition(
            "call has no sequence to record onto".to_string(),
        ));
    };
    let Some(step) = run
        .steps
        .get_mut(session.step_index)
        .filter(|s| s.status == StepStatus::Active)
    else {
        return Err(OutreachError::InvalidStep(
            "the call's step is no longer active".to_string(),
        ));
    };
    step.content = summarize(&record);
    step.status = StepStatus::Done;
    step.completed_at = Some(now);
    step.call = Some(record.clone());

    if outcome == CallOutcome::Success {
        run::activate_now(run, session.step_index + 1, record.follow_up_email.clone());
    }
    run::refresh(run);
    deal.profile.call_session = None;
    log::debug!("deal {}: call ended ({})", deal.id, outcome.label());
    Ok(record)
}

/// Close the call without recording anything. Only before an outcome is set.
pub fn cancel_call(deal: &mut Deal) -> Result<()> {
    let session = open_session(deal)?;
    if let Some(outcome) = session.outcome {
        return Err(OutreachError::InvalidTransition(format!(
            "outcome '{}' is already recorded; end the call instead",
            outcome.label()
        )));
    }
    deal.profile.call_session = None;
    Ok(())
}

fn open_session(deal: &mut Deal) -> Result<&mut CallSession> {
    deal.profile
        .call_session
        .as_mut()
        .ok_or_else(|| OutreachError::InvalidTransition("no call in progress".to_string()))
}

/// One-paragraph summary stored as the step's content.
fn summarize(record: &CallRecord) -> String {
    let mut summary = format!("Call outcome: {}.", record.outcome.label());
    if !record.notes.is_empty() {
        summary.push_str("\nNotes: ");
        summary.push_str(&record.notes);
    }
    if !record.transcript.is_empty() {
        summary.push_str("\nTranscript:\n");
        summary.push_str(&record.transcript);
    }
    if !record.voicemail_message.is_empty() {
        summary.push_str("\nVoicemail: ");
        summary.push_str(&record.voicemail_message);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::SignedDuration;

    use crate::engine::{Command, apply, testing};
    use crate::model::RunMode;

    fn day_three() -> Timestamp {
        testing::t0() + SignedDuration::from_hours(72)
    }

    /// A manual run whose day-three phone call is ready.
    fn ready_to_call() -> Deal {
        let t0 = testing::t0();
        let mut deal = testing::deal();
        for (command, at) in [
            (Command::RecordSignal(testing::renderings_signal()), t0),
            (Command::Confirm, t0),
            (Command::SelectMode(RunMode::Manual), t0),
            (Command::SendManualEmail(String::new()), t0),
            (Command::Tick, day_three()),
        ] {
            deal = apply(&deal, command, at).unwrap().deal;
        }
        deal
    }

    fn step_status(deal: &Deal, index: usize) -> StepStatus {
        deal.profile.sequence_run.as_ref().unwrap().steps[index].status
    }

    #[test]
    fn start_opens_session_and_places_call() {
        let mut deal = ready_to_call();
        let effects = start_call(&mut deal, day_three()).unwrap();

        assert!(matches!(&effects[..], [Effect::PlaceCall { contact }] if contact.id == "c-new"));
        let session = deal.profile.call_session.as_ref().unwrap();
        assert_eq!(session.step_index, 1);
        assert_eq!(session.started_at, day_three());
        assert!(session.outcome.is_none());
    }

    #[test]
    fn start_requires_phone_call_step() {
        let mut deal = testing::deal();
        for command in [
            Command::RecordSignal(testing::renderings_signal()),
            Command::Confirm,
            Command::SelectMode(RunMode::Manual),
        ] {
            deal = apply(&deal, command, testing::t0()).unwrap().deal;
        }

        let err = start_call(&mut deal, testing::t0()).unwrap_err();
        assert!(matches!(err, OutreachError::InvalidStep(_)));
        assert!(deal.profile.call_session.is_none());
    }

    #[test]
    fn voicemail_leaves_message_without_follow_up() {
        let mut deal = ready_to_call();
        start_call(&mut deal, day_three()).unwrap();
        set_outcome(&mut deal, CallOutcome::Voicemail).unwrap();
        assert!(!deal.profile.call_session.as_ref().unwrap().voicemail_message.is_empty());

        let record = end_call(&mut deal, "Left a message", None, day_three()).unwrap();

        assert!(!record.voicemail_message.is_empty());
        assert!(record.follow_up_email.is_empty());
        assert!(deal.profile.call_session.is_none());
        assert_eq!(step_status(&deal, 1), StepStatus::Done);
        assert_eq!(step_status(&deal, 2), StepStatus::Pending);
    }

    #[test]
    fn connected_call_drafts_follow_up_for_next_email() {
        let mut deal = ready_to_call();
        start_call(&mut deal, day_three()).unwrap();
        set_outcome(&mut deal, CallOutcome::Success).unwrap();

        let record =
            end_call(&mut deal, "Wants samples", Some("Send the oak line."), day_three()).unwrap();

        assert!(!record.follow_up_email.is_empty());
        assert!(record.voicemail_message.is_empty());
        let run = deal.profile.sequence_run.as_ref().unwrap();
        assert_eq!(run.steps[1].call.as_ref().unwrap().transcript, "Send the oak line.");
        assert_eq!(run.steps[2].status, StepStatus::Active);
        assert_eq!(run.steps[2].content, record.follow_up_email);
    }

    #[test]
    fn end_without_outcome_is_rejected() {
        let mut deal = ready_to_call();
        start_call(&mut deal, day_three()).unwrap();

        let err = end_call(&mut deal, "", None, day_three()).unwrap_err();

        assert!(matches!(err, OutreachError::OutcomeRequired));
        assert!(deal.profile.call_session.is_some());
        assert_eq!(step_status(&deal, 1), StepStatus::Active);
    }

    #[test]
    fn outcome_is_set_once() {
        let mut deal = ready_to_call();
        start_call(&mut deal, day_three()).unwrap();
        set_outcome(&mut deal, CallOutcome::Success).unwrap();

        let err = set_outcome(&mut deal, CallOutcome::NoAnswer).unwrap_err();

        assert!(matches!(err, OutreachError::InvalidTransition(_)));
        let session = deal.profile.call_session.as_ref().unwrap();
        assert_eq!(session.outcome, Some(CallOutcome::Success));
    }

    #[test]
    fn transcript_needs_connected_call() {
        let mut deal = ready_to_call();
        start_call(&mut deal, day_three()).unwrap();
        set_outcome(&mut deal, CallOutcome::NoAnswer).unwrap();

        let err = end_call(&mut deal, "", Some("hello?"), day_three()).unwrap_err();

        assert!(matches!(err, OutreachError::PreconditionFailed(_)));
        assert!(deal.profile.call_session.is_some());
        assert_eq!(step_status(&deal, 1), StepStatus::Active);
    }

    #[test]
    fn cancel_leaves_step_ready_to_call() {
        let mut deal = ready_to_call();
        start_call(&mut deal, day_three()).unwrap();

        cancel_call(&mut deal).unwrap();

        assert!(deal.profile.call_session.is_none());
        assert_eq!(step_status(&deal, 1), StepStatus::Active);
        assert!(start_call(&mut deal, day_three()).is_ok());
    }

    #[test]
    fn cancel_after_outcome_is_rejected() {
        let mut deal = ready_to_call();
        start_call(&mut deal, day_three()).unwrap();
        set_outcome(&mut deal, CallOutcome::Voicemail).unwrap();

        let err = cancel_call(&mut deal).unwrap_err();

        assert!(matches!(err, OutreachError::InvalidTransition(_)));
        assert!(deal.profile.call_session.is_some());
    }
}
