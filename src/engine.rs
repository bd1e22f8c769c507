//! The outreach engine: pure transitions over a deal.
//!
//! Every operation is a [`Command`] applied with [`apply`]: the current deal
//! and a `now` go in, a new deal plus the [`Effect`]s to carry out come
//! out. The input deal is never touched, so a failed command leaves nothing
//! half-applied.

pub mod catalog;
mod call;
pub mod compose;
mod contacts;
mod error;
pub mod readiness;
pub mod router;
mod run;

use jiff::Timestamp;

use crate::model::{CallOutcome, Contact, Deal, RunMode, Signal, StepKind};

pub use error::{OutreachError, Result};

/// An operator or clock event against one deal.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    RecordSignal(Signal),
    Confirm,
    Decline,
    SelectMode(RunMode),
    Tick,
    SendManualEmail(String),
    ReceiveReply(String),
    StartCall,
    SetCallOutcome(CallOutcome),
    EndCall {
        notes: String,
        transcript: Option<String>,
    },
    CancelCall,
    SkipStep,
    ResetRun,
}

/// Something the outside world has to do for a transition to take effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SendEmail {
        to: String,
        subject: String,
        body: String,
    },
    PlaceCall {
        contact: Contact,
    },
}

/// The result of a successful command.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub deal: Deal,
    pub effects: Vec<Effect>,

    /// Human-readable confirmation of what happened.
    pub message: String,
}

/// Apply a command to a deal at `now`.
pub fn apply(deal: &Deal, command: Command, now: Timestamp) -> Result<Outcome> {
    let mut next = deal.clone();
    let mut effects = Vec::new();

    let message = match command {
        Command::RecordSignal(signal) => {
            let description = signal.description.clone();
            if readiness::record_signal(&mut next, signal) {
                ready_message(&next, &description)
            } else {
                format!("Recorded signal: {description}.")
            }
        }
        Command::Confirm => {
            let contact = contacts::confirm(&mut next.profile)?;
            let definition = catalog::recommend(&contact.role, next.phase, next.product);
            let summary = format!(
                "{} confirmed. Recommended sequence: {} ({} touchpoints over {} days). \
                 Run it automated (email-only) or manual (AI-supported)?",
                contact.name,
                definition.name,
                definition.touchpoints,
                definition.span_days()
            );
            run::attach(&mut next, definition)?;
            summary
        }
        Command::Decline => match contacts::decline(&mut next.profile)? {
            Some(contact) => format!(
                "Understood. {} stays the primary contact; no sequence started.",
                contact.name
            ),
            None => "Understood. No sequence started.".to_string(),
        },
        Command::SelectMode(mode) => {
            effects = run::select_mode(&mut next, mode, now)?;
            mode_message(&next, mode)
        }
        Command::Tick => {
            let before = active_kind(&next);
            effects = run::tick(&mut next, now)?;
            tick_message(&next, before, effects.len())
        }
        Command::SendManualEmail(content) => {
            effects = run::send_manual_email(&mut next, &content, now)?;
            match next_scheduled(&next) {
                Some(text) => format!("Email sent. {text}"),
                None => "Email sent.".to_string(),
            }
        }
        Command::ReceiveReply(content) => {
            run::receive_reply(&mut next, &content, now)?;
            "Reply received. Steps scheduled from now on are held until you decide how to respond."
                .to_string()
        }
        Command::StartCall => {
            effects = call::start_call(&mut next, now)?;
            "Call started. Set an outcome when it wraps up.".to_string()
        }
        Command::SetCallOutcome(outcome) => {
            call::set_outcome(&mut next, outcome)?;
            match next.profile.call_session.as_ref() {
                Some(s) if !s.voicemail_message.is_empty() => {
                    format!("Outcome: {}. Suggested voicemail:\n{}", outcome.label(), s.voicemail_message)
                }
                _ => format!("Outcome: {}.", outcome.label()),
            }
        }
        Command::EndCall { notes, transcript } => {
            let record = call::end_call(&mut next, &notes, transcript.as_deref(), now)?;
            if record.follow_up_email.is_empty() {
                format!("Call logged ({}).", record.outcome.label())
            } else {
                format!(
                    "Call logged ({}). Follow-up draft:\n{}",
                    record.outcome.label(),
                    record.follow_up_email
                )
            }
        }
        Command::CancelCall => {
            call::cancel_call(&mut next)?;
            "Call cancelled. The step is still ready to call.".to_string()
        }
        Command::SkipStep => {
            let index = run::skip_step(&mut next, now)?;
            format!("Skipped step {}.", index + 1)
        }
        Command::ResetRun => {
            run::reset(&mut next)?;
            "Sequence progress reset. Choose automated or manual to start again.".to_string()
        }
    };

    Ok(Outcome {
        deal: next,
        effects,
        message,
    })
}

fn ready_message(deal: &Deal, description: &str) -> String {
    match &deal.profile.primary_contact {
        Some(c) if c.awaiting_confirmation() => format!(
            "Ready for outreach: {description}. New contact found: {} ({}, {}). \
             Add them as the primary contact?",
            c.name, c.role, c.company
        ),
        _ => format!("Ready for outreach: {description}."),
    }
}

fn mode_message(deal: &Deal, mode: RunMode) -> String {
    let Some(run) = &deal.profile.sequence_run else {
        return String::new();
    };
    let name = deal
        .profile
        .primary_contact
        .as_ref()
        .map_or("the contact", |c| c.name.as_str());
    match mode {
        RunMode::Automated => {
            let mut text = format!(
                "Enrolled {name} in '{}' (automated). Step 1 sent.",
                run.definition.name
            );
            if let Some(next) = next_scheduled(deal) {
                text.push(' ');
                text.push_str(&next);
            }
            text
        }
        RunMode::Manual => format!(
            "'{}' is running in manual mode. The step 1 draft to {name} is ready to review and send.",
            run.definition.name
        ),
    }
}

fn tick_message(deal: &Deal, before: Option<StepKind>, sent: usize) -> String {
    let after = active_kind(deal);
    if sent > 0 {
        return format!("Sent {sent} scheduled email(s).");
    }
    match after {
        Some(StepKind::PhoneCall) if before.is_none() => "Phone call is ready to call.".to_string(),
        Some(StepKind::ManualEmail) if before.is_none() => {
            "Next email draft is ready to review.".to_string()
        }
        _ => "Nothing due.".to_string(),
    }
}

fn active_kind(deal: &Deal) -> Option<StepKind> {
    deal.profile
        .sequence_run
        .as_ref()
        .and_then(|r| r.active_step().map(|(_, s)| s.kind))
}

/// "Next: <step> on <date>." for the first pending scheduled step.
fn next_scheduled(deal: &Deal) -> Option<String> {
    let run = deal.profile.sequence_run.as_ref()?;
    let step = run
        .steps
        .iter()
        .find(|s| !s.is_terminal() && s.scheduled_at.is_some())?;
    let at = step.scheduled_at?;
    Some(format!(
        "Next: {} on {}, unless they reply first.",
        step.kind.label(),
        at.strftime("%Y-%m-%d")
    ))
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared test fixtures: a deal, its contacts, and a milestone signal.

    use jiff::Timestamp;
    use uuid::Uuid;

    use crate::model::{
        Contact, Deal, DealStage, OutreachProfile, ProductType, ProjectPhase, Signal, SignalKind,
    };

    pub fn contact(id: &str, name: &str) -> Contact {
        Contact {
            id: id.into(),
            name: name.into(),
            role: "Principal Architect".into(),
            company: "Chen Studio".into(),
            email: Some(format!("{id}@example.com")),
            phone: None,
            is_new: false,
            confirmed: false,
        }
    }

    pub fn deal() -> Deal {
        Deal {
            id: Uuid::new_v4(),
            title: "Riverside flooring".into(),
            value: 250_000,
            stage: DealStage::Outreach,
            owner: "Jordan Lee".into(),
            company: "Acme Surfaces".into(),
            project: "Riverside Medical Center".into(),
            phase: ProjectPhase::SchematicDesign,
            product: ProductType::Flooring,
            created_at: Timestamp::UNIX_EPOCH,
            signals: vec![],
            profile: OutreachProfile::new(Some(contact("c-old", "Pat Morgan"))),
        }
    }

    pub fn renderings_signal() -> Signal {
        Signal {
            description: "first renderings published".into(),
            kind: SignalKind::Milestone,
            observed_at: Timestamp::UNIX_EPOCH,
            source_url: Some("https://example.com/renderings".into()),
            contact: Some(contact("c-new", "Sarah Chen")),
        }
    }

    /// Fixed reference instant for scheduling tests.
    pub fn t0() -> Timestamp {
        Timestamp::from_second(1_700_000_000).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::SignedDuration;

    use crate::model::{ReadinessStatus, RunStatus, StepStatus};

    use super::testing::{deal, renderings_signal, t0};

    fn days(n: i64) -> SignedDuration {
        SignedDuration::from_hours(n * 24)
    }

    /// Apply a command that must succeed, returning the new deal.
    fn step(deal: &Deal, command: Command, now: Timestamp) -> Deal {
        apply(deal, command, now).unwrap().deal
    }

    /// A deal with a confirmed contact, waiting on a mode choice.
    fn confirmed_deal() -> Deal {
        let d = step(&deal(), Command::RecordSignal(renderings_signal()), t0());
        step(&d, Command::Confirm, t0())
    }

    fn run_of(deal: &Deal) -> &crate::model::SequenceRun {
        deal.profile.sequence_run.as_ref().unwrap()
    }

    #[test]
    fn confirm_attaches_recommended_sequence() {
        let d = confirmed_deal();
        let run = run_of(&d);
        assert_eq!(run.status, RunStatus::AwaitingModeChoice);
        assert_eq!(run.definition.name, "Design-phase flooring spec");
        assert!(run.mode.is_none());
        assert!(d.profile.primary_contact.as_ref().unwrap().confirmed);
    }

    #[test]
    fn confirm_non_new_contact_creates_no_run() {
        let d = deal();
        let err = apply(&d, Command::Confirm, t0()).unwrap_err();
        assert!(matches!(err, OutreachError::PreconditionFailed(_)));
        assert!(d.profile.sequence_run.is_none());
    }

    #[test]
    fn decline_creates_no_run() {
        let d = step(&deal(), Command::RecordSignal(renderings_signal()), t0());
        let d = step(&d, Command::Decline, t0());
        assert!(d.profile.sequence_run.is_none());
        assert_eq!(d.profile.primary_contact.as_ref().unwrap().id, "c-old");
        assert!(apply(&d, Command::Confirm, t0()).is_err());
    }

    #[test]
    fn select_mode_before_confirmation_is_invalid() {
        let d = deal();
        let err = apply(&d, Command::SelectMode(RunMode::Manual), t0()).unwrap_err();
        assert!(matches!(err, OutreachError::InvalidTransition(_)));
    }

    #[test]
    fn select_mode_twice_is_invalid_and_leaves_state() {
        let d = step(&confirmed_deal(), Command::SelectMode(RunMode::Manual), t0());
        let err = apply(&d, Command::SelectMode(RunMode::Automated), t0()).unwrap_err();
        assert!(matches!(err, OutreachError::InvalidTransition(_)));
        assert_eq!(run_of(&d).mode, Some(RunMode::Manual));
    }

    #[test]
    fn automated_sends_step_one_and_schedules_follow_ups() {
        let outcome = apply(&confirmed_deal(), Command::SelectMode(RunMode::Automated), t0()).unwrap();
        let run = run_of(&outcome.deal);

        assert_eq!(run.status, RunStatus::Running);
        assert_eq!(run.steps[0].kind, StepKind::AutoEmail);
        assert_eq!(run.steps[0].status, StepStatus::Done);
        assert_eq!(run.steps[0].completed_at, Some(t0()));
        assert_eq!(run.steps[1].scheduled_at, Some(t0() + days(3)));
        assert_eq!(run.steps[2].scheduled_at, Some(t0() + days(7)));
        assert!(run.steps.iter().all(|s| s.status != StepStatus::Active));
        assert!(matches!(
            &outcome.effects[..],
            [Effect::SendEmail { to, .. }] if to == "c-new@example.com"
        ));
    }

    #[test]
    fn automated_step_two_waits_for_three_days() {
        let d = step(&confirmed_deal(), Command::SelectMode(RunMode::Automated), t0());

        let early = apply(&d, Command::Tick, t0() + days(3) - SignedDuration::from_secs(1)).unwrap();
        assert_eq!(run_of(&early.deal).steps[1].status, StepStatus::Pending);
        assert!(early.effects.is_empty());

        let due = apply(&d, Command::Tick, t0() + days(3)).unwrap();
        let run = run_of(&due.deal);
        assert_eq!(run.steps[1].status, StepStatus::Done);
        assert!(!run.steps[1].content.is_empty());
        assert_eq!(run.steps[2].status, StepStatus::Pending);
        assert_eq!(due.effects.len(), 1);
    }

    #[test]
    fn automated_run_completes_after_last_step() {
        let d = step(&confirmed_deal(), Command::SelectMode(RunMode::Automated), t0());
        let d = step(&d, Command::Tick, t0() + days(7));
        let run = run_of(&d);
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.current_step_index, 2);
        assert!(run.steps.iter().all(|s| s.status == StepStatus::Done));
    }

    #[test]
    fn tick_is_idempotent() {
        let d = step(&confirmed_deal(), Command::SelectMode(RunMode::Automated), t0());
        let now = t0() + days(3);
        let once = step(&d, Command::Tick, now);
        let twice = apply(&once, Command::Tick, now).unwrap();

        assert!(twice.effects.is_empty());
        assert_eq!(
            serde_json::to_value(run_of(&once)).unwrap(),
            serde_json::to_value(run_of(&twice.deal)).unwrap()
        );
    }

    #[test]
    fn reply_holds_back_later_steps() {
        let d = step(&confirmed_deal(), Command::SelectMode(RunMode::Automated), t0());
        let d = step(&d, Command::ReceiveReply("Send samples please".into()), t0() + days(1));
        let ticked = apply(&d, Command::Tick, t0() + days(10)).unwrap();

        let run = run_of(&ticked.deal);
        assert_eq!(run.status, RunStatus::Running);
        assert_eq!(run.paused_at(), Some(t0() + days(1)));
        assert_eq!(run.steps[1].status, StepStatus::Pending);
        assert!(ticked.effects.is_empty());
    }

    #[test]
    fn late_reply_does_not_hold_back_earlier_steps() {
        let started = step(&confirmed_deal(), Command::SelectMode(RunMode::Automated), t0());

        let ticked_first = step(&started, Command::Tick, t0() + days(3));
        let ticked_first = step(&ticked_first, Command::ReceiveReply("Call me".into()), t0() + days(5));
        let ticked_first = step(&ticked_first, Command::Tick, t0() + days(10));

        let replied_first = step(&started, Command::ReceiveReply("Call me".into()), t0() + days(5));
        let caught_up = apply(&replied_first, Command::Tick, t0() + days(10)).unwrap();

        let statuses = |d: &Deal| run_of(d).steps.iter().map(|s| s.status).collect::<Vec<_>>();
        assert_eq!(statuses(&ticked_first), statuses(&caught_up.deal));
        assert_eq!(run_of(&caught_up.deal).steps[1].status, StepStatus::Done);
        assert_eq!(run_of(&caught_up.deal).steps[2].status, StepStatus::Pending);
        assert_eq!(caught_up.effects.len(), 1);
    }

    #[test]
    fn late_reply_still_activates_earlier_manual_call() {
        let d = step(&confirmed_deal(), Command::SelectMode(RunMode::Manual), t0());
        let d = step(&d, Command::SendManualEmail(String::new()), t0());
        let d = step(&d, Command::ReceiveReply("Busy this week".into()), t0() + days(5));
        let d = step(&d, Command::Tick, t0() + days(10));

        let run = run_of(&d);
        assert_eq!(run.steps[1].kind, StepKind::PhoneCall);
        assert_eq!(run.steps[1].status, StepStatus::Active);
    }

    #[test]
    fn reply_before_start_is_invalid() {
        let err = apply(&confirmed_deal(), Command::ReceiveReply("hi".into()), t0()).unwrap_err();
        assert!(matches!(err, OutreachError::InvalidTransition(_)));
    }

    #[test]
    fn send_manual_email_requires_active_manual_email() {
        let d = step(&confirmed_deal(), Command::SelectMode(RunMode::Automated), t0());
        let err = apply(&d, Command::SendManualEmail("hello".into()), t0()).unwrap_err();
        assert!(matches!(err, OutreachError::InvalidStep(_)));
    }

    #[test]
    fn manual_scenario_runs_to_completion() {
        // Not ready until renderings are published.
        let d = deal();
        assert_eq!(d.profile.readiness_status, ReadinessStatus::NotReady);

        let d = step(&d, Command::RecordSignal(renderings_signal()), t0());
        assert_eq!(d.profile.readiness_status, ReadinessStatus::Ready);
        assert!(d.profile.primary_contact.as_ref().unwrap().is_new);

        let d = step(&d, Command::Confirm, t0());
        assert!(d.profile.primary_contact.as_ref().unwrap().confirmed);

        let d = step(&d, Command::SelectMode(RunMode::Manual), t0());
        let run = run_of(&d);
        assert_eq!(run.steps[0].kind, StepKind::ManualEmail);
        assert_eq!(run.steps[0].status, StepStatus::Active);
        assert!(run.steps[0].content.starts_with("Subject: "));

        let sent = apply(&d, Command::SendManualEmail("Hi Sarah, quick intro.".into()), t0()).unwrap();
        let d = sent.deal;
        let run = run_of(&d);
        assert_eq!(run.steps[0].status, StepStatus::Done);
        assert_eq!(run.steps[1].kind, StepKind::PhoneCall);
        assert_eq!(run.steps[1].scheduled_at, Some(t0() + days(3)));
        assert!(matches!(
            &sent.effects[..],
            [Effect::SendEmail { body, .. }] if body == "Hi Sarah, quick intro."
        ));

        // Not yet callable.
        let d = step(&d, Command::Tick, t0() + days(2));
        assert_eq!(run_of(&d).steps[1].status, StepStatus::Pending);
        let d = step(&d, Command::Tick, t0() + days(3));
        assert_eq!(run_of(&d).steps[1].status, StepStatus::Active);

        let started = apply(&d, Command::StartCall, t0() + days(3)).unwrap();
        assert!(matches!(&started.effects[..], [Effect::PlaceCall { .. }]));
        let d = step(&started.deal, Command::SetCallOutcome(CallOutcome::Success), t0() + days(3));
        let d = step(
            &d,
            Command::EndCall {
                notes: "Send LVT samples".into(),
                transcript: Some("They like the warm oak tones.".into()),
            },
            t0() + days(3),
        );
        let run = run_of(&d);
        assert!(d.profile.call_session.is_none());
        assert_eq!(run.steps[1].status, StepStatus::Done);
        let record = run.steps[1].call.as_ref().unwrap();
        assert!(!record.follow_up_email.is_empty());
        assert!(record.follow_up_email.contains("warm oak tones"));

        // Follow-up draft goes straight to step 3.
        assert_eq!(run.steps[2].status, StepStatus::Active);
        assert_eq!(run.steps[2].content, record.follow_up_email);

        let d = step(&d, Command::SendManualEmail(String::new()), t0() + days(3));
        let run = run_of(&d);
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.current_step_index, 2);
    }

    #[test]
    fn failed_command_leaves_deal_untouched() {
        let d = confirmed_deal();
        let before = serde_json::to_value(&d).unwrap();
        assert!(apply(&d, Command::StartCall, t0()).is_err());
        assert!(apply(&d, Command::SendManualEmail("x".into()), t0()).is_err());
        assert_eq!(serde_json::to_value(&d).unwrap(), before);
    }

    #[test]
    fn reset_returns_to_mode_choice() {
        let d = step(&confirmed_deal(), Command::SelectMode(RunMode::Automated), t0());
        let d = step(&d, Command::ResetRun, t0());
        let run = run_of(&d);
        assert_eq!(run.status, RunStatus::AwaitingModeChoice);
        assert!(run.steps.is_empty());
        assert!(run.mode.is_none());
        assert!(apply(&d, Command::SelectMode(RunMode::Manual), t0()).is_ok());
    }

    #[test]
    fn skip_active_step() {
        let d = step(&confirmed_deal(), Command::SelectMode(RunMode::Manual), t0());
        let d = step(&d, Command::SkipStep, t0());
        let run = run_of(&d);
        assert_eq!(run.steps[0].status, StepStatus::Skipped);
        assert!(run.active_step().is_none());

        // Skipping the opener still starts the clock for the rest.
        assert_eq!(run.steps[1].scheduled_at, Some(t0() + days(3)));
        let d = step(&d, Command::Tick, t0() + days(3));
        assert_eq!(run_of(&d).steps[1].status, StepStatus::Active);
    }
}
