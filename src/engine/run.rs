//! Sequence run engine: mode choice, step progression, and ticks.
//!
//! A run moves `NotStarted → AwaitingModeChoice → Running → Completed`.
//! Time never pushes a run forward on its own; [`tick`] re-evaluates the run
//! against a supplied `now` and is idempotent for the same `now`.

use jiff::{SignedDuration, Timestamp};

use crate::model::{
    Contact, Deal, Reply, RunMode, RunStatus, SequenceDefinition, SequenceRun, StepInstance,
    StepKind, StepStatus, TouchKind,
};

use super::Effect;
use super::compose::{self, Email};
use super::error::{OutreachError, Result};

/// Attach a recommended definition to the deal, ready for a mode choice.
pub fn attach(deal: &mut Deal, definition: SequenceDefinition) -> Result<()> {
    if let Some(run) = &deal.profile.sequence_run {
        return Err(OutreachError::InvalidTransition(format!(
            "deal already has a sequence run ({:?})",
            run.status
        )));
    }
    let run = awaiting_mode_choice(definition);
    log::debug!("deal {}: sequence '{}' attached", deal.id, run.definition.name);
    deal.profile.sequence_run = Some(run);
    Ok(())
}

/// Start the run in the chosen mode.
///
/// `Automated` sends step 1 immediately and schedules the rest from `now`.
/// `Manual` leaves a step 1 draft active for the operator to edit and send.
pub fn select_mode(deal: &mut Deal, mode: RunMode, now: Timestamp) -> Result<Vec<Effect>> {
    let status = deal.profile.sequence_run.as_ref().map(|r| r.status);
    if status != Some(RunStatus::AwaitingModeChoice) {
        return Err(OutreachError::InvalidTransition(format!(
            "cannot choose a mode while the run is {}",
            describe_status(status)
        )));
    }
    let contact = confirmed_contact(deal)?;
    let intro = compose::introduction(deal, &contact);

    with_run(deal, |_, run| {
        if run.definition.steps.is_empty() {
            return Err(OutreachError::InvalidStep(format!(
                "sequence '{}' has no steps",
                run.definition.name
            )));
        }
        run.steps = instantiate(&run.definition, mode);
        run.mode = Some(mode);
        run.status = RunStatus::Running;

        let mut effects = Vec::new();
        let first = &mut run.steps[0];
        first.content = intro.render();
        match mode {
            RunMode::Automated => {
                first.status = StepStatus::Done;
                first.completed_at = Some(now);
                effects.push(send(&contact, &intro));
                schedule_from(run, now);
            }
            RunMode::Manual => first.status = StepStatus::Active,
        }
        refresh(run);
        Ok(effects)
    })
}

/// Send the active manual email with the operator's final text.
///
/// Empty `content` sends the draft as it stands. Sending step 1 sets the
/// run's reference time and schedules every later step.
pub fn send_manual_email(deal: &mut Deal, content: &str, now: Timestamp) -> Result<Vec<Effect>> {
    let contact = confirmed_contact(deal)?;
    let fallback_subject = compose::default_subject(deal);

    with_run(deal, |_, run| {
        let Some((index, step)) = run.active_step() else {
            return Err(OutreachError::InvalidStep(
                "no step is waiting to be sent".to_string(),
            ));
        };
        if step.kind != StepKind::ManualEmail {
            return Err(OutreachError::InvalidStep(format!(
                "active step is a {}, not a manual email",
                step.kind.label()
            )));
        }

        let step = &mut run.steps[index];
        if !content.trim().is_empty() {
            step.content = content.to_string();
        }
        step.status = StepStatus::Done;
        step.completed_at = Some(now);
        let email = Email::parse(&step.content, &fallback_subject);

        if index == 0 {
            schedule_from(run, now);
        }
        refresh(run);
        Ok(vec![send(&contact, &email)])
    })
}

/// Re-evaluate time-dependent state against `now`.
///
/// Automated runs complete every due step in order. Manual runs activate at
/// most one due step, and only when nothing is already active. A step counts
/// as due only if it was scheduled before the first reply, so the result
/// depends on when the reply arrived, not on how often tick ran.
pub fn tick(deal: &mut Deal, now: Timestamp) -> Result<Vec<Effect>> {
    let Some(run) = &deal.profile.sequence_run else {
        return Ok(Vec::new());
    };
    if run.status != RunStatus::Running {
        return Ok(Vec::new());
    }
    if deal.profile.call_session.is_some() {
        return Ok(Vec::new());
    }
    let contact = confirmed_contact(deal)?;

    with_run(deal, |deal, run| {
        let effects = match run.mode {
            Some(RunMode::Automated) => advance_automated(deal, &contact, run, now),
            Some(RunMode::Manual) => {
                activate_manual(deal, &contact, run, now);
                Vec::new()
            }
            None => Vec::new(),
        };
        if !effects.is_empty() {
            log::debug!("deal {}: tick sent {} email(s)", deal.id, effects.len());
        }
        refresh(run);
        Ok(effects)
    })
}

/// Record a reply from the contact. Steps scheduled from then on stop advancing.
pub fn receive_reply(deal: &mut Deal, content: &str, now: Timestamp) -> Result<()> {
    let deal_id = deal.id;
    with_run(deal, |_, run| {
        if run.status != RunStatus::Running {
            return Err(OutreachError::InvalidTransition(format!(
                "replies are only tracked on a running sequence (run is {})",
                describe_status(Some(run.status))
            )));
        }
        run.replies.push(Reply {
            content: content.to_string(),
            received_at: now,
        });
        log::warn!("deal {deal_id}: contact replied, sequence paused for a manual decision");
        Ok(())
    })
}

/// Skip the active step of a manual run.
///
/// Skipping step 1 starts the schedule from `now`, as sending it would.
pub fn skip_step(deal: &mut Deal, now: Timestamp) -> Result<usize> {
    if deal.profile.call_session.is_some() {
        return Err(OutreachError::InvalidStep(
            "end or cancel the open call before skipping".to_string(),
        ));
    }
    with_run(deal, |_, run| {
        let Some((index, _)) = run.active_step() else {
            return Err(OutreachError::InvalidStep(
                "no active step to skip".to_string(),
            ));
        };
        run.steps[index].status = StepStatus::Skipped;
        if index == 0 {
            schedule_from(run, now);
        }
        refresh(run);
        Ok(index)
    })
}

/// Discard progress and start over from the mode choice.
///
/// The old run is replaced by a fresh one on the same definition. Any open
/// call is dropped with it.
pub fn reset(deal: &mut Deal) -> Result<()> {
    deal.profile.call_session = None;
    with_run(deal, |_, run| {
        if run.status == RunStatus::AwaitingModeChoice {
            return Err(OutreachError::InvalidTransition(
                "sequence has not started".to_string(),
            ));
        }
        *run = awaiting_mode_choice(run.definition.clone());
        Ok(())
    })
}

/// Activate a manual email right away with the given draft.
///
/// Used after a connected call, when the follow-up should go out now rather
/// than on schedule. Does nothing unless `index` is a pending manual email.
pub(super) fn activate_now(run: &mut SequenceRun, index: usize, draft: String) {
    if let Some(step) = run.steps.get_mut(index)
        && step.kind == StepKind::ManualEmail
        && step.status == StepStatus::Pending
    {
        step.content = draft;
        step.status = StepStatus::Active;
    }
}

/// Recompute the current index and completion.
///
/// The index only moves forward.
pub(super) fn refresh(run: &mut SequenceRun) {
    if run.steps.is_empty() {
        return;
    }
    let next = run
        .steps
        .iter()
        .position(|s| !s.is_terminal())
        .unwrap_or(run.steps.len() - 1);
    run.current_step_index = run.current_step_index.max(next);
    if run.steps.iter().all(StepInstance::is_terminal) {
        run.status = RunStatus::Completed;
    }
}

fn awaiting_mode_choice(definition: SequenceDefinition) -> SequenceRun {
    SequenceRun {
        definition,
        mode: None,
        status: RunStatus::AwaitingModeChoice,
        steps: Vec::new(),
        current_step_index: 0,
        reference_at: None,
        replies: Vec::new(),
    }
}

/// Run `f` against the deal's run, taken out so the deal stays readable.
fn with_run<T>(
    deal: &mut Deal,
    f: impl FnOnce(&Deal, &mut SequenceRun) -> Result<T>,
) -> Result<T> {
    let mut run = deal.profile.sequence_run.take().ok_or_else(|| {
        OutreachError::InvalidTransition("deal has no sequence run".to_string())
    })?;
    let result = f(deal, &mut run);
    deal.profile.sequence_run = Some(run);
    result
}

fn confirmed_contact(deal: &Deal) -> Result<Contact> {
    match &deal.profile.primary_contact {
        Some(c) if c.confirmed => Ok(c.clone()),
        _ => Err(OutreachError::PreconditionFailed(
            "sequence requires a confirmed contact".to_string(),
        )),
    }
}

/// Turn templates into concrete steps for the mode. Automated runs are
/// email-only, so calls become emails.
fn instantiate(definition: &SequenceDefinition, mode: RunMode) -> Vec<StepInstance> {
    definition
        .steps
        .iter()
        .map(|template| {
            let kind = match (template.kind, mode) {
                (TouchKind::Wait, _) => StepKind::Wait,
                (_, RunMode::Automated) => StepKind::AutoEmail,
                (TouchKind::Email, RunMode::Manual) => StepKind::ManualEmail,
                (TouchKind::PhoneCall, RunMode::Manual) => StepKind::PhoneCall,
            };
            StepInstance {
                kind,
                status: StepStatus::Pending,
                description: template.description.clone(),
                offset_days: template.offset_days,
                scheduled_at: None,
                content: String::new(),
                completed_at: None,
                call: None,
            }
        })
        .collect()
}

fn schedule_from(run: &mut SequenceRun, reference: Timestamp) {
    run.reference_at = Some(reference);
    for step in &mut run.steps {
        step.scheduled_at = Some(reference + days(step.offset_days));
    }
}

fn days(n: u32) -> SignedDuration {
    SignedDuration::from_hours(i64::from(n) * 24)
}

/// Scheduled by `now` and before any reply.
fn is_due(step: &StepInstance, now: Timestamp, paused_at: Option<Timestamp>) -> bool {
    step.scheduled_at
        .is_some_and(|at| at <= now && paused_at.is_none_or(|p| at < p))
}

/// How many emails precede `index`; the follow-up number for an email there.
fn emails_before(run: &SequenceRun, index: usize) -> usize {
    run.steps[..index]
        .iter()
        .filter(|s| matches!(s.kind, StepKind::AutoEmail | StepKind::ManualEmail))
        .count()
}

fn advance_automated(
    deal: &Deal,
    contact: &Contact,
    run: &mut SequenceRun,
    now: Timestamp,
) -> Vec<Effect> {
    let paused_at = run.paused_at();
    let mut effects = Vec::new();
    for index in 0..run.steps.len() {
        if run.steps[index].is_terminal() {
            continue;
        }
        let pending = &run.steps[index];
        let Some(at) = pending
            .scheduled_at
            .filter(|_| is_due(pending, now, paused_at))
        else {
            break;
        };
        let nth = emails_before(run, index);
        let step = &mut run.steps[index];
        if step.kind == StepKind::AutoEmail {
            let email = compose::follow_up(deal, contact, nth);
            step.content = email.render();
            effects.push(send(contact, &email));
        }
        step.status = StepStatus::Done;
        step.completed_at = Some(at);
    }
    effects
}

fn activate_manual(deal: &Deal, contact: &Contact, run: &mut SequenceRun, now: Timestamp) {
    if run.active_step().is_some() {
        return;
    }
    let paused_at = run.paused_at();
    for index in 0..run.steps.len() {
        if run.steps[index].is_terminal() {
            continue;
        }
        if !is_due(&run.steps[index], now, paused_at) {
            return;
        }
        let nth = emails_before(run, index);
        let step = &mut run.steps[index];
        match step.kind {
            StepKind::Wait => {
                step.status = StepStatus::Done;
                step.completed_at = step.scheduled_at;
            }
            StepKind::ManualEmail => {
                step.content = compose::follow_up(deal, contact, nth).render();
                step.status = StepStatus::Active;
                return;
            }
            StepKind::PhoneCall | StepKind::AutoEmail => {
                step.status = StepStatus::Active;
                return;
            }
        }
    }
}

fn send(contact: &Contact, email: &Email) -> Effect {
    Effect::SendEmail {
        to: contact.address().to_string(),
        subject: email.subject.clone(),
        body: email.body.clone(),
    }
}

fn describe_status(status: Option<RunStatus>) -> &'static str {
    match status {
        None | Some(RunStatus::NotStarted) => "not started",
        Some(RunStatus::AwaitingModeChoice) => "awaiting a mode choice",
        Some(RunStatus::Running) => "running",
        Some(RunStatus::Completed) => "completed",
    }
}
