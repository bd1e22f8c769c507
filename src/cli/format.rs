//! Output formatting for CLI display.

use std::fmt::Write;

use uuid::Uuid;

use crate::model::{
    ChatRole, ChatTurn, Deal, DealStage, ReadinessStatus, RunStatus, SequenceDefinition,
    SequenceRun, StepStatus, TouchKind,
};

/// First eight characters of an id, enough to pass back to `--deal`.
pub(super) fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// One line per deal for `deal list`.
pub(super) fn format_deal_line(deal: &Deal) -> String {
    let readiness = match deal.profile.readiness_status {
        ReadinessStatus::Ready => "ready",
        ReadinessStatus::NotReady => "not ready",
    };
    format!(
        "{}  [{}] [{readiness}] [{}]  {}: {}",
        short_id(deal.id),
        stage_label(deal.stage),
        deal.owner,
        deal.title,
        deal.project
    )
}

/// The full outreach profile for `show`.
pub(super) fn format_deal(deal: &Deal) -> String {
    let profile = &deal.profile;
    let mut out = String::new();

    let _ = writeln!(out, "{} ({})", deal.title, short_id(deal.id));
    let _ = writeln!(
        out,
        "Project: {}, {} ({}), {}",
        deal.project,
        deal.company,
        deal.phase.label(),
        deal.product.label()
    );
    let _ = writeln!(out, "Owner: {}  Stage: {}", deal.owner, stage_label(deal.stage));

    match profile.readiness_status {
        ReadinessStatus::Ready => {
            let _ = writeln!(out, "Readiness: ready. {}", profile.readiness_reason);
        }
        ReadinessStatus::NotReady => {
            let _ = writeln!(out, "Readiness: not ready. {}", profile.readiness_reason);
        }
    }

    match &profile.primary_contact {
        Some(c) => {
            let state = if c.awaiting_confirmation() {
                "  [new, awaiting confirmation]"
            } else if c.confirmed {
                "  [confirmed]"
            } else {
                ""
            };
            let _ = writeln!(out, "Contact: {} ({}, {}){state}", c.name, c.role, c.company);
        }
        None => {
            let _ = writeln!(out, "Contact: none");
        }
    }

    if let Some(run) = &profile.sequence_run {
        out.push_str(&format_run(run));
    }

    if let Some(session) = &profile.call_session {
        let outcome = session.outcome.map_or("no outcome yet", |o| o.label());
        let _ = writeln!(out, "Call in progress on step {}: {outcome}", session.step_index + 1);
        if !session.voicemail_message.is_empty() {
            let _ = writeln!(out, "Voicemail script: {}", session.voicemail_message);
        }
    }

    out
}

fn format_run(run: &SequenceRun) -> String {
    let mut out = String::new();
    let mode = run.mode.map_or("mode not chosen", |m| m.label());
    let _ = writeln!(
        out,
        "Sequence: {} ({mode}, {})",
        run.definition.name,
        run_status_label(run.status)
    );

    for (i, step) in run.steps.iter().enumerate() {
        let marker = if run.status == RunStatus::Running && i == run.current_step_index {
            ">"
        } else {
            " "
        };
        let when = step
            .completed_at
            .or(step.scheduled_at)
            .map(|t| t.strftime("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{marker} {}. [{}] {} (day {}) {when}",
            i + 1,
            step_status_label(step.status),
            step.kind.label(),
            step.offset_days
        );
    }

    if let Some((i, step)) = run.active_step()
        && !step.content.is_empty()
    {
        let _ = writeln!(out, "\nStep {} draft:\n{}", i + 1, indent(&step.content));
    }

    if !run.replies.is_empty() {
        let _ = writeln!(
            out,
            "Replies: {} (automatic steps paused)",
            run.replies.len()
        );
    }
    out
}

/// A catalog sequence for `catalog recommend`.
pub(super) fn format_definition(definition: &SequenceDefinition) -> String {
    let mut out = format!(
        "{} ({} touchpoints over {} days)\n",
        definition.name,
        definition.touchpoints,
        definition.span_days()
    );
    for step in &definition.steps {
        let kind = match step.kind {
            TouchKind::Email => "email",
            TouchKind::PhoneCall => "call",
            TouchKind::Wait => "wait",
        };
        let _ = writeln!(out, "  day {:>2}  {kind:<5}  {}", step.offset_days, step.description);
    }
    out
}

/// One chat turn, with any cited sources underneath.
pub(super) fn format_turn(turn: &ChatTurn) -> String {
    let who = match turn.role {
        ChatRole::User => "you",
        ChatRole::Assistant => "assistant",
    };
    let mut out = format!("{who}: {}\n", turn.text);
    for source in &turn.sources {
        let _ = writeln!(out, "  source: {} <{}>", source.title, source.url);
    }
    out
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|l| format!("    {l}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn stage_label(stage: DealStage) -> &'static str {
    match stage {
        DealStage::Prospecting => "prospecting",
        DealStage::Outreach => "outreach",
        DealStage::Engaged => "engaged",
        DealStage::ClosedWon => "closed won",
        DealStage::ClosedLost => "closed lost",
    }
}

fn run_status_label(status: RunStatus) -> &'static str {
    match status {
        RunStatus::NotStarted => "not started",
        RunStatus::AwaitingModeChoice => "awaiting mode choice",
        RunStatus::Running => "running",
        RunStatus::Completed => "completed",
    }
}

fn step_status_label(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Pending => "pending",
        StepStatus::Active => "active",
        StepStatus::Done => "done",
        StepStatus::Skipped => "skipped",
    }
}
