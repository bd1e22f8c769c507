//! Command router: free-text operator input to engine commands.
//!
//! A closed, ordered rule table matched by keyword against the deal's
//! current state. Not an interpreter: the same text against the same state
//! always routes the same way, and unmatched text never changes anything.

use jiff::Timestamp;

use crate::model::{Deal, ReadinessStatus, RunMode, SourceLink};

use super::{Command, Effect, apply, readiness};

/// Shown whenever input matches nothing, or a matched command fails.
pub const HELP: &str = "I can help with this deal's outreach. Try \"why not ready?\", \
    \"when will it be ready?\", \"yes, add contact\" or \"no\" when a new contact is \
    found, and \"automated\" or \"manual\" to start a sequence.";

/// Fixed one-click inputs, equivalent to typing their canonical text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    WhyNotReady,
    WhenReady,
    AddContact,
    KeepCurrent,
    Automated,
    Manual,
}

impl QuickAction {
    pub fn text(self) -> &'static str {
        match self {
            Self::WhyNotReady => "Why is this not ready?",
            Self::WhenReady => "When will it be ready?",
            Self::AddContact => "Yes, add contact",
            Self::KeepCurrent => "No, keep the current contact",
            Self::Automated => "Automated",
            Self::Manual => "Manual",
        }
    }
}

/// Which rule of the table matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    ConfirmContact,
    DeclineContact,
    ChooseAutomated,
    ChooseManual,
    ExplainReadiness,
    ReadinessTimeline,
    Help,
}

/// The result of handling one line of operator input.
#[derive(Debug, Clone)]
pub struct Routed {
    pub rule: Rule,

    /// The deal after the commands ran. Unchanged when nothing ran or a
    /// command failed.
    pub deal: Deal,
    pub response: String,

    /// Commands that ran and were committed.
    pub commands: Vec<Command>,
    pub effects: Vec<Effect>,

    /// Citations for the assistant's response.
    pub sources: Vec<SourceLink>,
}

/// Pick the first rule matching `text` against the deal's state.
pub fn classify(text: &str, deal: &Deal) -> Rule {
    let input = Input::new(text);
    let profile = &deal.profile;

    if profile.confirmation_pending() {
        if input.any_word(&["yes", "add"]) {
            return Rule::ConfirmContact;
        }
        if input.any_word(&["no", "don't"]) {
            return Rule::DeclineContact;
        }
    }
    if profile.mode_choice_pending() {
        if input.any_word(&["automated", "auto", "email-only"]) {
            return Rule::ChooseAutomated;
        }
        if input.any_word(&["manual", "ai-supported"]) {
            return Rule::ChooseManual;
        }
    }
    if input.any_word(&["why"]) || input.contains("not ready") {
        return Rule::ExplainReadiness;
    }
    if input.any_word(&["when", "ready"]) {
        return Rule::ReadinessTimeline;
    }
    Rule::Help
}

/// Route `text` and run whatever it asks for.
///
/// Never fails: a command that cannot run degrades to its error plus the
/// help text, with the deal unchanged.
pub fn handle(deal: &Deal, text: &str, now: Timestamp) -> Routed {
    let rule = classify(text, deal);
    let command = match rule {
        Rule::ConfirmContact => Some(Command::Confirm),
        Rule::DeclineContact => Some(Command::Decline),
        Rule::ChooseAutomated => Some(Command::SelectMode(RunMode::Automated)),
        Rule::ChooseManual => Some(Command::SelectMode(RunMode::Manual)),
        Rule::ExplainReadiness | Rule::ReadinessTimeline | Rule::Help => None,
    };

    let unchanged = |response: String, sources: Vec<SourceLink>| Routed {
        rule,
        deal: deal.clone(),
        response,
        commands: Vec::new(),
        effects: Vec::new(),
        sources,
    };

    let Some(command) = command else {
        return match rule {
            Rule::ExplainReadiness => unchanged(explain_readiness(deal), signal_sources(deal)),
            Rule::ReadinessTimeline => unchanged(readiness_timeline(deal), signal_sources(deal)),
            _ => unchanged(HELP.to_string(), Vec::new()),
        };
    };

    match apply(deal, command.clone(), now) {
        Ok(outcome) => Routed {
            rule,
            deal: outcome.deal,
            response: outcome.message,
            commands: vec![command],
            effects: outcome.effects,
            sources: Vec::new(),
        },
        Err(e) => {
            log::debug!("deal {}: routed command failed: {e}", deal.id);
            unchanged(format!("That didn't go through ({e}). {HELP}"), Vec::new())
        }
    }
}

/// Lowercased input with its word tokens.
struct Input {
    text: String,
    words: Vec<String>,
}

impl Input {
    fn new(text: &str) -> Self {
        let text = text.to_lowercase().replace('\u{2019}', "'");
        let words = text
            .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '-'))
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        Self { text, words }
    }

    fn any_word(&self, keywords: &[&str]) -> bool {
        self.words.iter().any(|w| keywords.contains(&w.as_str()))
    }

    fn contains(&self, phrase: &str) -> bool {
        self.text.contains(phrase)
    }
}

fn explain_readiness(deal: &Deal) -> String {
    let profile = &deal.profile;
    match profile.readiness_status {
        ReadinessStatus::NotReady => readiness::evaluate(deal).readiness_reason,
        ReadinessStatus::Ready => {
            let triggers = profile
                .ready_triggers
                .as_ref()
                .map(|t| t.join("; "))
                .unwrap_or_default();
            format!(
                "{} is ready for outreach. What changed: {triggers}.",
                deal.project
            )
        }
    }
}

fn readiness_timeline(deal: &Deal) -> String {
    match deal.profile.readiness_status {
        ReadinessStatus::Ready => format!(
            "{} is already ready. Outreach can start as soon as a contact is confirmed.",
            deal.project
        ),
        ReadinessStatus::NotReady => format!(
            "I'm watching {} for the signals that usually open a window: published \
             renderings, a filed permit, architect or designer selection, and funding \
             approval. Projects in {} typically surface one of these within weeks. \
             I'll flag the deal as soon as one appears.",
            deal.project,
            deal.phase.label()
        ),
    }
}

fn signal_sources(deal: &Deal) -> Vec<SourceLink> {
    deal.signals
        .iter()
        .filter_map(|s| {
            s.source_url.as_ref().map(|url| SourceLink {
                title: s.description.clone(),
                url: url.clone(),
            })
        })
        .collect()
}
