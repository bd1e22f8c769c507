//! CLI interface for Outreach.
//!
//! Each subcommand is non-interactive: arguments in, text out.
//!
//! Commands split into two groups:
//!
//! - `outreach deal new|list`, `outreach catalog recommend`, `outreach favorites`:
//!   no deal context needed.
//! - `outreach --deal <id> <command>`: everything else, operating on one deal.
//!
//! The `--deal` flag takes a full UUID or unambiguous prefix.

mod call;
mod deal;
mod format;
mod notes;

use std::{thread, time::Duration};

use clap::{Parser, Subcommand, ValueEnum};
use jiff::{SignedDuration, Timestamp};
use uuid::Uuid;

use crate::config::Config;
use crate::directory::{Directory, JsonDirectory};
use crate::engine::router::QuickAction;
use crate::model::{Deal, RunMode, Signal, SignalKind};
use crate::service::{Clock, Outreach};
use crate::storage::{SqliteStore, Storage};
use crate::transport::{LogTransport, Transport};

use call::CallCommand;
use deal::{CatalogCommand, DealCommand};
use notes::NoteCommand;

/// Outreach: timely, sequenced contact with the right people on a deal.
#[derive(Debug, Parser)]
#[command(name = "outreach", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Deal ID: full UUID or unambiguous prefix (e.g. `a3b`).
    #[arg(long, global = true)]
    deal: Option<String>,

    /// Act as if it were this instant (RFC 3339, e.g. `2025-03-01T09:00:00Z`).
    #[arg(long, global = true)]
    at: Option<Timestamp>,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: from signal to sequence
  1. outreach deal new --as jordan --company acme --project "Riverside Medical Center" \
       --phase schematic-design --product flooring --contact c-17 "Riverside flooring"
     → prints a deal ID (e.g. a3b0fc12)
  2. outreach --deal a3b signal "First renderings published" --contact c-42
  3. outreach --deal a3b confirm
  4. outreach --deal a3b mode manual
  5. outreach --deal a3b send-email
  6. outreach --deal a3b tick --after-days 3
  7. outreach --deal a3b call start

Chat:
  outreach --deal a3b say "why is this not ready?"
  outreach --deal a3b quick add-contact"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage deals: create new ones, list existing.
    Deal {
        #[command(subcommand)]
        command: DealCommand,
    },

    /// Browse the sequence catalog.
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },

    /// Show the deal's outreach profile. Requires `--deal`.
    Show {
        /// Print the raw profile as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Record a discovered signal about the project.
    Signal {
        /// What was observed, e.g. "First renderings published".
        description: String,

        #[arg(long, value_enum, default_value = "milestone")]
        kind: SignalKindArg,

        /// Where the signal was found.
        #[arg(long)]
        source_url: Option<String>,

        /// Directory id of a contact surfaced with the signal.
        #[arg(long)]
        contact: Option<String>,
    },

    /// Add the newly discovered contact as primary and attach a sequence.
    Confirm,

    /// Keep the current contact instead of the newly discovered one.
    Decline,

    /// Choose how the attached sequence runs.
    Mode {
        #[arg(value_enum)]
        mode: ModeArg,
    },

    /// Advance the sequence to now (or `--after-days` from now).
    Tick {
        #[arg(long)]
        after_days: Option<u32>,
    },

    /// Send the active manual email. Sends the draft when no content is given.
    SendEmail {
        /// Full email text; a leading `Subject:` line sets the subject.
        content: Option<String>,
    },

    /// Record a reply from the contact. Pauses automatic steps.
    Reply { content: String },

    /// Work the active phone call step.
    Call {
        #[command(subcommand)]
        command: CallCommand,
    },

    /// Skip the active step.
    Skip,

    /// Discard sequence progress and choose a mode again.
    Reset,

    /// Say something to the deal assistant.
    Say { text: String },

    /// Send one of the fixed quick actions to the deal assistant.
    Quick {
        #[arg(value_enum)]
        action: QuickArg,
    },

    /// Print the deal's chat log.
    Chat,

    /// Private notes on the deal.
    Note {
        #[command(subcommand)]
        command: NoteCommand,
    },

    /// Toggle the deal in favorites.
    Favorite,

    /// List favorite deals.
    Favorites,
}

/// CLI-facing signal kind, mapped to the domain `SignalKind`.
#[derive(Debug, Clone, ValueEnum)]
pub enum SignalKindArg {
    /// A project milestone that makes outreach timely.
    Milestone,
    /// Context only.
    Informational,
}

impl SignalKindArg {
    fn to_domain(&self) -> SignalKind {
        match self {
            Self::Milestone => SignalKind::Milestone,
            Self::Informational => SignalKind::Informational,
        }
    }
}

/// CLI-facing run mode, mapped to the domain `RunMode`.
#[derive(Debug, Clone, ValueEnum)]
pub enum ModeArg {
    /// Email-only, sent on schedule.
    Automated,
    /// Operator-driven emails and calls with drafted content.
    Manual,
}

impl ModeArg {
    fn to_domain(&self) -> RunMode {
        match self {
            Self::Automated => RunMode::Automated,
            Self::Manual => RunMode::Manual,
        }
    }
}

/// CLI-facing quick action, mapped to the router's `QuickAction`.
#[derive(Debug, Clone, ValueEnum)]
pub enum QuickArg {
    WhyNotReady,
    WhenReady,
    AddContact,
    KeepCurrent,
    Automated,
    Manual,
}

impl QuickArg {
    fn to_domain(&self) -> QuickAction {
        match self {
            Self::WhyNotReady => QuickAction::WhyNotReady,
            Self::WhenReady => QuickAction::WhenReady,
            Self::AddContact => QuickAction::AddContact,
            Self::KeepCurrent => QuickAction::KeepCurrent,
            Self::Automated => QuickAction::Automated,
            Self::Manual => QuickAction::Manual,
        }
    }
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config, storage: &Storage) -> Result<(), String> {
    let cli = Cli::parse();

    let directory = match config.directory_path() {
        Some(path) => JsonDirectory::load(&path)
            .map_err(|e| format!("failed to load directory {}: {e}", path.display()))?,
        None => JsonDirectory::default(),
    };
    let clock = cli.at.map_or(Clock::System, Clock::Fixed);
    let svc = Outreach::new(storage, directory, LogTransport, clock);

    match cli.command {
        Command::Deal { command } => deal::run(config, &svc, command),
        Command::Catalog { command } => deal::run_catalog(&command),
        Command::Favorites => notes::cmd_favorites(&open_store()?, &svc),
        command => {
            let deal = require_deal(&svc, cli.deal.as_deref())?;
            run_on_deal(config, &svc, &deal, command)
        }
    }
}

fn run_on_deal<D: Directory, T: Transport>(
    config: &Config,
    svc: &Outreach<'_, D, T>,
    deal: &Deal,
    command: Command,
) -> Result<(), String> {
    let id = deal.id;
    let applied = match command {
        Command::Show { json: false } => {
            print!("{}", format::format_deal(deal));
            return Ok(());
        }
        Command::Show { json: true } => {
            let profile = svc
                .profile(id)
                .map_err(|e| format!("failed to load profile: {e}"))?;
            let json = serde_json::to_string_pretty(&profile)
                .map_err(|e| format!("failed to serialize profile: {e}"))?;
            println!("{json}");
            return Ok(());
        }
        Command::Signal {
            description,
            kind,
            source_url,
            contact,
        } => {
            let contact = contact
                .as_deref()
                .map(|c| svc.contact(c))
                .transpose()
                .map_err(|e| format!("failed to record signal: {e}"))?;
            let signal = Signal {
                description,
                kind: kind.to_domain(),
                observed_at: svc.now(),
                source_url,
                contact,
            };
            svc.record_signal(id, signal)
        }
        Command::Confirm => svc.confirm(id),
        Command::Decline => svc.decline(id),
        Command::Mode { mode } => svc.select_mode(id, mode.to_domain()),
        Command::Tick { after_days } => {
            let days = i64::from(after_days.unwrap_or(0));
            svc.tick(id, svc.now() + SignedDuration::from_hours(days * 24))
        }
        Command::SendEmail { content } => {
            svc.send_manual_email(id, content.as_deref().unwrap_or_default())
        }
        Command::Reply { content } => svc.receive_reply(id, &content),
        Command::Call { command } => call::run(svc, id, command)?,
        Command::Skip => svc.skip_step(id),
        Command::Reset => svc.reset_run(id),
        Command::Say { text } => return say(config, svc, id, &text),
        Command::Quick { action } => return say(config, svc, id, action.to_domain().text()),
        Command::Chat => {
            let turns = svc
                .chat_log(id)
                .map_err(|e| format!("failed to load chat: {e}"))?;
            if turns.is_empty() {
                println!("No chat yet");
            }
            for turn in &turns {
                print!("{}", format::format_turn(turn));
            }
            return Ok(());
        }
        Command::Note { command } => return notes::run(&open_store()?, svc, id, command),
        Command::Favorite => return notes::cmd_favorite(&open_store()?, deal),
        Command::Deal { .. } | Command::Catalog { .. } | Command::Favorites => {
            return Err("this command does not take --deal".to_string());
        }
    };

    let applied = applied.map_err(|e| e.to_string())?;
    println!("{}", applied.message);
    Ok(())
}

/// Hand text to the assistant, pausing before the answer is shown.
fn say<D: Directory, T: Transport>(
    config: &Config,
    svc: &Outreach<'_, D, T>,
    id: Uuid,
    text: &str,
) -> Result<(), String> {
    let answer = svc
        .handle_command(id, text)
        .map_err(|e| format!("assistant failed: {e}"))?;
    if config.response_delay_ms > 0 {
        thread::sleep(Duration::from_millis(config.response_delay_ms));
    }
    print!("{}", format::format_turn(&answer));
    Ok(())
}

fn open_store() -> Result<SqliteStore, String> {
    let path = SqliteStore::default_path().ok_or("could not determine home directory")?;
    SqliteStore::open(&path).map_err(|e| format!("failed to open {}: {e}", path.display()))
}

/// Require that `--deal` was provided and resolve it.
fn require_deal<D: Directory, T: Transport>(
    svc: &Outreach<'_, D, T>,
    deal_ref: Option<&str>,
) -> Result<Deal, String> {
    let deal_ref = deal_ref.ok_or("this command requires --deal <id>")?;
    resolve_deal(svc, deal_ref)
}

/// Resolve a deal reference (full UUID or unambiguous prefix) to a deal.
fn resolve_deal<D: Directory, T: Transport>(
    svc: &Outreach<'_, D, T>,
    reference: &str,
) -> Result<Deal, String> {
    // Try full UUID first.
    if let Ok(id) = reference.parse::<Uuid>() {
        return svc.deal(id).map_err(|e| format!("deal not found: {e}"));
    }

    // Try as a prefix match against all deals.
    let deals = svc
        .list_deals()
        .map_err(|e| format!("failed to list deals: {e}"))?;
    let matches: Vec<&Deal> = deals
        .iter()
        .filter(|d| d.id.to_string().starts_with(reference))
        .collect();

    match matches.len() {
        0 => Err(format!("no deal matching '{reference}'")),
        1 => Ok(matches[0].clone()),
        n => {
            let ids: Vec<String> = matches.iter().map(|d| format::short_id(d.id)).collect();
            Err(format!(
                "'{reference}' is ambiguous: matches {n} deals: {}",
                ids.join(", ")
            ))
        }
    }
}
