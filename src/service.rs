//! The outreach service: engine transitions committed against storage.
//!
//! Every mutating operation follows the same path: load the deal, apply a
//! [`Command`], carry out the resulting effects through the [`Transport`],
//! and only then persist. If any step fails the stored deal is untouched.

use jiff::Timestamp;
use uuid::Uuid;

use crate::directory::Directory;
use crate::engine::{self, Command, Effect, OutreachError, catalog, readiness, router};
use crate::model::{
    CallOutcome, ChatRole, ChatTurn, Contact, Deal, DealStage, OutreachProfile, ProductType,
    ProjectPhase, RunMode, SequenceDefinition, Signal,
};
use crate::storage::{Storage, StorageError};
use crate::transport::{Transport, TransportError};

/// Errors surfaced by the service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Outreach(#[from] OutreachError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unknown contact: {0}")]
    UnknownContact(String),
}

pub type Result<T> = core::result::Result<T, ServiceError>;

/// Where the service gets "now" from.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    System,

    /// Every call sees the same instant.
    Fixed(Timestamp),
}

impl Clock {
    pub fn now(self) -> Timestamp {
        match self {
            Self::System => Timestamp::now(),
            Self::Fixed(at) => at,
        }
    }
}

/// The sequence the catalog would pick for a contact role, without touching
/// any deal.
pub fn recommend(role: &str, phase: ProjectPhase, product: ProductType) -> SequenceDefinition {
    catalog::recommend(role, phase, product)
}

/// Everything needed to open a new deal.
#[derive(Debug, Clone)]
pub struct NewDeal {
    pub title: String,
    pub value: u64,
    pub owner: String,

    /// A directory company id, or a plain company name.
    pub company: String,
    pub project: String,
    pub phase: ProjectPhase,
    pub product: ProductType,

    /// Directory id of the starting primary contact.
    pub contact: Option<String>,
}

/// A committed transition.
#[derive(Debug, Clone)]
pub struct Applied {
    pub deal: Deal,
    pub message: String,
}

/// The outreach facade over storage and the outside world.
pub struct Outreach<'a, D, T> {
    storage: &'a Storage,
    directory: D,
    transport: T,
    clock: Clock,
}

impl<'a, D: Directory, T: Transport> Outreach<'a, D, T> {
    pub fn new(storage: &'a Storage, directory: D, transport: T, clock: Clock) -> Self {
        Self {
            storage,
            directory,
            transport,
            clock,
        }
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // ── Deals ──

    /// Opens a deal in the `Outreach` stage, not yet ready.
    pub fn create_deal(&self, new: NewDeal) -> Result<Deal> {
        let primary = new.contact.as_deref().map(|id| self.contact(id)).transpose()?;
        let company = self
            .directory
            .find_company(&new.company)
            .map_or(new.company, |c| c.name);

        let mut deal = Deal {
            id: Uuid::new_v4(),
            title: new.title,
            value: new.value,
            stage: DealStage::Outreach,
            owner: new.owner,
            company,
            project: new.project,
            phase: new.phase,
            product: new.product,
            created_at: self.now(),
            signals: Vec::new(),
            profile: OutreachProfile::new(primary),
        };
        deal.profile = readiness::evaluate(&deal);
        self.storage.create_deal(&deal)?;
        log::debug!("deal {}: created for {}", deal.id, deal.project);
        Ok(deal)
    }

    pub fn list_deals(&self) -> Result<Vec<Deal>> {
        Ok(self.storage.list_deals()?)
    }

    pub fn deal(&self, id: Uuid) -> Result<Deal> {
        Ok(self.storage.load_deal(id)?)
    }

    pub fn profile(&self, id: Uuid) -> Result<OutreachProfile> {
        Ok(self.deal(id)?.profile)
    }

    /// Looks a contact up in the directory.
    pub fn contact(&self, id: &str) -> Result<Contact> {
        self.directory
            .find_contact(id)
            .ok_or_else(|| ServiceError::UnknownContact(id.to_string()))
    }

    // ── Transitions ──

    pub fn record_signal(&self, id: Uuid, signal: Signal) -> Result<Applied> {
        self.execute(id, Command::RecordSignal(signal), self.now())
    }

    pub fn confirm(&self, id: Uuid) -> Result<Applied> {
        self.execute(id, Command::Confirm, self.now())
    }

    pub fn decline(&self, id: Uuid) -> Result<Applied> {
        self.execute(id, Command::Decline, self.now())
    }

    pub fn select_mode(&self, id: Uuid, mode: RunMode) -> Result<Applied> {
        self.execute(id, Command::SelectMode(mode), self.now())
    }

    /// Advance the run as of `now`, which need not be the clock's time.
    pub fn tick(&self, id: Uuid, now: Timestamp) -> Result<Applied> {
        self.execute(id, Command::Tick, now)
    }

    pub fn send_manual_email(&self, id: Uuid, content: &str) -> Result<Applied> {
        self.execute(id, Command::SendManualEmail(content.to_string()), self.now())
    }

    pub fn receive_reply(&self, id: Uuid, content: &str) -> Result<Applied> {
        self.execute(id, Command::ReceiveReply(content.to_string()), self.now())
    }

    pub fn start_call(&self, id: Uuid) -> Result<Applied> {
        self.execute(id, Command::StartCall, self.now())
    }

    pub fn set_call_outcome(&self, id: Uuid, outcome: CallOutcome) -> Result<Applied> {
        self.execute(id, Command::SetCallOutcome(outcome), self.now())
    }

    pub fn end_call(&self, id: Uuid, notes: &str, transcript: Option<&str>) -> Result<Applied> {
        let command = Command::EndCall {
            notes: notes.to_string(),
            transcript: transcript.map(str::to_string),
        };
        self.execute(id, command, self.now())
    }

    pub fn cancel_call(&self, id: Uuid) -> Result<Applied> {
        self.execute(id, Command::CancelCall, self.now())
    }

    pub fn skip_step(&self, id: Uuid) -> Result<Applied> {
        self.execute(id, Command::SkipStep, self.now())
    }

    pub fn reset_run(&self, id: Uuid) -> Result<Applied> {
        self.execute(id, Command::ResetRun, self.now())
    }

    // ── Chat ──

    /// Route a line of operator text and log the exchange.
    ///
    /// Returns the assistant's turn. A routed command that fails still gets
    /// a response; only storage and transport failures are errors here.
    pub fn handle_command(&self, id: Uuid, text: &str) -> Result<ChatTurn> {
        let now = self.now();
        let deal = self.storage.load_deal(id)?;
        let routed = router::handle(&deal, text, now);
        log::debug!("deal {id}: {:?} matched {text:?}", routed.rule);

        if !routed.commands.is_empty() {
            let mut next = routed.deal;
            self.carry_out(&mut next, &routed.effects)?;
            self.storage.update_deal(&next)?;
        }

        let question = ChatTurn {
            role: ChatRole::User,
            text: text.to_string(),
            timestamp: now,
            sources: Vec::new(),
        };
        let answer = ChatTurn {
            role: ChatRole::Assistant,
            text: routed.response,
            timestamp: now,
            sources: routed.sources,
        };
        self.storage.append_turn(id, &question)?;
        self.storage.append_turn(id, &answer)?;
        Ok(answer)
    }

    pub fn chat_log(&self, id: Uuid) -> Result<Vec<ChatTurn>> {
        Ok(self.storage.load_chat(id)?)
    }

    fn execute(&self, id: Uuid, command: Command, now: Timestamp) -> Result<Applied> {
        let deal = self.storage.load_deal(id)?;
        let outcome = engine::apply(&deal, command, now)?;
        let mut next = outcome.deal;
        self.carry_out(&mut next, &outcome.effects)?;
        self.storage.update_deal(&next)?;
        Ok(Applied {
            deal: next,
            message: outcome.message,
        })
    }

    /// Runs effects in order, stopping at the first transport failure.
    fn carry_out(&self, deal: &mut Deal, effects: &[Effect]) -> Result<()> {
        for effect in effects {
            match effect {
                Effect::SendEmail { to, subject, body } => {
                    let receipt = self.transport.send_email(to, subject, body)?;
                    log::debug!(
                        "deal {}: email {} sent to {to} at {}",
                        deal.id,
                        receipt.id,
                        receipt.sent_at
                    );
                }
                Effect::PlaceCall { contact } => {
                    let handle = self.transport.place_call(contact)?;
                    if let Some(session) = deal.profile.call_session.as_mut() {
                        session.handle = Some(handle.id);
                    }
                }
            }
        }
        Ok(())
    }
}
