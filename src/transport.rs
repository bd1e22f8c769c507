//! Email and call delivery.
//!
//! The engine never talks to a transport directly: it emits effects, and the
//! service executes them here. Delivery guarantees and retries belong to the
//! transport, not to outreach.

use jiff::Timestamp;
use uuid::Uuid;

use crate::model::Contact;

/// Errors a transport can report. Surfaced to the caller unchanged.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("delivery rejected: {0}")]
    Rejected(String),

    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Proof that an email left.
#[derive(Debug, Clone)]
pub struct SentReceipt {
    pub id: String,
    pub sent_at: Timestamp,
}

/// Handle to a placed call.
#[derive(Debug, Clone)]
pub struct CallHandle {
    pub id: String,
}

/// Sends email and places calls on behalf of the operator.
pub trait Transport {
    fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<SentReceipt, TransportError>;

    fn place_call(&self, contact: &Contact) -> Result<CallHandle, TransportError>;
}

/// A transport that delivers nothing and logs what it would have done.
pub struct LogTransport;

impl Transport for LogTransport {
    fn send_email(
        &self,
        to: &str,
        subject: &str,
        _body: &str,
    ) -> Result<SentReceipt, TransportError> {
        let receipt = SentReceipt {
            id: Uuid::new_v4().to_string(),
            sent_at: Timestamp::now(),
        };
        log::info!("email to {to} ({subject}) queued as {}", receipt.id);
        Ok(receipt)
    }

    fn place_call(&self, contact: &Contact) -> Result<CallHandle, TransportError> {
        let number = contact.phone.as_deref().unwrap_or("no number on file");
        let handle = CallHandle {
            id: Uuid::new_v4().to_string(),
        };
        log::info!("call to {} ({number}) opened as {}", contact.name, handle.id);
        Ok(handle)
    }
}
