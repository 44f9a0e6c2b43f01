//! In-memory mailer used by tests.

use std::sync::Mutex;

use crate::message::OutgoingEmail;
use crate::{MailError, Mailer};

/// Records every message it is asked to send.
///
/// A mailer built with [`MemoryMailer::failing`] rejects every message,
/// which lets callers exercise their delivery-failure path.
#[derive(Default)]
pub struct MemoryMailer {
    outbox: Mutex<Vec<OutgoingEmail>>,
    fail: bool,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            outbox: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Snapshot of the messages sent so far.
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }

    /// The most recent message sent to `to`.
    pub fn last_to(&self, to: &str) -> Option<OutgoingEmail> {
        self.sent().into_iter().rev().find(|email| email.to == to)
    }
}

#[async_trait::async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Unavailable("memory mailer set to fail".into()));
        }
        self.outbox
            .lock()
            .map_err(|_| MailError::Unavailable("outbox lock poisoned".into()))?
            .push(email.clone());
        Ok(())
    }
}
