//! Log-only mailer for deployments without an SMTP relay.

use crate::message::OutgoingEmail;
use crate::{MailError, Mailer};

/// Writes each message to the log at `info` level instead of sending it.
pub struct LogMailer;

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(
            from = %email.from,
            to = %email.to,
            subject = %email.subject,
            body = %email.body,
            "Email not sent (no SMTP relay configured)"
        );
        Ok(())
    }
}
