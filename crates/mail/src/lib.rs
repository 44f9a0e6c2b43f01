//! Out-of-band delivery of confirmation codes.
//!
//! [`Mailer`] is the seam the API depends on. Three implementations exist:
//! - [`smtp::SmtpMailer`] -- real delivery through `lettre`.
//! - [`log::LogMailer`] -- writes the message to the log; used when no SMTP
//!   server is configured.
//! - [`memory::MemoryMailer`] -- keeps messages in memory for tests.

pub mod config;
pub mod log;
pub mod memory;
pub mod message;
pub mod smtp;

use std::sync::Arc;

pub use config::{MailConfig, SmtpConfig};
pub use message::{confirmation_email, OutgoingEmail};

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// The mailer refused the message without reaching a transport.
    #[error("Mailer unavailable: {0}")]
    Unavailable(String),
}

/// Sends a fully composed email.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// Build the mailer described by `config`: SMTP when a host is configured,
/// log-only otherwise.
pub fn build_mailer(config: &MailConfig) -> Arc<dyn Mailer> {
    match &config.smtp {
        Some(smtp) => Arc::new(smtp::SmtpMailer::new(smtp.clone())),
        None => {
            tracing::warn!("SMTP_HOST not set; confirmation codes will only be logged");
            Arc::new(log::LogMailer)
        }
    }
}
