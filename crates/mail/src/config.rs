/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `DEFAULT_FROM_EMAIL` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@yamdb.local";

/// Mail settings: the sender address plus an optional SMTP relay.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// RFC 5322 "From" address for every outgoing message.
    pub from_address: String,
    /// `None` when `SMTP_HOST` is unset.
    pub smtp: Option<SmtpConfig>,
}

/// Connection settings for the SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl MailConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable             | Required | Default               |
    /// |----------------------|----------|-----------------------|
    /// | `DEFAULT_FROM_EMAIL` | no       | `noreply@yamdb.local` |
    /// | `SMTP_HOST`          | no       | --                    |
    /// | `SMTP_PORT`          | no       | `587`                 |
    /// | `SMTP_USER`          | no       | --                    |
    /// | `SMTP_PASSWORD`      | no       | --                    |
    pub fn from_env() -> Self {
        let from_address = std::env::var("DEFAULT_FROM_EMAIL")
            .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string());
        Self {
            from_address,
            smtp: SmtpConfig::from_env(),
        }
    }
}

impl SmtpConfig {
    /// Returns `None` if `SMTP_HOST` is not set.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            host,
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            user: std::env::var("SMTP_USER").ok(),
            password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}
