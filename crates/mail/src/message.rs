//! Message composition.

/// A composed plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub const CONFIRMATION_SUBJECT: &str = "YaMDb confirmation code";

/// The email carrying a freshly issued confirmation code.
pub fn confirmation_email(from: &str, to: &str, username: &str, code: &str) -> OutgoingEmail {
    OutgoingEmail {
        from: from.to_string(),
        to: to.to_string(),
        subject: CONFIRMATION_SUBJECT.to_string(),
        body: format!(
            "Hello, {username}!\n\n\
             Your confirmation code: {code}\n\n\
             Exchange it for an access token at /api/v1/auth/token/ \
             together with your username."
        ),
    }
}
