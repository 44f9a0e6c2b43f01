//! Account rules: username constraints, sign-up planning and confirmation
//! codes.

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidationError;

use crate::error::{CoreError, FieldErrors};
use crate::types::DbId;

/// Username that can never be registered; `/users/me` is the caller's own
/// profile.
pub const RESERVED_USERNAME: &str = "me";

pub const MAX_USERNAME_LENGTH: u64 = 150;

pub const MAX_EMAIL_LENGTH: u64 = 254;

pub const MAX_PERSON_NAME_LENGTH: u64 = 150;

/// Value stored in `users.confirmation_code` before a code was ever issued.
pub const PLACEHOLDER_CONFIRMATION_CODE: &str = "XXXX";

/// Unicode letters and digits plus `@ . + - _`.
pub static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("username regex is valid"));

/// Reject the reserved username. Used as a `validator` custom rule.
pub fn validate_username_not_reserved(username: &str) -> Result<(), ValidationError> {
    if username == RESERVED_USERNAME {
        let mut err = ValidationError::new("reserved_username");
        err.message = Some(format!("Using '{RESERVED_USERNAME}' as a username is not allowed").into());
        return Err(err);
    }
    Ok(())
}

/// An existing account found while handling a sign-up.
#[derive(Debug, Clone, Copy)]
pub struct ExistingAccount<'a> {
    pub user_id: DbId,
    pub username: &'a str,
    pub email: &'a str,
}

/// What a sign-up request should do with storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupPlan {
    /// No account uses the username or email: create one.
    Create,
    /// The exact (username, email) pair exists: issue a fresh code to it.
    Resend(DbId),
}

/// Decide between creating an account and re-sending a code.
///
/// `by_username` and `by_email` are the accounts currently holding the
/// requested username and email, if any. A username or email held by a
/// *different* pairing is a field error.
pub fn plan_signup(
    username: &str,
    email: &str,
    by_username: Option<ExistingAccount<'_>>,
    by_email: Option<ExistingAccount<'_>>,
) -> Result<SignupPlan, CoreError> {
    if let Some(existing) = by_username {
        if existing.email == email {
            return Ok(SignupPlan::Resend(existing.user_id));
        }
    }

    let mut errors = FieldErrors::new();
    if by_username.is_some() {
        errors.add("username", "A user with that username already exists");
    }
    if by_email.is_some_and(|existing| existing.username != username) {
        errors.add("email", "A user with that email already exists");
    }
    errors.into_result()?;

    Ok(SignupPlan::Create)
}

/// Generate a fresh random confirmation code.
pub fn generate_confirmation_code() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Compare a submitted code with the stored one as plain strings.
///
/// A missing stored code, or the placeholder of an account that never went
/// through sign-up, never matches. Codes stay valid after a successful
/// exchange.
pub fn confirmation_code_matches(stored: Option<&str>, provided: &str) -> bool {
    stored.is_some_and(|code| code != PLACEHOLDER_CONFIRMATION_CODE && code == provided)
}
