//! Caller identity passed explicitly into every handler and policy check.

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

/// An authenticated caller, resolved from a bearer token and the `users` row
/// it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: DbId,
    pub username: String,
    pub role: Role,
    pub is_superuser: bool,
    pub is_staff: bool,
}

impl Identity {
    pub fn is_moderator(&self) -> bool {
        self.role == Role::Moderator
    }

    /// Admins are users with the `admin` role or the superuser flag.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin || self.is_superuser
    }
}

/// Authentication state of a request: anonymous or a resolved [`Identity`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    identity: Option<Identity>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// The identity, or `Unauthorized` for anonymous callers.
    pub fn require_identity(&self) -> Result<&Identity, CoreError> {
        self.identity.as_ref().ok_or_else(|| {
            CoreError::Unauthorized("Authentication credentials were not provided".into())
        })
    }
}
