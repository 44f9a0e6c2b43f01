//! Permission policies.
//!
//! A policy is a pure predicate over the request method, the caller's
//! [`AuthContext`] and, for object-level checks, the author of the target
//! object. Handlers run the coarse [`Policy::has_permission`] check before
//! touching storage and [`Policy::has_object_permission`] once the target
//! has been loaded, before any mutation is applied.

use crate::error::CoreError;
use crate::identity::AuthContext;
use crate::types::DbId;

/// HTTP request method as seen by the policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Options,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// GET, HEAD and OPTIONS never modify state.
    pub fn is_safe(self) -> bool {
        matches!(self, Method::Get | Method::Head | Method::Options)
    }
}

pub trait Policy {
    /// Endpoint-level check, evaluated before the target object is loaded.
    fn has_permission(&self, method: Method, ctx: &AuthContext) -> bool;

    /// Object-level check. `author_id` is the owner of the target object
    /// when it has one.
    fn has_object_permission(
        &self,
        method: Method,
        ctx: &AuthContext,
        _author_id: Option<DbId>,
    ) -> bool {
        self.has_permission(method, ctx)
    }
}

/// Any authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct IsAuthenticated;

impl Policy for IsAuthenticated {
    fn has_permission(&self, _method: Method, ctx: &AuthContext) -> bool {
        ctx.is_authenticated()
    }
}

/// Admins (role `admin` or superuser) for every method. At object level
/// staff accounts are accepted as well.
#[derive(Debug, Clone, Copy)]
pub struct AdminOnly;

impl Policy for AdminOnly {
    fn has_permission(&self, _method: Method, ctx: &AuthContext) -> bool {
        ctx.identity().is_some_and(|id| id.is_admin())
    }

    fn has_object_permission(
        &self,
        _method: Method,
        ctx: &AuthContext,
        _author_id: Option<DbId>,
    ) -> bool {
        ctx.identity().is_some_and(|id| id.is_admin() || id.is_staff)
    }
}

/// Safe methods for everyone; everything else for admins only.
#[derive(Debug, Clone, Copy)]
pub struct AdminOrReadOnly;

impl Policy for AdminOrReadOnly {
    fn has_permission(&self, method: Method, ctx: &AuthContext) -> bool {
        method.is_safe() || ctx.identity().is_some_and(|id| id.is_admin())
    }
}

/// Safe methods for everyone, creation for any authenticated caller,
/// modification for the object's author, moderators and admins.
#[derive(Debug, Clone, Copy)]
pub struct AuthorOrModeratorOrReadOnly;

impl Policy for AuthorOrModeratorOrReadOnly {
    fn has_permission(&self, method: Method, ctx: &AuthContext) -> bool {
        method.is_safe() || ctx.is_authenticated()
    }

    fn has_object_permission(
        &self,
        method: Method,
        ctx: &AuthContext,
        author_id: Option<DbId>,
    ) -> bool {
        if method.is_safe() {
            return true;
        }
        let Some(identity) = ctx.identity() else {
            return false;
        };
        author_id == Some(identity.user_id) || identity.is_moderator() || identity.is_admin()
    }
}

/// Run the endpoint-level check of `policy`.
///
/// Anonymous callers are rejected with `Unauthorized`, authenticated ones
/// with `Forbidden`.
pub fn authorize(policy: &impl Policy, method: Method, ctx: &AuthContext) -> Result<(), CoreError> {
    if policy.has_permission(method, ctx) {
        Ok(())
    } else {
        Err(denied(ctx))
    }
}

/// Run the object-level check of `policy` against an object owned by
/// `author_id`.
pub fn authorize_object(
    policy: &impl Policy,
    method: Method,
    ctx: &AuthContext,
    author_id: Option<DbId>,
) -> Result<(), CoreError> {
    if policy.has_object_permission(method, ctx, author_id) {
        Ok(())
    } else {
        Err(denied(ctx))
    }
}

fn denied(ctx: &AuthContext) -> CoreError {
    if ctx.is_authenticated() {
        CoreError::Forbidden("You do not have permission to perform this action".into())
    } else {
        CoreError::Unauthorized("Authentication credentials were not provided".into())
    }
}
