//! Handlers for the `/users` resource (admin user management and `/users/me`).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use yamdb_core::accounts::{
    MAX_EMAIL_LENGTH, MAX_PERSON_NAME_LENGTH, MAX_USERNAME_LENGTH, USERNAME_RE,
};
use yamdb_core::error::CoreError;
use yamdb_core::permissions::{authorize, authorize_object, AdminOnly, IsAuthenticated, Method};
use yamdb_core::roles::Role;
use yamdb_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use yamdb_db::repositories::UserRepo;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::validate_request;
use crate::middleware::auth::Caller;
use crate::query::SearchParams;
use crate::response::Paginated;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(
        required,
        length(min = 1, max = MAX_USERNAME_LENGTH),
        regex(path = *USERNAME_RE),
        custom(function = "yamdb_core::accounts::validate_username_not_reserved")
    )]
    pub username: Option<String>,
    #[validate(required, email, length(max = MAX_EMAIL_LENGTH))]
    pub email: Option<String>,
    #[validate(length(max = MAX_PERSON_NAME_LENGTH))]
    pub first_name: Option<String>,
    #[validate(length(max = MAX_PERSON_NAME_LENGTH))]
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

/// Request body for `PATCH /users/{username}` and `PATCH /users/me`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(
        length(min = 1, max = MAX_USERNAME_LENGTH),
        regex(path = *USERNAME_RE),
        custom(function = "yamdb_core::accounts::validate_username_not_reserved")
    )]
    pub username: Option<String>,
    #[validate(email, length(max = MAX_EMAIL_LENGTH))]
    pub email: Option<String>,
    #[validate(length(max = MAX_PERSON_NAME_LENGTH))]
    pub first_name: Option<String>,
    #[validate(length(max = MAX_PERSON_NAME_LENGTH))]
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

impl UpdateUserRequest {
    fn into_update(self, allow_role: bool) -> UpdateUser {
        UpdateUser {
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            role: if allow_role { self.role } else { None },
        }
    }
}

async fn find_user(state: &AppState, username: &str) -> AppResult<User> {
    Ok(UserRepo::find_by_username(&state.pool, username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", username))?)
}

// ---------------------------------------------------------------------------
// Admin management
// ---------------------------------------------------------------------------

/// GET /api/v1/users?search=
pub async fn list_users(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppQuery(params): AppQuery<SearchParams>,
) -> AppResult<Json<Paginated<UserResponse>>> {
    authorize(&AdminOnly, Method::Get, &ctx)?;
    let (limit, offset) = params.bounds();

    let users = UserRepo::list(&state.pool, params.term(), limit, offset).await?;
    let count = UserRepo::count(&state.pool, params.term()).await?;

    Ok(Json(Paginated::new(
        count,
        users.iter().map(UserResponse::from).collect(),
    )))
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppJson(input): AppJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    authorize(&AdminOnly, Method::Post, &ctx)?;
    validate_request(&input, vec![])?;

    let create = CreateUser {
        username: input.username.unwrap_or_default(),
        email: input.email.unwrap_or_default(),
        first_name: input.first_name.unwrap_or_default(),
        last_name: input.last_name.unwrap_or_default(),
        bio: input.bio,
        role: input.role.unwrap_or_default(),
    };
    let user = UserRepo::create(&state.pool, &create).await?;

    tracing::info!(user_id = user.id, username = %user.username, role = %user.role, "User created");

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// GET /api/v1/users/{username}
pub async fn get_user(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppPath(username): AppPath<String>,
) -> AppResult<Json<UserResponse>> {
    authorize(&AdminOnly, Method::Get, &ctx)?;
    let user = find_user(&state, &username).await?;
    authorize_object(&AdminOnly, Method::Get, &ctx, None)?;

    Ok(Json(UserResponse::from(&user)))
}

/// PATCH /api/v1/users/{username}
pub async fn update_user(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppPath(username): AppPath<String>,
    AppJson(input): AppJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    authorize(&AdminOnly, Method::Patch, &ctx)?;
    let user = find_user(&state, &username).await?;
    authorize_object(&AdminOnly, Method::Patch, &ctx, None)?;
    validate_request(&input, vec![])?;

    let updated = UserRepo::update(&state.pool, user.id, &input.into_update(true))
        .await?
        .ok_or_else(|| CoreError::not_found("User", &username))?;

    tracing::info!(user_id = updated.id, role = %updated.role, "User updated");

    Ok(Json(UserResponse::from(&updated)))
}

/// DELETE /api/v1/users/{username}
///
/// Also deletes the user's reviews and comments.
pub async fn delete_user(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppPath(username): AppPath<String>,
) -> AppResult<StatusCode> {
    authorize(&AdminOnly, Method::Delete, &ctx)?;
    let user = find_user(&state, &username).await?;
    authorize_object(&AdminOnly, Method::Delete, &ctx, None)?;

    UserRepo::delete(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Own profile
// ---------------------------------------------------------------------------

/// GET /api/v1/users/me
pub async fn get_me(
    State(state): State<AppState>,
    Caller(ctx): Caller,
) -> AppResult<Json<UserResponse>> {
    authorize(&IsAuthenticated, Method::Get, &ctx)?;
    let identity = ctx.require_identity()?;

    let user = UserRepo::find_by_id(&state.pool, identity.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &identity.username))?;

    Ok(Json(UserResponse::from(&user)))
}

/// PATCH /api/v1/users/me
///
/// A `role` in the body is ignored: callers cannot change their own role.
pub async fn update_me(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppJson(input): AppJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    authorize(&IsAuthenticated, Method::Patch, &ctx)?;
    let identity = ctx.require_identity()?;
    validate_request(&input, vec![])?;

    let updated = UserRepo::update(&state.pool, identity.user_id, &input.into_update(false))
        .await?
        .ok_or_else(|| CoreError::not_found("User", &identity.username))?;

    tracing::info!(user_id = updated.id, "Profile updated");

    Ok(Json(UserResponse::from(&updated)))
}
