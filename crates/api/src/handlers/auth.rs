//! Handlers for the `/auth` resource (sign-up, token exchange).

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;
use yamdb_core::accounts::{
    confirmation_code_matches, generate_confirmation_code, plan_signup, ExistingAccount,
    SignupPlan, MAX_EMAIL_LENGTH, MAX_USERNAME_LENGTH, USERNAME_RE,
};
use yamdb_core::error::{CoreError, FieldErrors};
use yamdb_db::models::user::{CreateUser, User};
use yamdb_db::repositories::UserRepo;
use yamdb_mail::confirmation_email;

use crate::auth::jwt::generate_access_token;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::validate_request;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(
        required,
        length(min = 1, max = MAX_USERNAME_LENGTH),
        regex(path = *USERNAME_RE),
        custom(function = "yamdb_core::accounts::validate_username_not_reserved")
    )]
    pub username: Option<String>,
    #[validate(required, email, length(max = MAX_EMAIL_LENGTH))]
    pub email: Option<String>,
}

/// Echo of the accepted sign-up.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub username: String,
    pub email: String,
}

/// Request body for `POST /auth/token`.
#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(required, length(min = 1, max = MAX_USERNAME_LENGTH))]
    pub username: Option<String>,
    #[validate(required, length(min = 1))]
    pub confirmation_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

fn existing(user: &User) -> ExistingAccount<'_> {
    ExistingAccount {
        user_id: user.id,
        username: &user.username,
        email: &user.email,
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Register a user, or re-issue a code for an existing (username, email)
/// pair. The new code is stored on the user and mailed to them.
pub async fn signup(
    State(state): State<AppState>,
    AppJson(input): AppJson<SignupRequest>,
) -> AppResult<Json<SignupResponse>> {
    validate_request(&input, vec![])?;
    let username = input.username.unwrap_or_default();
    let email = input.email.unwrap_or_default();

    let by_username = UserRepo::find_by_username(&state.pool, &username).await?;
    let by_email = UserRepo::find_by_email(&state.pool, &email).await?;
    let plan = plan_signup(
        &username,
        &email,
        by_username.as_ref().map(existing),
        by_email.as_ref().map(existing),
    )?;

    let user_id = match plan {
        SignupPlan::Create => {
            UserRepo::create(&state.pool, &CreateUser::signup(&username, &email))
                .await?
                .id
        }
        SignupPlan::Resend(user_id) => user_id,
    };

    let code = generate_confirmation_code();
    UserRepo::set_confirmation_code(&state.pool, user_id, &code).await?;

    let message = confirmation_email(&state.config.mail.from_address, &email, &username, &code);
    state.mailer.send(&message).await?;

    tracing::info!(
        user_id,
        username = %username,
        resend = matches!(plan, SignupPlan::Resend(_)),
        "Confirmation code issued",
    );

    Ok(Json(SignupResponse { username, email }))
}

/// POST /api/v1/auth/token
///
/// Exchange a username and confirmation code for an access token. The code
/// stays valid after a successful exchange.
pub async fn token(
    State(state): State<AppState>,
    AppJson(input): AppJson<TokenRequest>,
) -> AppResult<Json<TokenResponse>> {
    validate_request(&input, vec![])?;
    let username = input.username.unwrap_or_default();
    let code = input.confirmation_code.unwrap_or_default();

    let user = UserRepo::find_by_username(&state.pool, &username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &username))?;

    if !confirmation_code_matches(user.confirmation_code.as_deref(), &code) {
        tracing::warn!(user_id = user.id, "Confirmation code mismatch");
        return Err(CoreError::InvalidFields(FieldErrors::single(
            "confirmation_code",
            "Invalid confirmation code",
        ))
        .into());
    }

    let token = generate_access_token(user.id, &user.username, user.role(), &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, "Access token issued");

    Ok(Json(TokenResponse { token }))
}
