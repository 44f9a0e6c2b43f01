use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use yamdb_core::error::{CoreError, FieldErrors, NON_FIELD_ERRORS};
use yamdb_core::review::DUPLICATE_REVIEW_MESSAGE;
use yamdb_mail::MailError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses of
/// the form `{"error": ..., "code": ..., "fields": {...}}`, where `fields`
/// is present only for field-level validation failures.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `yamdb_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Confirmation-code delivery failed.
    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    /// A malformed request (unparseable body or path).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(errors.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = match self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(&err),

            // --- Delivery errors ---
            AppError::Mail(err) => {
                tracing::error!(error = %err, "Confirmation code delivery failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MAIL_ERROR",
                    "Could not deliver the confirmation code".to_string(),
                    None,
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = match fields {
            Some(fields) => json!({
                "error": message,
                "code": code,
                "fields": fields,
            }),
            None => json!({
                "error": message,
                "code": code,
            }),
        };

        (status, axum::Json(body)).into_response()
    }
}

type Classified = (StatusCode, &'static str, String, Option<FieldErrors>);

fn internal() -> Classified {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
        None,
    )
}

fn invalid_fields(fields: FieldErrors) -> Classified {
    (
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR",
        fields.to_string(),
        Some(fields),
    )
}

fn classify_core_error(core: CoreError) -> Classified {
    match core {
        CoreError::NotFound { entity, key } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} {key} not found"),
            None,
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg, None),
        CoreError::InvalidFields(fields) => invalid_fields(fields),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg, None),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg, None),
        CoreError::MethodNotAllowed => (
            StatusCode::METHOD_NOT_ALLOWED,
            "METHOD_NOT_ALLOWED",
            "Method not allowed".to_string(),
            None,
        ),
    }
}

/// Classify a sqlx error into an HTTP status, error code and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique, foreign-key and check violations (SQLSTATE 23505, 23503,
///   23514) map to 400 with a field entry derived from the constraint name.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> Classified {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
            None,
        ),
        sqlx::Error::Database(db_err)
            if matches!(db_err.code().as_deref(), Some("23505" | "23503" | "23514")) =>
        {
            let constraint = db_err.constraint().unwrap_or("unknown");
            tracing::debug!(constraint, "Constraint violation mapped to 400");
            let (field, message) = constraint_field(constraint);
            invalid_fields(FieldErrors::single(field, message))
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}

/// Request field and message reported for a violated constraint.
pub fn constraint_field(constraint: &str) -> (&'static str, &'static str) {
    match constraint {
        "uq_users_username" => ("username", "A user with that username already exists"),
        "uq_users_email" => ("email", "A user with that email already exists"),
        "uq_categories_slug" | "uq_genres_slug" => ("slug", "This slug is already in use"),
        "uq_reviews_title_author" => (NON_FIELD_ERRORS, DUPLICATE_REVIEW_MESSAGE),
        "uq_title_genres_title_genre" => ("genre", "Genres must not repeat"),
        "ck_reviews_score" => ("score", "Score must be between 1 and 10"),
        "ck_users_role" => ("role", "Unknown role"),
        _ if constraint.ends_with("_fkey") => {
            (NON_FIELD_ERRORS, "A referenced object does not exist")
        }
        _ => (NON_FIELD_ERRORS, "The request conflicts with existing data"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_constraints_name_their_field() {
        assert_eq!(constraint_field("uq_users_username").0, "username");
        assert_eq!(constraint_field("uq_users_email").0, "email");
        assert_eq!(constraint_field("uq_genres_slug").0, "slug");
        assert_eq!(constraint_field("uq_categories_slug").0, "slug");
    }

    #[test]
    fn duplicate_review_is_a_non_field_error() {
        assert_eq!(
            constraint_field("uq_reviews_title_author"),
            (NON_FIELD_ERRORS, DUPLICATE_REVIEW_MESSAGE)
        );
    }

    #[test]
    fn unknown_constraints_fall_back_to_non_field_errors() {
        assert_eq!(constraint_field("reviews_author_id_fkey").0, NON_FIELD_ERRORS);
        assert_eq!(constraint_field("something_else").0, NON_FIELD_ERRORS);
    }
}
