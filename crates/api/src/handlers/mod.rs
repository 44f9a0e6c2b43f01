pub mod auth;
pub mod catalog;
pub mod comments;
pub mod reviews;
pub mod titles;
pub mod users;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::AppError;

/// Reject an explicit `null` for a field that cannot be cleared.
pub(crate) fn not_null<T>(value: &Option<Option<T>>) -> Result<(), ValidationError> {
    if matches!(value, Some(None)) {
        let mut err = ValidationError::new("null");
        err.message = Some("This field may not be null".into());
        return Err(err);
    }
    Ok(())
}

/// Run the derived validation of `input` together with `extra` per-field
/// checks that the derive cannot express, and report every failure at once.
pub(crate) fn validate_request<T: Validate>(
    input: &T,
    extra: Vec<(&'static str, Result<(), ValidationError>)>,
) -> Result<(), AppError> {
    let mut errors = input.validate().err().unwrap_or_else(ValidationErrors::new);
    for (field, result) in extra {
        if let Err(error) = result {
            errors.add(field, error);
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.into())
    }
}
