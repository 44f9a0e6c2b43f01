//! Conversion of `validator` results into [`FieldErrors`].

use validator::{ValidationError, ValidationErrors};

use crate::error::{CoreError, FieldErrors};

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                fields.add(&field.to_string(), describe(error));
            }
        }
        fields
    }
}

impl From<ValidationErrors> for CoreError {
    fn from(errors: ValidationErrors) -> Self {
        CoreError::InvalidFields(errors.into())
    }
}

/// Human-readable message for a single validation failure.
fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    match error.code.as_ref() {
        "email" => "Enter a valid email address".to_string(),
        "required" => "This field is required".to_string(),
        "regex" => "Enter a value containing only allowed characters".to_string(),
        "length" => {
            if let Some(max) = error.params.get("max") {
                format!("Ensure this field has no more than {max} characters")
            } else if let Some(min) = error.params.get("min") {
                format!("Ensure this field has at least {min} characters")
            } else {
                "Invalid length".to_string()
            }
        }
        "range" => "Value out of range".to_string(),
        _ => "Invalid value".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Payload {
        #[validate(email)]
        email: String,
        #[validate(length(min = 1, max = 5))]
        slug: String,
        #[validate(custom(function = "crate::accounts::validate_username_not_reserved"))]
        username: String,
    }

    #[test]
    fn validator_errors_become_field_errors() {
        let payload = Payload {
            email: "nope".into(),
            slug: "toolong".into(),
            username: "me".into(),
        };
        let fields: FieldErrors = payload.validate().unwrap_err().into();

        assert_eq!(
            fields.get("email").unwrap(),
            &["Enter a valid email address".to_string()]
        );
        assert_eq!(
            fields.get("slug").unwrap(),
            &["Ensure this field has no more than 5 characters".to_string()]
        );
        assert!(fields.get("username").unwrap()[0].contains("'me'"));
    }

    #[test]
    fn valid_payload_has_no_errors() {
        let payload = Payload {
            email: "a@b.io".into(),
            slug: "ok".into(),
            username: "alice".into(),
        };
        assert!(payload.validate().is_ok());
    }
}
