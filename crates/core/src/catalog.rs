//! Catalog constants and validation (genres, categories, titles).

use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;
use validator::ValidationError;

pub const MAX_NAME_LENGTH: u64 = 256;

pub const MAX_SLUG_LENGTH: u64 = 50;

pub const MAX_DESCRIPTION_LENGTH: u64 = 256;

/// Letters, digits, hyphens and underscores.
pub static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug regex is valid"));

pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// A title cannot be released after the current year.
pub fn validate_year(year: i32) -> Result<(), ValidationError> {
    validate_year_against(year, current_year())
}

fn validate_year_against(year: i32, current: i32) -> Result<(), ValidationError> {
    if year > current {
        let mut err = ValidationError::new("future_year");
        err.message = Some(format!("Year cannot be later than {current}").into());
        return Err(err);
    }
    Ok(())
}

/// Slugs referenced by a title must not repeat.
pub fn validate_unique_slugs(slugs: &[String]) -> Result<(), ValidationError> {
    let mut seen = std::collections::HashSet::new();
    for slug in slugs {
        if !seen.insert(slug.as_str()) {
            let mut err = ValidationError::new("duplicate_slug");
            err.message = Some(format!("Genre '{slug}' is listed more than once").into());
            return Err(err);
        }
    }
    Ok(())
}
