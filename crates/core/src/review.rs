//! Review scoring and rating aggregation.

use validator::ValidationError;

pub const MIN_SCORE: i32 = 1;

pub const MAX_SCORE: i32 = 10;

/// Message returned when the same author reviews a title twice.
pub const DUPLICATE_REVIEW_MESSAGE: &str = "You have already reviewed this title";

pub fn validate_score(score: i32) -> Result<(), ValidationError> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        let mut err = ValidationError::new("range");
        err.message =
            Some(format!("Score must be between {MIN_SCORE} and {MAX_SCORE}").into());
        return Err(err);
    }
    Ok(())
}

/// Arithmetic mean of the given scores; `None` when there are none.
///
/// Mirrors the `AVG(score)` aggregate the title queries compute in SQL.
pub fn mean_score(scores: &[i32]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let sum: i64 = scores.iter().map(|&s| i64::from(s)).sum();
    Some(sum as f64 / scores.len() as f64)
}
