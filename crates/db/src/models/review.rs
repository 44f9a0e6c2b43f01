//! Review entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use yamdb_core::types::{DbId, Timestamp};

/// A review joined with its author's username.
#[derive(Debug, Clone, FromRow)]
pub struct Review {
    pub id: DbId,
    pub title_id: DbId,
    pub author_id: DbId,
    pub author: String,
    pub text: String,
    pub score: i32,
    pub pub_date: Timestamp,
}

/// Public review representation.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewResponse {
    pub id: DbId,
    pub text: String,
    pub author: String,
    pub score: i32,
    pub pub_date: Timestamp,
}

impl From<Review> for ReviewResponse {
    fn from(r: Review) -> Self {
        Self {
            id: r.id,
            text: r.text,
            author: r.author,
            score: r.score,
            pub_date: r.pub_date,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateReview {
    pub title_id: DbId,
    pub author_id: DbId,
    pub text: String,
    pub score: i32,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateReview {
    pub text: Option<String>,
    pub score: Option<i32>,
}
