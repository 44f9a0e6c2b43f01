//! Comment entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use yamdb_core::types::{DbId, Timestamp};

/// A comment joined with its author's username.
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: DbId,
    pub review_id: DbId,
    pub author_id: DbId,
    pub author: String,
    pub text: String,
    pub pub_date: Timestamp,
}

/// Public comment representation.
#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    pub id: DbId,
    pub text: String,
    pub author: String,
    pub pub_date: Timestamp,
}

impl From<Comment> for CommentResponse {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            text: c.text,
            author: c.author,
            pub_date: c.pub_date,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateComment {
    pub review_id: DbId,
    pub author_id: DbId,
    pub text: String,
}
