//! Title entity model, read projection and DTOs.

use sqlx::FromRow;
use yamdb_core::types::DbId;

/// A title joined with its category and its computed rating.
///
/// `rating` is `AVG(reviews.score)` and is `None` while the title has no
/// reviews.
#[derive(Debug, Clone, FromRow)]
pub struct TitleRow {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub rating: Option<f64>,
}

/// One genre attached to a title, as returned by the batched genre lookup.
#[derive(Debug, Clone, FromRow)]
pub struct TitleGenre {
    pub title_id: DbId,
    pub name: String,
    pub slug: String,
}

/// Filters accepted by the title list.
#[derive(Debug, Clone, Default)]
pub struct TitleFilter {
    /// Exact category slug.
    pub category: Option<String>,
    /// Exact genre slug.
    pub genre: Option<String>,
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    /// Exact release year.
    pub year: Option<i32>,
}

/// DTO for creating a title. Category and genres are already resolved to ids.
#[derive(Debug, Clone)]
pub struct CreateTitle {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub genre_ids: Vec<DbId>,
}

/// DTO for patching a title. `genre_ids`, when present, replaces the set.
#[derive(Debug, Clone, Default)]
pub struct UpdateTitle {
    pub name: Option<String>,
    pub year: Option<i32>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub category_id: Option<DbId>,
    pub genre_ids: Option<Vec<DbId>>,
}
