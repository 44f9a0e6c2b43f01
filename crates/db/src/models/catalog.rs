//! Category and genre reference data.

use serde::Serialize;
use sqlx::FromRow;
use yamdb_core::types::{DbId, Timestamp};

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `genres` table.
#[derive(Debug, Clone, FromRow)]
pub struct Genre {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Public `{name, slug}` shape shared by categories and genres.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct SlugRef {
    pub name: String,
    pub slug: String,
}

impl From<&Category> for SlugRef {
    fn from(c: &Category) -> Self {
        Self {
            name: c.name.clone(),
            slug: c.slug.clone(),
        }
    }
}

impl From<&Genre> for SlugRef {
    fn from(g: &Genre) -> Self {
        Self {
            name: g.name.clone(),
            slug: g.slug.clone(),
        }
    }
}

/// DTO for creating a category or a genre.
#[derive(Debug, Clone)]
pub struct CreateSlugged {
    pub name: String,
    pub slug: String,
}
