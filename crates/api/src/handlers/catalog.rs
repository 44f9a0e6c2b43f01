//! Handlers for the `/categories` and `/genres` reference-data resources.
//!
//! Both support list (public), create and delete (admin). There is no
//! update, and retrieving a single entry by slug is not exposed.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use yamdb_core::catalog::{MAX_NAME_LENGTH, MAX_SLUG_LENGTH, SLUG_RE};
use yamdb_core::error::{CoreError, FieldErrors};
use yamdb_core::permissions::{authorize, AdminOrReadOnly, Method};
use yamdb_db::models::catalog::{CreateSlugged, SlugRef};
use yamdb_db::repositories::{CategoryRepo, GenreRepo};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::validate_request;
use crate::middleware::auth::Caller;
use crate::query::SearchParams;
use crate::response::Paginated;
use crate::state::AppState;

/// Request body for `POST /categories` and `POST /genres`.
#[derive(Debug, Deserialize, Validate)]
pub struct SluggedRequest {
    #[validate(required, length(min = 1, max = MAX_NAME_LENGTH))]
    pub name: Option<String>,
    #[validate(required, length(min = 1, max = MAX_SLUG_LENGTH), regex(path = *SLUG_RE))]
    pub slug: Option<String>,
}

impl SluggedRequest {
    fn into_create(self) -> CreateSlugged {
        CreateSlugged {
            name: self.name.unwrap_or_default(),
            slug: self.slug.unwrap_or_default(),
        }
    }
}

fn slug_taken() -> CoreError {
    CoreError::InvalidFields(FieldErrors::single("slug", "This slug is already in use"))
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// GET /api/v1/categories?search=
pub async fn list_categories(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppQuery(params): AppQuery<SearchParams>,
) -> AppResult<Json<Paginated<SlugRef>>> {
    authorize(&AdminOrReadOnly, Method::Get, &ctx)?;
    let (limit, offset) = params.bounds();

    let items = CategoryRepo::list(&state.pool, params.term(), limit, offset).await?;
    let count = CategoryRepo::count(&state.pool, params.term()).await?;

    Ok(Json(Paginated::new(
        count,
        items.iter().map(SlugRef::from).collect(),
    )))
}

/// POST /api/v1/categories
pub async fn create_category(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppJson(input): AppJson<SluggedRequest>,
) -> AppResult<(StatusCode, Json<SlugRef>)> {
    authorize(&AdminOrReadOnly, Method::Post, &ctx)?;
    validate_request(&input, vec![])?;
    let input = input.into_create();

    if CategoryRepo::find_by_slug(&state.pool, &input.slug)
        .await?
        .is_some()
    {
        return Err(slug_taken().into());
    }

    let category = CategoryRepo::create(&state.pool, &input).await?;
    tracing::info!(category_id = category.id, slug = %category.slug, "Category created");

    Ok((StatusCode::CREATED, Json(SlugRef::from(&category))))
}

/// DELETE /api/v1/categories/{slug}
///
/// Titles in the category keep existing with no category.
pub async fn delete_category(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppPath(slug): AppPath<String>,
) -> AppResult<StatusCode> {
    authorize(&AdminOrReadOnly, Method::Delete, &ctx)?;

    if !CategoryRepo::delete_by_slug(&state.pool, &slug).await? {
        return Err(CoreError::not_found("Category", &slug).into());
    }
    tracing::info!(slug = %slug, "Category deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Genres
// ---------------------------------------------------------------------------

/// GET /api/v1/genres?search=
pub async fn list_genres(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppQuery(params): AppQuery<SearchParams>,
) -> AppResult<Json<Paginated<SlugRef>>> {
    authorize(&AdminOrReadOnly, Method::Get, &ctx)?;
    let (limit, offset) = params.bounds();

    let items = GenreRepo::list(&state.pool, params.term(), limit, offset).await?;
    let count = GenreRepo::count(&state.pool, params.term()).await?;

    Ok(Json(Paginated::new(
        count,
        items.iter().map(SlugRef::from).collect(),
    )))
}

/// POST /api/v1/genres
pub async fn create_genre(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppJson(input): AppJson<SluggedRequest>,
) -> AppResult<(StatusCode, Json<SlugRef>)> {
    authorize(&AdminOrReadOnly, Method::Post, &ctx)?;
    validate_request(&input, vec![])?;
    let input = input.into_create();

    if GenreRepo::find_by_slug(&state.pool, &input.slug)
        .await?
        .is_some()
    {
        return Err(slug_taken().into());
    }

    let genre = GenreRepo::create(&state.pool, &input).await?;
    tracing::info!(genre_id = genre.id, slug = %genre.slug, "Genre created");

    Ok((StatusCode::CREATED, Json(SlugRef::from(&genre))))
}

/// DELETE /api/v1/genres/{slug}
///
/// The genre is detached from every title that had it.
pub async fn delete_genre(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppPath(slug): AppPath<String>,
) -> AppResult<StatusCode> {
    authorize(&AdminOrReadOnly, Method::Delete, &ctx)?;

    if !GenreRepo::delete_by_slug(&state.pool, &slug).await? {
        return Err(CoreError::not_found("Genre", &slug).into());
    }
    tracing::info!(slug = %slug, "Genre deleted");

    Ok(StatusCode::NO_CONTENT)
}
