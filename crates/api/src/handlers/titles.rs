//! Handlers for the `/titles` resource.
//!
//! Reads return the category and genres as nested `{name, slug}` objects and
//! the computed `rating`. Writes reference the category and genres by slug.

use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;
use yamdb_core::catalog::{validate_year, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH};
use yamdb_core::error::{CoreError, FieldErrors};
use yamdb_core::permissions::{authorize, AdminOrReadOnly, Method};
use yamdb_core::types::DbId;
use yamdb_db::models::catalog::SlugRef;
use yamdb_db::models::title::{CreateTitle, TitleFilter, TitleRow, UpdateTitle};
use yamdb_db::repositories::{CategoryRepo, GenreRepo, TitleRepo};
use yamdb_db::DbPool;

use crate::error::AppResult;
use crate::extract::{nullable, AppJson, AppPath, AppQuery};
use crate::handlers::{not_null, validate_request};
use crate::middleware::auth::Caller;
use crate::query::{non_blank, page_bounds};
use crate::response::Paginated;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Path parameters for `/titles/{title_id}`.
#[derive(Debug, Deserialize)]
pub struct TitlePath {
    pub title_id: DbId,
}

/// Query parameters for `GET /titles`.
#[derive(Debug, Default, Deserialize)]
pub struct TitleQuery {
    /// Category slug.
    pub category: Option<String>,
    /// Genre slug.
    pub genre: Option<String>,
    /// Substring of the name, case-insensitive.
    pub name: Option<String>,
    pub year: Option<i32>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl TitleQuery {
    fn filter(&self) -> TitleFilter {
        TitleFilter {
            category: non_blank(self.category.as_deref()).map(str::to_string),
            genre: non_blank(self.genre.as_deref()).map(str::to_string),
            name: non_blank(self.name.as_deref()).map(str::to_string),
            year: self.year,
        }
    }
}

/// Request body for `POST /titles`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTitleRequest {
    #[validate(required, length(min = 1, max = MAX_NAME_LENGTH))]
    pub name: Option<String>,
    #[validate(required)]
    pub year: Option<i32>,
    #[validate(length(max = MAX_DESCRIPTION_LENGTH))]
    pub description: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    /// Genre slugs.
    #[validate(custom(function = "yamdb_core::catalog::validate_unique_slugs"))]
    pub genre: Option<Vec<String>>,
}

/// Request body for `PATCH /titles/{title_id}`.
///
/// Every field tells an absent key (`None`) from an explicit `null`
/// (`Some(None)`). Only `description` may be cleared with `null`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTitleRequest {
    #[serde(default, deserialize_with = "nullable")]
    #[validate(length(min = 1, max = MAX_NAME_LENGTH))]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(length(max = MAX_DESCRIPTION_LENGTH))]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub category: Option<Option<String>>,
    /// Replaces the title's genres when present.
    #[serde(default, deserialize_with = "nullable")]
    #[validate(custom(function = "yamdb_core::catalog::validate_unique_slugs"))]
    pub genre: Option<Option<Vec<String>>>,
}

/// Public title representation.
#[derive(Debug, Serialize)]
pub struct TitleResponse {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    /// Mean review score; `null` while the title has no reviews.
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub genre: Vec<SlugRef>,
    pub category: Option<SlugRef>,
}

impl TitleResponse {
    fn new(row: TitleRow, genre: Vec<SlugRef>) -> Self {
        let category = match (row.category_name, row.category_slug) {
            (Some(name), Some(slug)) => Some(SlugRef { name, slug }),
            _ => None,
        };
        Self {
            id: row.id,
            name: row.name,
            year: row.year,
            rating: row.rating,
            description: row.description,
            genre,
            category,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Attach genres to a page of title rows with one batched query.
async fn with_genres(pool: &DbPool, rows: Vec<TitleRow>) -> AppResult<Vec<TitleResponse>> {
    let ids: Vec<DbId> = rows.iter().map(|row| row.id).collect();
    let mut genres: HashMap<DbId, Vec<SlugRef>> = HashMap::new();
    for link in TitleRepo::genres_for(pool, &ids).await? {
        genres.entry(link.title_id).or_default().push(SlugRef {
            name: link.name,
            slug: link.slug,
        });
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let genre = genres.remove(&row.id).unwrap_or_default();
            TitleResponse::new(row, genre)
        })
        .collect())
}

async fn load_title(pool: &DbPool, title_id: DbId) -> AppResult<TitleResponse> {
    let row = TitleRepo::find_by_id(pool, title_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Title", title_id))?;
    let mut titles = with_genres(pool, vec![row]).await?;
    titles
        .pop()
        .ok_or_else(|| CoreError::not_found("Title", title_id).into())
}

/// Category and genre ids resolved from the slugs in a write request.
struct References {
    category_id: Option<DbId>,
    genre_ids: Option<Vec<DbId>>,
}

/// Resolve slugs to ids. Unknown slugs are reported per field.
async fn resolve_references(
    pool: &DbPool,
    category: Option<&str>,
    genre: Option<&[String]>,
) -> AppResult<References> {
    let mut errors = FieldErrors::new();

    let mut category_id = None;
    if let Some(slug) = category {
        match CategoryRepo::find_by_slug(pool, slug).await? {
            Some(found) => category_id = Some(found.id),
            None => errors.add("category", format!("Category with slug '{slug}' does not exist")),
        }
    }

    let mut genre_ids = None;
    if let Some(slugs) = genre {
        let found = GenreRepo::find_by_slugs(pool, slugs).await?;
        for slug in slugs {
            if !found.iter().any(|g| &g.slug == slug) {
                errors.add("genre", format!("Genre with slug '{slug}' does not exist"));
            }
        }
        genre_ids = Some(found.iter().map(|g| g.id).collect());
    }

    errors.into_result()?;
    Ok(References {
        category_id,
        genre_ids,
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/titles?category=&genre=&name=&year=
pub async fn list_titles(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppQuery(params): AppQuery<TitleQuery>,
) -> AppResult<Json<Paginated<TitleResponse>>> {
    authorize(&AdminOrReadOnly, Method::Get, &ctx)?;
    let (limit, offset) = page_bounds(params.limit, params.offset);
    let filter = params.filter();

    let rows = TitleRepo::list(&state.pool, &filter, limit, offset).await?;
    let count = TitleRepo::count(&state.pool, &filter).await?;

    Ok(Json(Paginated::new(
        count,
        with_genres(&state.pool, rows).await?,
    )))
}

/// GET /api/v1/titles/{title_id}
pub async fn get_title(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppPath(path): AppPath<TitlePath>,
) -> AppResult<Json<TitleResponse>> {
    authorize(&AdminOrReadOnly, Method::Get, &ctx)?;
    Ok(Json(load_title(&state.pool, path.title_id).await?))
}

/// POST /api/v1/titles
pub async fn create_title(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppJson(input): AppJson<CreateTitleRequest>,
) -> AppResult<(StatusCode, Json<TitleResponse>)> {
    authorize(&AdminOrReadOnly, Method::Post, &ctx)?;
    validate_request(
        &input,
        vec![("year", input.year.map_or(Ok(()), validate_year))],
    )?;

    let refs =
        resolve_references(&state.pool, input.category.as_deref(), input.genre.as_deref()).await?;

    let create = CreateTitle {
        name: input.name.unwrap_or_default(),
        year: input.year.unwrap_or_default(),
        description: input.description,
        category_id: refs.category_id,
        genre_ids: refs.genre_ids.unwrap_or_default(),
    };
    let title_id = TitleRepo::create(&state.pool, &create).await?;
    tracing::info!(title_id, name = %create.name, "Title created");

    Ok((
        StatusCode::CREATED,
        Json(load_title(&state.pool, title_id).await?),
    ))
}

/// PATCH /api/v1/titles/{title_id}
pub async fn update_title(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppPath(path): AppPath<TitlePath>,
    AppJson(input): AppJson<UpdateTitleRequest>,
) -> AppResult<Json<TitleResponse>> {
    authorize(&AdminOrReadOnly, Method::Patch, &ctx)?;
    if !TitleRepo::exists(&state.pool, path.title_id).await? {
        return Err(CoreError::not_found("Title", path.title_id).into());
    }
    validate_request(
        &input,
        vec![
            ("name", not_null(&input.name)),
            ("year", not_null(&input.year)),
            ("year", input.year.flatten().map_or(Ok(()), validate_year)),
            ("category", not_null(&input.category)),
            ("genre", not_null(&input.genre)),
        ],
    )?;

    let refs = resolve_references(
        &state.pool,
        input.category.as_ref().and_then(|c| c.as_deref()),
        input.genre.as_ref().and_then(|g| g.as_deref()),
    )
    .await?;

    let update = UpdateTitle {
        name: input.name.flatten(),
        year: input.year.flatten(),
        description: input.description,
        category_id: refs.category_id,
        genre_ids: refs.genre_ids,
    };
    if !TitleRepo::update(&state.pool, path.title_id, &update).await? {
        return Err(CoreError::not_found("Title", path.title_id).into());
    }
    tracing::info!(title_id = path.title_id, "Title updated");

    Ok(Json(load_title(&state.pool, path.title_id).await?))
}

/// DELETE /api/v1/titles/{title_id}
///
/// Deletes the title's reviews and their comments with it.
pub async fn delete_title(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppPath(path): AppPath<TitlePath>,
) -> AppResult<StatusCode> {
    authorize(&AdminOrReadOnly, Method::Delete, &ctx)?;

    if !TitleRepo::delete(&state.pool, path.title_id).await? {
        return Err(CoreError::not_found("Title", path.title_id).into());
    }
    tracing::info!(title_id = path.title_id, "Title deleted");

    Ok(StatusCode::NO_CONTENT)
}
