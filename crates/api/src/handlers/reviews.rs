//! Handlers for `/titles/{title_id}/reviews`.
//!
//! Anyone may read. Any authenticated user may post one review per title.
//! Only the author, a moderator or an admin may edit or delete a review;
//! that check runs against the loaded review, so other callers get 403.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use yamdb_core::error::{CoreError, FieldErrors, NON_FIELD_ERRORS};
use yamdb_core::permissions::{authorize, authorize_object, AuthorOrModeratorOrReadOnly, Method};
use yamdb_core::review::{validate_score, DUPLICATE_REVIEW_MESSAGE};
use yamdb_core::types::DbId;
use yamdb_db::models::review::{CreateReview, Review, ReviewResponse, UpdateReview};
use yamdb_db::repositories::{ReviewRepo, TitleRepo};
use yamdb_db::DbPool;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::titles::TitlePath;
use crate::handlers::validate_request;
use crate::middleware::auth::Caller;
use crate::query::PaginationParams;
use crate::response::Paginated;
use crate::state::AppState;

const POLICY: AuthorOrModeratorOrReadOnly = AuthorOrModeratorOrReadOnly;

/// Path parameters for `/titles/{title_id}/reviews/{review_id}`.
#[derive(Debug, Deserialize)]
pub struct ReviewPath {
    pub title_id: DbId,
    pub review_id: DbId,
}

/// Request body for `POST .../reviews`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(required, length(min = 1))]
    pub text: Option<String>,
    #[validate(required)]
    pub score: Option<i32>,
}

/// Request body for `PATCH .../reviews/{review_id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[validate(length(min = 1))]
    pub text: Option<String>,
    pub score: Option<i32>,
}

async fn ensure_title(pool: &DbPool, title_id: DbId) -> AppResult<()> {
    if TitleRepo::exists(pool, title_id).await? {
        Ok(())
    } else {
        Err(CoreError::not_found("Title", title_id).into())
    }
}

/// Load a review that belongs to the title in the path.
pub(crate) async fn find_review(pool: &DbPool, title_id: DbId, review_id: DbId) -> AppResult<Review> {
    Ok(ReviewRepo::find_in_title(pool, title_id, review_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Review", review_id))?)
}

/// GET /api/v1/titles/{title_id}/reviews
///
/// Newest first.
pub async fn list_reviews(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppPath(path): AppPath<TitlePath>,
    AppQuery(page): AppQuery<PaginationParams>,
) -> AppResult<Json<Paginated<ReviewResponse>>> {
    authorize(&POLICY, Method::Get, &ctx)?;
    ensure_title(&state.pool, path.title_id).await?;
    let (limit, offset) = page.bounds();

    let reviews = ReviewRepo::list_for_title(&state.pool, path.title_id, limit, offset).await?;
    let count = ReviewRepo::count_for_title(&state.pool, path.title_id).await?;

    Ok(Json(Paginated::new(
        count,
        reviews.into_iter().map(ReviewResponse::from).collect(),
    )))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}
pub async fn get_review(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppPath(path): AppPath<ReviewPath>,
) -> AppResult<Json<ReviewResponse>> {
    authorize(&POLICY, Method::Get, &ctx)?;
    let review = find_review(&state.pool, path.title_id, path.review_id).await?;
    authorize_object(&POLICY, Method::Get, &ctx, Some(review.author_id))?;

    Ok(Json(review.into()))
}

/// POST /api/v1/titles/{title_id}/reviews
///
/// Fails with a validation error when the caller already reviewed the title.
/// The `uq_reviews_title_author` constraint rejects concurrent duplicates
/// that get past the pre-check.
pub async fn create_review(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppPath(path): AppPath<TitlePath>,
    AppJson(input): AppJson<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<ReviewResponse>)> {
    authorize(&POLICY, Method::Post, &ctx)?;
    let author = ctx.require_identity()?;
    ensure_title(&state.pool, path.title_id).await?;
    validate_request(
        &input,
        vec![("score", input.score.map_or(Ok(()), validate_score))],
    )?;

    if ReviewRepo::exists_for_author(&state.pool, path.title_id, author.user_id).await? {
        return Err(CoreError::InvalidFields(FieldErrors::single(
            NON_FIELD_ERRORS,
            DUPLICATE_REVIEW_MESSAGE,
        ))
        .into());
    }

    let create = CreateReview {
        title_id: path.title_id,
        author_id: author.user_id,
        text: input.text.unwrap_or_default(),
        score: input.score.unwrap_or_default(),
    };
    let review = ReviewRepo::create(&state.pool, &create).await?;
    tracing::info!(
        review_id = review.id,
        title_id = path.title_id,
        user_id = author.user_id,
        score = review.score,
        "Review created",
    );

    Ok((StatusCode::CREATED, Json(review.into())))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}
pub async fn update_review(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppPath(path): AppPath<ReviewPath>,
    AppJson(input): AppJson<UpdateReviewRequest>,
) -> AppResult<Json<ReviewResponse>> {
    authorize(&POLICY, Method::Patch, &ctx)?;
    let review = find_review(&state.pool, path.title_id, path.review_id).await?;
    authorize_object(&POLICY, Method::Patch, &ctx, Some(review.author_id))?;
    validate_request(
        &input,
        vec![("score", input.score.map_or(Ok(()), validate_score))],
    )?;

    let update = UpdateReview {
        text: input.text,
        score: input.score,
    };
    let updated = ReviewRepo::update(&state.pool, review.id, &update)
        .await?
        .ok_or_else(|| CoreError::not_found("Review", review.id))?;
    tracing::info!(review_id = updated.id, title_id = path.title_id, "Review updated");

    Ok(Json(updated.into()))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}
///
/// Deletes the review's comments with it.
pub async fn delete_review(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppPath(path): AppPath<ReviewPath>,
) -> AppResult<StatusCode> {
    authorize(&POLICY, Method::Delete, &ctx)?;
    let review = find_review(&state.pool, path.title_id, path.review_id).await?;
    authorize_object(&POLICY, Method::Delete, &ctx, Some(review.author_id))?;

    ReviewRepo::delete(&state.pool, review.id).await?;
    tracing::info!(review_id = review.id, title_id = path.title_id, "Review deleted");

    Ok(StatusCode::NO_CONTENT)
}
