//! Handlers for `/titles/{title_id}/reviews/{review_id}/comments`.
//!
//! Same access rules as reviews, without the one-per-author limit.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use yamdb_core::error::CoreError;
use yamdb_core::permissions::{authorize, authorize_object, AuthorOrModeratorOrReadOnly, Method};
use yamdb_core::types::DbId;
use yamdb_db::models::comment::{Comment, CommentResponse, CreateComment};
use yamdb_db::repositories::CommentRepo;
use yamdb_db::DbPool;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::reviews::{find_review, ReviewPath};
use crate::handlers::validate_request;
use crate::middleware::auth::Caller;
use crate::query::PaginationParams;
use crate::response::Paginated;
use crate::state::AppState;

const POLICY: AuthorOrModeratorOrReadOnly = AuthorOrModeratorOrReadOnly;

/// Path parameters for `.../comments/{comment_id}`.
#[derive(Debug, Deserialize)]
pub struct CommentPath {
    pub title_id: DbId,
    pub review_id: DbId,
    pub comment_id: DbId,
}

/// Request body for creating or patching a comment.
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(required, length(min = 1))]
    pub text: Option<String>,
}

async fn find_comment(pool: &DbPool, path: &CommentPath) -> AppResult<Comment> {
    let review = find_review(pool, path.title_id, path.review_id).await?;
    Ok(CommentRepo::find_in_review(pool, review.id, path.comment_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Comment", path.comment_id))?)
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments
///
/// Newest first.
pub async fn list_comments(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppPath(path): AppPath<ReviewPath>,
    AppQuery(page): AppQuery<PaginationParams>,
) -> AppResult<Json<Paginated<CommentResponse>>> {
    authorize(&POLICY, Method::Get, &ctx)?;
    let review = find_review(&state.pool, path.title_id, path.review_id).await?;
    let (limit, offset) = page.bounds();

    let comments = CommentRepo::list_for_review(&state.pool, review.id, limit, offset).await?;
    let count = CommentRepo::count_for_review(&state.pool, review.id).await?;

    Ok(Json(Paginated::new(
        count,
        comments.into_iter().map(CommentResponse::from).collect(),
    )))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn get_comment(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppPath(path): AppPath<CommentPath>,
) -> AppResult<Json<CommentResponse>> {
    authorize(&POLICY, Method::Get, &ctx)?;
    let comment = find_comment(&state.pool, &path).await?;
    authorize_object(&POLICY, Method::Get, &ctx, Some(comment.author_id))?;

    Ok(Json(comment.into()))
}

/// POST /api/v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn create_comment(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppPath(path): AppPath<ReviewPath>,
    AppJson(input): AppJson<CommentRequest>,
) -> AppResult<(StatusCode, Json<CommentResponse>)> {
    authorize(&POLICY, Method::Post, &ctx)?;
    let author = ctx.require_identity()?;
    let review = find_review(&state.pool, path.title_id, path.review_id).await?;
    validate_request(&input, vec![])?;

    let create = CreateComment {
        review_id: review.id,
        author_id: author.user_id,
        text: input.text.unwrap_or_default(),
    };
    let comment = CommentRepo::create(&state.pool, &create).await?;
    tracing::info!(
        comment_id = comment.id,
        review_id = review.id,
        user_id = author.user_id,
        "Comment created",
    );

    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn update_comment(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppPath(path): AppPath<CommentPath>,
    AppJson(input): AppJson<CommentRequest>,
) -> AppResult<Json<CommentResponse>> {
    authorize(&POLICY, Method::Patch, &ctx)?;
    let comment = find_comment(&state.pool, &path).await?;
    authorize_object(&POLICY, Method::Patch, &ctx, Some(comment.author_id))?;
    validate_request(&input, vec![])?;

    let text = input.text.unwrap_or_default();
    let updated = CommentRepo::update_text(&state.pool, comment.id, &text)
        .await?
        .ok_or_else(|| CoreError::not_found("Comment", comment.id))?;
    tracing::info!(comment_id = updated.id, "Comment updated");

    Ok(Json(updated.into()))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn delete_comment(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    AppPath(path): AppPath<CommentPath>,
) -> AppResult<StatusCode> {
    authorize(&POLICY, Method::Delete, &ctx)?;
    let comment = find_comment(&state.pool, &path).await?;
    authorize_object(&POLICY, Method::Delete, &ctx, Some(comment.author_id))?;

    CommentRepo::delete(&state.pool, comment.id).await?;
    tracing::info!(comment_id = comment.id, "Comment deleted");

    Ok(StatusCode::NO_CONTENT)
}
