//! HTTP-level integration tests for nested reviews and comments.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, delete_auth, get, patch_json_auth, post_json, post_json_auth, user_with_token,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use yamdb_core::roles::Role;
use yamdb_core::types::DbId;
use yamdb_db::models::title::CreateTitle;
use yamdb_db::repositories::{ReviewRepo, TitleRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_title(pool: &PgPool, name: &str) -> DbId {
    TitleRepo::create(
        pool,
        &CreateTitle {
            name: name.into(),
            year: 2000,
            description: None,
            category_id: None,
            genre_ids: vec![],
        },
    )
    .await
    .unwrap()
}

async fn post_review(t: &common::TestApp, title_id: DbId, token: &str, score: i32) -> Value {
    let response = post_json_auth(
        &t.app,
        &format!("/api/v1/titles/{title_id}/reviews"),
        json!({ "text": format!("scored {score}"), "score": score }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

/// Create returns the author's username and a server-set `pub_date`.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_review(pool: PgPool) {
    let t = common::build_test_app(pool);
    let title_id = seed_title(&t.pool, "Film").await;
    let (_, token) = user_with_token(&t.pool, "critic", Role::User).await;

    let review = post_review(&t, title_id, &token, 8).await;
    assert_eq!(review["author"], "critic");
    assert_eq!(review["score"], 8);
    assert_eq!(review["text"], "scored 8");
    assert!(review["pub_date"].is_string());

    let response = get(&t.app, &format!("/api/v1/titles/{title_id}/reviews/{}", review["id"])).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, review);
}

/// Anonymous reads are allowed, anonymous writes are 401.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_anonymous_access(pool: PgPool) {
    let t = common::build_test_app(pool);
    let title_id = seed_title(&t.pool, "Film").await;
    let uri = format!("/api/v1/titles/{title_id}/reviews");

    assert_eq!(get(&t.app, &uri).await.status(), StatusCode::OK);

    let response = post_json(&t.app, &uri, json!({ "text": "hi", "score": 5 })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// A second review by the same author for the same title is rejected and
/// never stored.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_one_review_per_author(pool: PgPool) {
    let t = common::build_test_app(pool);
    let title_id = seed_title(&t.pool, "Film").await;
    let other_title = seed_title(&t.pool, "Other").await;
    let (_, token) = user_with_token(&t.pool, "critic", Role::User).await;

    post_review(&t, title_id, &token, 7).await;
    let response = post_json_auth(
        &t.app,
        &format!("/api/v1/titles/{title_id}/reviews"),
        json!({ "text": "again", "score": 2 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["fields"]["non_field_errors"].is_array());
    assert_eq!(ReviewRepo::count_for_title(&t.pool, title_id).await.unwrap(), 1);

    // A different title is fine.
    post_review(&t, other_title, &token, 7).await;
}

/// Scores outside 1..=10 and missing fields are rejected.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_validation(pool: PgPool) {
    let t = common::build_test_app(pool);
    let title_id = seed_title(&t.pool, "Film").await;
    let (_, token) = user_with_token(&t.pool, "critic", Role::User).await;
    let uri = format!("/api/v1/titles/{title_id}/reviews");

    for score in [0, 11] {
        let response = post_json_auth(&t.app, &uri, json!({ "text": "x", "score": score }), &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["fields"]["score"].is_array());
    }

    let response = post_json_auth(&t.app, &uri, json!({ "score": 5 }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["fields"]["text"].is_array());
}

/// Reviews on unknown titles, or addressed through the wrong title, are 404.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_scoped_to_title(pool: PgPool) {
    let t = common::build_test_app(pool);
    let title_id = seed_title(&t.pool, "Film").await;
    let other_title = seed_title(&t.pool, "Other").await;
    let (_, token) = user_with_token(&t.pool, "critic", Role::User).await;
    let review = post_review(&t, title_id, &token, 6).await;

    let response = get(&t.app, "/api/v1/titles/999999/reviews").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        &t.app,
        "/api/v1/titles/999999/reviews",
        json!({ "text": "x", "score": 5 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(
        &t.app,
        &format!("/api/v1/titles/{other_title}/reviews/{}", review["id"]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Another plain user cannot edit or delete the review; it stays unchanged.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_author_cannot_modify(pool: PgPool) {
    let t = common::build_test_app(pool);
    let title_id = seed_title(&t.pool, "Film").await;
    let (_, author) = user_with_token(&t.pool, "author", Role::User).await;
    let (_, stranger) = user_with_token(&t.pool, "stranger", Role::User).await;
    let review = post_review(&t, title_id, &author, 9).await;
    let uri = format!("/api/v1/titles/{title_id}/reviews/{}", review["id"]);

    let response = patch_json_auth(&t.app, &uri, json!({ "text": "hijacked", "score": 1 }), &stranger).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(&t.app, &uri, &stranger).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let json = body_json(get(&t.app, &uri).await).await;
    assert_eq!(json, review);
}

/// The author, a moderator and an admin may all edit; deletion works too.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_author_moderator_admin_can_modify(pool: PgPool) {
    let t = common::build_test_app(pool);
    let title_id = seed_title(&t.pool, "Film").await;
    let (_, author) = user_with_token(&t.pool, "author", Role::User).await;
    let (_, moderator) = user_with_token(&t.pool, "moddy", Role::Moderator).await;
    let (_, admin) = user_with_token(&t.pool, "root", Role::Admin).await;
    let review = post_review(&t, title_id, &author, 5).await;
    let uri = format!("/api/v1/titles/{title_id}/reviews/{}", review["id"]);

    let response = patch_json_auth(&t.app, &uri, json!({ "score": 6 }), &author).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["score"], 6);
    assert_eq!(json["text"], "scored 5");

    let response = patch_json_auth(&t.app, &uri, json!({ "text": "moderated" }), &moderator).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["text"], "moderated");

    let response = patch_json_auth(&t.app, &uri, json!({ "score": 11 }), &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = delete_auth(&t.app, &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(get(&t.app, &uri).await.status(), StatusCode::NOT_FOUND);
}

/// Reviews are listed newest first.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reviews_newest_first(pool: PgPool) {
    let t = common::build_test_app(pool);
    let title_id = seed_title(&t.pool, "Film").await;
    let mut ids = Vec::new();
    for name in ["first", "second", "third"] {
        let (_, token) = user_with_token(&t.pool, name, Role::User).await;
        ids.push(post_review(&t, title_id, &token, 5).await["id"].clone());
    }

    let json = body_json(get(&t.app, &format!("/api/v1/titles/{title_id}/reviews")).await).await;
    assert_eq!(json["count"], 3);
    let listed: Vec<Value> = json["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].clone())
        .collect();
    ids.reverse();
    assert_eq!(listed, ids);
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// Comments follow the same author/moderator rules as reviews.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_comment_lifecycle(pool: PgPool) {
    let t = common::build_test_app(pool);
    let title_id = seed_title(&t.pool, "Film").await;
    let (_, author) = user_with_token(&t.pool, "author", Role::User).await;
    let (_, commenter) = user_with_token(&t.pool, "commenter", Role::User).await;
    let (_, moderator) = user_with_token(&t.pool, "moddy", Role::Moderator).await;
    let review = post_review(&t, title_id, &author, 8).await;
    let base = format!("/api/v1/titles/{title_id}/reviews/{}/comments", review["id"]);

    let response = post_json(&t.app, &base, json!({ "text": "anon" })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json_auth(&t.app, &base, json!({ "text": "nice review" }), &commenter).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let comment = body_json(response).await;
    assert_eq!(comment["author"], "commenter");
    assert_eq!(comment["text"], "nice review");
    assert!(comment.get("score").is_none());
    let uri = format!("{base}/{}", comment["id"]);

    let response = patch_json_auth(&t.app, &uri, json!({ "text": "mine now" }), &author).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = patch_json_auth(&t.app, &uri, json!({ "text": "edited" }), &commenter).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["text"], "edited");

    let json = body_json(get(&t.app, &base).await).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["results"][0]["text"], "edited");

    let response = delete_auth(&t.app, &uri, &moderator).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(get(&t.app, &uri).await.status(), StatusCode::NOT_FOUND);
}

/// Comments require an existing review under the given title.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_comment_on_missing_review(pool: PgPool) {
    let t = common::build_test_app(pool);
    let title_id = seed_title(&t.pool, "Film").await;
    let (_, token) = user_with_token(&t.pool, "critic", Role::User).await;

    let response = post_json_auth(
        &t.app,
        &format!("/api/v1/titles/{title_id}/reviews/999999/comments"),
        json!({ "text": "hello" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        &t.app,
        &format!("/api/v1/titles/{title_id}/reviews/1/comments"),
        json!({}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
