//! Integration tests for the repository layer against a real database:
//! - Title creation with category and genres, and the computed rating
//! - Cascade and set-null delete behaviour
//! - Unique constraint violations

use sqlx::PgPool;
use yamdb_core::roles::Role;
use yamdb_db::models::catalog::CreateSlugged;
use yamdb_db::models::comment::CreateComment;
use yamdb_db::models::review::{CreateReview, UpdateReview};
use yamdb_db::models::title::{CreateTitle, TitleFilter, UpdateTitle};
use yamdb_db::models::user::{CreateUser, UpdateUser};
use yamdb_db::repositories::{
    CategoryRepo, CommentRepo, GenreRepo, ReviewRepo, TitleRepo, UserRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn slugged(name: &str, slug: &str) -> CreateSlugged {
    CreateSlugged {
        name: name.to_string(),
        slug: slug.to_string(),
    }
}

async fn new_user(pool: &PgPool, username: &str) -> i64 {
    UserRepo::create(pool, &CreateUser::signup(username, &format!("{username}@test.com")))
        .await
        .unwrap()
        .id
}

async fn new_title(pool: &PgPool, name: &str, category_id: Option<i64>, genre_ids: Vec<i64>) -> i64 {
    TitleRepo::create(
        pool,
        &CreateTitle {
            name: name.to_string(),
            year: 1999,
            description: None,
            category_id,
            genre_ids,
        },
    )
    .await
    .unwrap()
}

async fn review(pool: &PgPool, title_id: i64, author_id: i64, score: i32) -> i64 {
    ReviewRepo::create(
        pool,
        &CreateReview {
            title_id,
            author_id,
            text: "text".to_string(),
            score,
        },
    )
    .await
    .unwrap()
    .id
}

fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505") && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_new_user_has_placeholder_code_and_user_role(pool: PgPool) {
    let id = new_user(&pool, "alice").await;
    let user = UserRepo::find_by_id(&pool, id).await.unwrap().unwrap();

    assert_eq!(user.confirmation_code.as_deref(), Some("XXXX"));
    assert_eq!(user.role(), Role::User);
    assert!(!user.is_admin());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_username_violates_constraint(pool: PgPool) {
    new_user(&pool, "alice").await;
    let err = UserRepo::create(&pool, &CreateUser::signup("alice", "other@test.com"))
        .await
        .unwrap_err();
    assert!(is_unique_violation(&err, "uq_users_username"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_user_role_and_search(pool: PgPool) {
    let id = new_user(&pool, "moddy").await;
    new_user(&pool, "someone").await;

    let updated = UserRepo::update(
        &pool,
        id,
        &UpdateUser {
            role: Some(Role::Moderator),
            bio: Some("hi".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert!(updated.is_moderator());
    assert_eq!(updated.bio.as_deref(), Some("hi"));

    let found = UserRepo::list(&pool, Some("MOD"), 10, 0).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(UserRepo::count(&pool, None).await.unwrap(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ensure_superuser_is_idempotent(pool: PgPool) {
    let first = UserRepo::ensure_superuser(&pool, "root", "root@test.com").await.unwrap();
    let second = UserRepo::ensure_superuser(&pool, "root", "root@test.com").await.unwrap();
    assert_eq!(first.id, second.id);
    assert!(second.is_superuser);
    assert!(second.is_admin());
}

// ---------------------------------------------------------------------------
// Reference data ordering
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_catalog_lists_are_ordered_by_name(pool: PgPool) {
    for (name, slug) in [("Western", "western"), ("Anime", "anime"), ("Musical", "musical")] {
        GenreRepo::create(&pool, &slugged(name, slug)).await.unwrap();
        CategoryRepo::create(&pool, &slugged(name, slug)).await.unwrap();
    }

    let genres: Vec<_> = GenreRepo::list(&pool, None, 10, 0)
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.slug)
        .collect();
    assert_eq!(genres, vec!["anime", "musical", "western"]);

    let categories: Vec<_> = CategoryRepo::list(&pool, None, 10, 0)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.slug)
        .collect();
    assert_eq!(categories, vec!["anime", "musical", "western"]);

    let western = GenreRepo::find_by_slug(&pool, "western").await.unwrap().unwrap();
    let anime = GenreRepo::find_by_slug(&pool, "anime").await.unwrap().unwrap();
    let id = new_title(&pool, "Mixed", None, vec![western.id, anime.id]).await;
    let linked: Vec<_> = TitleRepo::genres_for(&pool, &[id])
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.slug)
        .collect();
    assert_eq!(linked, vec!["anime", "western"]);
}

// ---------------------------------------------------------------------------
// Titles and rating
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_title_with_category_and_genres(pool: PgPool) {
    let drama = CategoryRepo::create(&pool, &slugged("Drama", "drama")).await.unwrap();
    let action = GenreRepo::create(&pool, &slugged("Action", "action")).await.unwrap();
    let comedy = GenreRepo::create(&pool, &slugged("Comedy", "comedy")).await.unwrap();

    let id = new_title(&pool, "Heat", Some(drama.id), vec![action.id, comedy.id]).await;

    let title = TitleRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(title.category_slug.as_deref(), Some("drama"));
    assert_eq!(title.rating, None);

    let genres = TitleRepo::genres_for(&pool, &[id]).await.unwrap();
    let slugs: Vec<_> = genres.iter().map(|g| g.slug.as_str()).collect();
    assert_eq!(slugs, vec!["action", "comedy"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rating_is_mean_of_scores(pool: PgPool) {
    let title_id = new_title(&pool, "Rated", None, vec![]).await;
    let scores = [10, 7, 2];
    for (i, score) in scores.iter().enumerate() {
        let author = new_user(&pool, &format!("critic{i}")).await;
        review(&pool, title_id, author, *score).await;
    }

    let title = TitleRepo::find_by_id(&pool, title_id).await.unwrap().unwrap();
    let expected = yamdb_core::review::mean_score(&scores).unwrap();
    assert!((title.rating.unwrap() - expected).abs() < 1e-9);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_title_filters(pool: PgPool) {
    let film = CategoryRepo::create(&pool, &slugged("Film", "film")).await.unwrap();
    let book = CategoryRepo::create(&pool, &slugged("Book", "book")).await.unwrap();
    let scifi = GenreRepo::create(&pool, &slugged("Sci-Fi", "sci-fi")).await.unwrap();

    new_title(&pool, "Dune", Some(film.id), vec![scifi.id]).await;
    new_title(&pool, "Dune Messiah", Some(book.id), vec![scifi.id]).await;
    new_title(&pool, "Amelie", Some(film.id), vec![]).await;

    let by_name = TitleFilter {
        name: Some("dUnE".to_string()),
        ..Default::default()
    };
    assert_eq!(TitleRepo::count(&pool, &by_name).await.unwrap(), 2);

    let by_category_and_genre = TitleFilter {
        category: Some("film".to_string()),
        genre: Some("sci-fi".to_string()),
        ..Default::default()
    };
    let rows = TitleRepo::list(&pool, &by_category_and_genre, 10, 0).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Dune");

    let by_year = TitleFilter {
        year: Some(2001),
        ..Default::default()
    };
    assert_eq!(TitleRepo::count(&pool, &by_year).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_title_replaces_genres(pool: PgPool) {
    let a = GenreRepo::create(&pool, &slugged("A", "a")).await.unwrap();
    let b = GenreRepo::create(&pool, &slugged("B", "b")).await.unwrap();
    let id = new_title(&pool, "Swap", None, vec![a.id]).await;

    let updated = TitleRepo::update(
        &pool,
        id,
        &UpdateTitle {
            year: Some(2001),
            genre_ids: Some(vec![b.id]),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(updated);

    let genres = TitleRepo::genres_for(&pool, &[id]).await.unwrap();
    assert_eq!(genres.len(), 1);
    assert_eq!(genres[0].slug, "b");
    assert!(!TitleRepo::update(&pool, 999_999, &UpdateTitle::default()).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_title_description_set_keep_clear(pool: PgPool) {
    let id = new_title(&pool, "Notes", None, vec![]).await;
    let description = |pool: PgPool| async move {
        TitleRepo::find_by_id(&pool, id).await.unwrap().unwrap().description
    };

    let set = UpdateTitle {
        description: Some(Some("about".to_string())),
        ..Default::default()
    };
    TitleRepo::update(&pool, id, &set).await.unwrap();
    assert_eq!(description(pool.clone()).await.as_deref(), Some("about"));

    let rename = UpdateTitle {
        name: Some("Renamed".to_string()),
        ..Default::default()
    };
    TitleRepo::update(&pool, id, &rename).await.unwrap();
    assert_eq!(description(pool.clone()).await.as_deref(), Some("about"));

    let clear = UpdateTitle {
        description: Some(None),
        ..Default::default()
    };
    TitleRepo::update(&pool, id, &clear).await.unwrap();
    assert_eq!(description(pool.clone()).await, None);
}

// ---------------------------------------------------------------------------
// Reviews: uniqueness
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_review_by_same_author_is_rejected(pool: PgPool) {
    let title_id = new_title(&pool, "Once", None, vec![]).await;
    let author = new_user(&pool, "critic").await;
    review(&pool, title_id, author, 5).await;

    assert!(ReviewRepo::exists_for_author(&pool, title_id, author).await.unwrap());

    let err = ReviewRepo::create(
        &pool,
        &CreateReview {
            title_id,
            author_id: author,
            text: "again".to_string(),
            score: 6,
        },
    )
    .await
    .unwrap_err();
    assert!(is_unique_violation(&err, "uq_reviews_title_author"));
    assert_eq!(ReviewRepo::count_for_title(&pool, title_id).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_score_out_of_range_violates_check(pool: PgPool) {
    let title_id = new_title(&pool, "Checked", None, vec![]).await;
    let author = new_user(&pool, "critic").await;
    let result = ReviewRepo::create(
        &pool,
        &CreateReview {
            title_id,
            author_id: author,
            text: "too good".to_string(),
            score: 11,
        },
    )
    .await;
    assert!(result.is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_lookup_is_scoped_to_title(pool: PgPool) {
    let t1 = new_title(&pool, "One", None, vec![]).await;
    let t2 = new_title(&pool, "Two", None, vec![]).await;
    let author = new_user(&pool, "critic").await;
    let review_id = review(&pool, t1, author, 8).await;

    assert!(ReviewRepo::find_in_title(&pool, t1, review_id).await.unwrap().is_some());
    assert!(ReviewRepo::find_in_title(&pool, t2, review_id).await.unwrap().is_none());

    let updated = ReviewRepo::update(
        &pool,
        review_id,
        &UpdateReview {
            score: Some(3),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.score, 3);
    assert_eq!(updated.text, "text");
    assert_eq!(updated.author, "critic");
}

// ---------------------------------------------------------------------------
// Delete behaviour
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_category_keeps_titles(pool: PgPool) {
    let drama = CategoryRepo::create(&pool, &slugged("Drama", "drama")).await.unwrap();
    let id = new_title(&pool, "Survivor", Some(drama.id), vec![]).await;

    assert!(CategoryRepo::delete_by_slug(&pool, "drama").await.unwrap());

    let title = TitleRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(title.category_id, None);
    assert_eq!(title.category_slug, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_genre_detaches_it(pool: PgPool) {
    let g = GenreRepo::create(&pool, &slugged("Noir", "noir")).await.unwrap();
    let id = new_title(&pool, "Detached", None, vec![g.id]).await;

    assert!(GenreRepo::delete_by_slug(&pool, "noir").await.unwrap());
    assert!(TitleRepo::genres_for(&pool, &[id]).await.unwrap().is_empty());
    assert!(TitleRepo::exists(&pool, id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_title_cascades_to_reviews_and_comments(pool: PgPool) {
    let title_id = new_title(&pool, "Doomed", None, vec![]).await;
    let author = new_user(&pool, "critic").await;
    let review_id = review(&pool, title_id, author, 9).await;
    let comment = CommentRepo::create(
        &pool,
        &CreateComment {
            review_id,
            author_id: author,
            text: "agree".to_string(),
        },
    )
    .await
    .unwrap();

    assert!(TitleRepo::delete(&pool, title_id).await.unwrap());

    assert!(ReviewRepo::find_in_title(&pool, title_id, review_id).await.unwrap().is_none());
    assert!(CommentRepo::find_in_review(&pool, review_id, comment.id).await.unwrap().is_none());
    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_user_cascades_to_their_content(pool: PgPool) {
    let title_id = new_title(&pool, "Kept", None, vec![]).await;
    let author = new_user(&pool, "leaver").await;
    review(&pool, title_id, author, 4).await;

    assert!(UserRepo::delete(&pool, author).await.unwrap());
    assert_eq!(ReviewRepo::count_for_title(&pool, title_id).await.unwrap(), 0);
    assert!(TitleRepo::exists(&pool, title_id).await.unwrap());
}
