//! Repository for the `titles` and `title_genres` tables.
//!
//! Reads always go through [`TITLE_SELECT`], which joins the category and
//! computes the rating as the mean review score.

use sqlx::{PgPool, Postgres, Transaction};
use yamdb_core::search::contains_pattern;
use yamdb_core::types::DbId;

use crate::models::title::{CreateTitle, TitleFilter, TitleGenre, TitleRow, UpdateTitle};

/// Base projection for [`TitleRow`].
const TITLE_SELECT: &str = "\
    SELECT t.id, t.name, t.year, t.description, t.category_id, \
           c.name AS category_name, c.slug AS category_slug, \
           (SELECT AVG(r.score)::float8 FROM reviews r WHERE r.title_id = t.id) AS rating \
    FROM titles t \
    LEFT JOIN categories c ON c.id = t.category_id";

/// Filter clause shared by `list` and `count`; binds `$1..$4`.
const TITLE_FILTER: &str = "\
    WHERE ($1::text IS NULL OR c.slug = $1) \
      AND ($2::text IS NULL OR EXISTS ( \
            SELECT 1 FROM title_genres tg JOIN genres g ON g.id = tg.genre_id \
            WHERE tg.title_id = t.id AND g.slug = $2)) \
      AND ($3::text IS NULL OR t.name ILIKE $3 ESCAPE '\\') \
      AND ($4::integer IS NULL OR t.year = $4)";

/// Provides CRUD operations for titles and their genre links.
pub struct TitleRepo;

impl TitleRepo {
    /// Insert a title and its genre links in one transaction. Returns the new id.
    pub async fn create(pool: &PgPool, input: &CreateTitle) -> Result<DbId, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let id: DbId = sqlx::query_scalar(
            "INSERT INTO titles (name, year, description, category_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(&input.name)
        .bind(input.year)
        .bind(&input.description)
        .bind(input.category_id)
        .fetch_one(&mut *tx)
        .await?;

        link_genres(&mut tx, id, &input.genre_ids).await?;

        tx.commit().await?;
        Ok(id)
    }

    /// Find a title by id, with category and rating.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TitleRow>, sqlx::Error> {
        let query = format!("{TITLE_SELECT} WHERE t.id = $1");
        sqlx::query_as::<_, TitleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a title with this id exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM titles WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// List titles matching `filter`, ordered by id.
    pub async fn list(
        pool: &PgPool,
        filter: &TitleFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TitleRow>, sqlx::Error> {
        let query = format!("{TITLE_SELECT} {TITLE_FILTER} ORDER BY t.id LIMIT $5 OFFSET $6");
        sqlx::query_as::<_, TitleRow>(&query)
            .bind(&filter.category)
            .bind(&filter.genre)
            .bind(filter.name.as_deref().map(contains_pattern))
            .bind(filter.year)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count titles matching `filter`.
    pub async fn count(pool: &PgPool, filter: &TitleFilter) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM titles t \
             LEFT JOIN categories c ON c.id = t.category_id \
             {TITLE_FILTER}"
        );
        sqlx::query_scalar(&query)
            .bind(&filter.category)
            .bind(&filter.genre)
            .bind(filter.name.as_deref().map(contains_pattern))
            .bind(filter.year)
            .fetch_one(pool)
            .await
    }

    /// Genres of every title in `title_ids`, one row per link, ordered by
    /// genre name within each title.
    pub async fn genres_for(
        pool: &PgPool,
        title_ids: &[DbId],
    ) -> Result<Vec<TitleGenre>, sqlx::Error> {
        sqlx::query_as::<_, TitleGenre>(
            "SELECT tg.title_id, g.name, g.slug
             FROM title_genres tg
             JOIN genres g ON g.id = tg.genre_id
             WHERE tg.title_id = ANY($1)
             ORDER BY tg.title_id, g.name, g.id",
        )
        .bind(title_ids)
        .fetch_all(pool)
        .await
    }

    /// Patch a title. `genre_ids`, when present, replaces all genre links;
    /// `description` is written whenever it is present, including `None`.
    ///
    /// Returns `false` if no title with the given `id` exists.
    pub async fn update(pool: &PgPool, id: DbId, input: &UpdateTitle) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE titles SET
                name = COALESCE($2, name),
                year = COALESCE($3, year),
                description = CASE WHEN $6 THEN $4 ELSE description END,
                category_id = COALESCE($5, category_id)
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.year)
        .bind(input.description.as_ref().and_then(Option::as_deref))
        .bind(input.category_id)
        .bind(input.description.is_some())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        if let Some(genre_ids) = &input.genre_ids {
            sqlx::query("DELETE FROM title_genres WHERE title_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            link_genres(&mut tx, id, genre_ids).await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Delete a title with its reviews and their comments.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn link_genres(
    tx: &mut Transaction<'_, Postgres>,
    title_id: DbId,
    genre_ids: &[DbId],
) -> Result<(), sqlx::Error> {
    if genre_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO title_genres (title_id, genre_id)
         SELECT $1, UNNEST($2::bigint[])
         ON CONFLICT (title_id, genre_id) DO NOTHING",
    )
    .bind(title_id)
    .bind(genre_ids)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
