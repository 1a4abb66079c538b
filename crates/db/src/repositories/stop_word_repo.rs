//! Repository for the `stop_words` table.

use cargoscreen_core::types::DbId;
use cargoscreen_core::word_match::MatchType;
use sqlx::PgPool;

use crate::models::stop_word::{CreateStopWord, StopWord};

/// Column list for stop_words queries.
const COLUMNS: &str = "id, word, match_type_id, enabled, created_at, updated_at";

/// Provides CRUD operations for stop words.
pub struct StopWordRepo;

impl StopWordRepo {
    /// Create a new stop word.
    pub async fn create(pool: &PgPool, input: &CreateStopWord) -> Result<StopWord, sqlx::Error> {
        let query = format!(
            "INSERT INTO stop_words (word, match_type_id, enabled)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StopWord>(&query)
            .bind(&input.word)
            .bind(input.match_type.id())
            .bind(input.enabled)
            .fetch_one(pool)
            .await
    }

    /// Find a stop word by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<StopWord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stop_words WHERE id = $1");
        sqlx::query_as::<_, StopWord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List stop words alphabetically.
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StopWord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM stop_words
             ORDER BY word
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, StopWord>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// All enabled stop words, loaded once per classification pass.
    pub async fn list_enabled(pool: &PgPool) -> Result<Vec<StopWord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stop_words WHERE enabled ORDER BY id");
        sqlx::query_as::<_, StopWord>(&query).fetch_all(pool).await
    }

    /// Patch a stop word. The caller has already re-validated the
    /// morphology gate for the effective word/match-type pair.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        word: &str,
        match_type: MatchType,
        enabled: bool,
    ) -> Result<Option<StopWord>, sqlx::Error> {
        let query = format!(
            "UPDATE stop_words SET word = $2, match_type_id = $3, enabled = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StopWord>(&query)
            .bind(id)
            .bind(word)
            .bind(match_type.id())
            .bind(enabled)
            .fetch_optional(pool)
            .await
    }

    /// Delete a stop word. Match links cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM stop_words WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
