//! Repository for the `key_words` table and its tariff-code fragments.

use std::collections::HashMap;

use cargoscreen_core::types::DbId;
use cargoscreen_core::word_match::MatchType;
use sqlx::PgPool;

use crate::models::key_word::{CreateKeyWord, KeyWord, KeyWordWithCodes};

/// Column list for key_words queries.
const COLUMNS: &str =
    "id, word, match_type_id, enabled, insert_before, insert_after, created_at, updated_at";

/// Provides CRUD operations for key words.
pub struct KeyWordRepo;

impl KeyWordRepo {
    /// Create a key word together with its tariff-code fragments.
    pub async fn create(
        pool: &PgPool,
        input: &CreateKeyWord,
    ) -> Result<KeyWordWithCodes, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO key_words (word, match_type_id, enabled, insert_before, insert_after)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let key_word = sqlx::query_as::<_, KeyWord>(&query)
            .bind(&input.word)
            .bind(input.match_type.id())
            .bind(input.enabled)
            .bind(&input.insert_before)
            .bind(&input.insert_after)
            .fetch_one(&mut *tx)
            .await?;

        for code in &input.feacn_codes {
            sqlx::query("INSERT INTO key_word_feacn_codes (key_word_id, code) VALUES ($1, $2)")
                .bind(key_word.id)
                .bind(code)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(KeyWordWithCodes {
            key_word,
            feacn_codes: input.feacn_codes.clone(),
        })
    }

    /// Find a key word with its fragments.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<KeyWordWithCodes>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM key_words WHERE id = $1");
        let Some(key_word) = sqlx::query_as::<_, KeyWord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };

        let feacn_codes =
            sqlx::query_scalar("SELECT code FROM key_word_feacn_codes WHERE key_word_id = $1 ORDER BY code")
                .bind(id)
                .fetch_all(pool)
                .await?;

        Ok(Some(KeyWordWithCodes {
            key_word,
            feacn_codes,
        }))
    }

    /// List key words alphabetically, fragments attached.
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<KeyWordWithCodes>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM key_words
             ORDER BY word
             LIMIT $1 OFFSET $2"
        );
        let key_words = sqlx::query_as::<_, KeyWord>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Self::attach_codes(pool, key_words).await
    }

    /// All enabled key words, loaded once per classification pass.
    pub async fn list_enabled(pool: &PgPool) -> Result<Vec<KeyWordWithCodes>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM key_words WHERE enabled ORDER BY id");
        let key_words = sqlx::query_as::<_, KeyWord>(&query).fetch_all(pool).await?;
        Self::attach_codes(pool, key_words).await
    }

    /// Patch a key word, replacing the full fragment list.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        word: &str,
        match_type: MatchType,
        enabled: bool,
        feacn_codes: &[String],
        insert_before: Option<&str>,
        insert_after: Option<&str>,
    ) -> Result<Option<KeyWordWithCodes>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE key_words SET word = $2, match_type_id = $3, enabled = $4,
                insert_before = $5, insert_after = $6, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let Some(key_word) = sqlx::query_as::<_, KeyWord>(&query)
            .bind(id)
            .bind(word)
            .bind(match_type.id())
            .bind(enabled)
            .bind(insert_before)
            .bind(insert_after)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM key_word_feacn_codes WHERE key_word_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        for code in feacn_codes {
            sqlx::query("INSERT INTO key_word_feacn_codes (key_word_id, code) VALUES ($1, $2)")
                .bind(id)
                .bind(code)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(KeyWordWithCodes {
            key_word,
            feacn_codes: feacn_codes.to_vec(),
        }))
    }

    /// Delete a key word. Fragments and match links cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM key_words WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Attach fragments to a batch of key words with one query.
    async fn attach_codes(
        pool: &PgPool,
        key_words: Vec<KeyWord>,
    ) -> Result<Vec<KeyWordWithCodes>, sqlx::Error> {
        let ids: Vec<DbId> = key_words.iter().map(|kw| kw.id).collect();
        let rows: Vec<(DbId, String)> = sqlx::query_as(
            "SELECT key_word_id, code FROM key_word_feacn_codes
             WHERE key_word_id = ANY($1)
             ORDER BY code",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;

        let mut by_key_word: HashMap<DbId, Vec<String>> = HashMap::new();
        for (key_word_id, code) in rows {
            by_key_word.entry(key_word_id).or_default().push(code);
        }

        Ok(key_words
            .into_iter()
            .map(|key_word| {
                let feacn_codes = by_key_word.remove(&key_word.id).unwrap_or_default();
                KeyWordWithCodes {
                    key_word,
                    feacn_codes,
                }
            })
            .collect())
    }
}
