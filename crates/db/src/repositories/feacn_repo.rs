//! Repository for FEACN orders, prefix rules, and the code catalog.

use std::collections::HashMap;

use cargoscreen_core::feacn::PrefixRule;
use cargoscreen_core::types::DbId;
use sqlx::PgPool;

use crate::models::feacn::{
    CreateFeacnOrder, CreateFeacnPrefix, FeacnCode, FeacnOrder, FeacnPrefix,
    FeacnPrefixWithExceptions,
};

/// Column list for feacn_orders queries.
const ORDER_COLUMNS: &str = "id, title, url, enabled, created_at, updated_at";

/// Column list for feacn_prefixes queries.
const PREFIX_COLUMNS: &str = "id, code, comment, feacn_order_id, created_at, updated_at";

/// Column list for feacn_codes queries.
const CODE_COLUMNS: &str = "id, code, name, from_date, to_date, parent_id, created_at, updated_at";

/// Provides operations for the FEACN reference tables.
pub struct FeacnRepo;

impl FeacnRepo {
    // ── Orders ───────────────────────────────────────────────────────

    /// Create a legal-basis order.
    pub async fn create_order(
        pool: &PgPool,
        input: &CreateFeacnOrder,
    ) -> Result<FeacnOrder, sqlx::Error> {
        let query = format!(
            "INSERT INTO feacn_orders (title, url, enabled)
             VALUES ($1, $2, $3)
             RETURNING {ORDER_COLUMNS}"
        );
        sqlx::query_as::<_, FeacnOrder>(&query)
            .bind(&input.title)
            .bind(&input.url)
            .bind(input.enabled)
            .fetch_one(pool)
            .await
    }

    /// List all orders.
    pub async fn list_orders(pool: &PgPool) -> Result<Vec<FeacnOrder>, sqlx::Error> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM feacn_orders ORDER BY id");
        sqlx::query_as::<_, FeacnOrder>(&query).fetch_all(pool).await
    }

    /// Find an order by ID.
    pub async fn find_order(pool: &PgPool, id: DbId) -> Result<Option<FeacnOrder>, sqlx::Error> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM feacn_orders WHERE id = $1");
        sqlx::query_as::<_, FeacnOrder>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Enable or disable an order. Disabling removes all of its rules
    /// from subsequent classification passes.
    pub async fn set_order_enabled(
        pool: &PgPool,
        id: DbId,
        enabled: bool,
    ) -> Result<Option<FeacnOrder>, sqlx::Error> {
        let query = format!(
            "UPDATE feacn_orders SET enabled = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {ORDER_COLUMNS}"
        );
        sqlx::query_as::<_, FeacnOrder>(&query)
            .bind(id)
            .bind(enabled)
            .fetch_optional(pool)
            .await
    }

    // ── Prefix rules ─────────────────────────────────────────────────

    /// Create a prefix rule together with its exception fragments.
    pub async fn create_prefix(
        pool: &PgPool,
        input: &CreateFeacnPrefix,
    ) -> Result<FeacnPrefixWithExceptions, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO feacn_prefixes (code, comment, feacn_order_id)
             VALUES ($1, $2, $3)
             RETURNING {PREFIX_COLUMNS}"
        );
        let prefix = sqlx::query_as::<_, FeacnPrefix>(&query)
            .bind(&input.code)
            .bind(&input.comment)
            .bind(input.feacn_order_id)
            .fetch_one(&mut *tx)
            .await?;

        for exception in &input.exceptions {
            sqlx::query(
                "INSERT INTO feacn_prefix_exceptions (feacn_prefix_id, code) VALUES ($1, $2)",
            )
            .bind(prefix.id)
            .bind(exception)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(FeacnPrefixWithExceptions {
            prefix,
            exceptions: input.exceptions.clone(),
        })
    }

    /// Find a prefix rule with its exceptions.
    pub async fn find_prefix(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<FeacnPrefixWithExceptions>, sqlx::Error> {
        let query = format!("SELECT {PREFIX_COLUMNS} FROM feacn_prefixes WHERE id = $1");
        let Some(prefix) = sqlx::query_as::<_, FeacnPrefix>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };

        let exceptions = sqlx::query_scalar(
            "SELECT code FROM feacn_prefix_exceptions WHERE feacn_prefix_id = $1 ORDER BY code",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        Ok(Some(FeacnPrefixWithExceptions { prefix, exceptions }))
    }

    /// List all prefix rules with exceptions attached.
    pub async fn list_prefixes(
        pool: &PgPool,
    ) -> Result<Vec<FeacnPrefixWithExceptions>, sqlx::Error> {
        let query = format!("SELECT {PREFIX_COLUMNS} FROM feacn_prefixes ORDER BY code");
        let prefixes = sqlx::query_as::<_, FeacnPrefix>(&query).fetch_all(pool).await?;
        Self::attach_exceptions(pool, prefixes).await
    }

    /// Replace a prefix rule and its exception list.
    pub async fn update_prefix(
        pool: &PgPool,
        id: DbId,
        input: &CreateFeacnPrefix,
    ) -> Result<Option<FeacnPrefixWithExceptions>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE feacn_prefixes SET code = $2, comment = $3, feacn_order_id = $4,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {PREFIX_COLUMNS}"
        );
        let Some(prefix) = sqlx::query_as::<_, FeacnPrefix>(&query)
            .bind(id)
            .bind(&input.code)
            .bind(&input.comment)
            .bind(input.feacn_order_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM feacn_prefix_exceptions WHERE feacn_prefix_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        for exception in &input.exceptions {
            sqlx::query(
                "INSERT INTO feacn_prefix_exceptions (feacn_prefix_id, code) VALUES ($1, $2)",
            )
            .bind(id)
            .bind(exception)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(FeacnPrefixWithExceptions {
            prefix,
            exceptions: input.exceptions.clone(),
        }))
    }

    /// Delete a prefix rule. Exceptions and match links cascade.
    pub async fn delete_prefix(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM feacn_prefixes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Load the active rule snapshot for a classification pass:
    /// standalone rules plus rules of enabled orders, exceptions
    /// attached. Two set-based queries regardless of catalog size.
    pub async fn load_active_rules(pool: &PgPool) -> Result<Vec<PrefixRule>, sqlx::Error> {
        let rows: Vec<(DbId, String, Option<DbId>)> = sqlx::query_as(
            "SELECT p.id, p.code, p.feacn_order_id
             FROM feacn_prefixes p
             LEFT JOIN feacn_orders o ON o.id = p.feacn_order_id
             WHERE p.feacn_order_id IS NULL OR o.enabled
             ORDER BY p.id",
        )
        .fetch_all(pool)
        .await?;

        let ids: Vec<DbId> = rows.iter().map(|(id, _, _)| *id).collect();
        let exception_rows: Vec<(DbId, String)> = sqlx::query_as(
            "SELECT feacn_prefix_id, code FROM feacn_prefix_exceptions
             WHERE feacn_prefix_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;

        let mut exceptions: HashMap<DbId, Vec<String>> = HashMap::new();
        for (prefix_id, code) in exception_rows {
            exceptions.entry(prefix_id).or_default().push(code);
        }

        Ok(rows
            .into_iter()
            .map(|(id, prefix, order_id)| PrefixRule {
                id,
                prefix,
                order_id,
                exceptions: exceptions.remove(&id).unwrap_or_default(),
            })
            .collect())
    }

    // ── Code catalog ─────────────────────────────────────────────────

    /// Find a catalog entry by its exact code.
    pub async fn find_code(pool: &PgPool, code: &str) -> Result<Option<FeacnCode>, sqlx::Error> {
        let query = format!("SELECT {CODE_COLUMNS} FROM feacn_codes WHERE code = $1");
        sqlx::query_as::<_, FeacnCode>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// Whether the catalog currently knows `code`: an entry with that
    /// exact code exists and today falls inside its validity window
    /// (open ends allowed).
    pub async fn code_is_current(pool: &PgPool, code: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (
                 SELECT 1 FROM feacn_codes
                 WHERE code = $1
                   AND (from_date IS NULL OR from_date <= CURRENT_DATE)
                   AND (to_date IS NULL OR to_date >= CURRENT_DATE)
             )",
        )
        .bind(code)
        .fetch_one(pool)
        .await
    }

    /// Direct children of a catalog entry.
    pub async fn list_code_children(
        pool: &PgPool,
        parent_id: DbId,
    ) -> Result<Vec<FeacnCode>, sqlx::Error> {
        let query = format!(
            "SELECT {CODE_COLUMNS} FROM feacn_codes WHERE parent_id = $1 ORDER BY code"
        );
        sqlx::query_as::<_, FeacnCode>(&query)
            .bind(parent_id)
            .fetch_all(pool)
            .await
    }

    /// Attach exceptions to a batch of prefix rules with one query.
    async fn attach_exceptions(
        pool: &PgPool,
        prefixes: Vec<FeacnPrefix>,
    ) -> Result<Vec<FeacnPrefixWithExceptions>, sqlx::Error> {
        let ids: Vec<DbId> = prefixes.iter().map(|p| p.id).collect();
        let rows: Vec<(DbId, String)> = sqlx::query_as(
            "SELECT feacn_prefix_id, code FROM feacn_prefix_exceptions
             WHERE feacn_prefix_id = ANY($1)
             ORDER BY code",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;

        let mut by_prefix: HashMap<DbId, Vec<String>> = HashMap::new();
        for (prefix_id, code) in rows {
            by_prefix.entry(prefix_id).or_default().push(code);
        }

        Ok(prefixes
            .into_iter()
            .map(|prefix| {
                let exceptions = by_prefix.remove(&prefix.id).unwrap_or_default();
                FeacnPrefixWithExceptions { prefix, exceptions }
            })
            .collect())
    }
}
