//! Repository for the `parcels` table and its match link tables.

use cargoscreen_core::check_status::{CheckStatus, ClassificationResult};
use cargoscreen_core::types::DbId;
use sqlx::PgPool;

use crate::models::parcel::{CreateParcel, Parcel};

/// Column list for parcels queries.
const COLUMNS: &str = "id, register_id, check_status_id, tariff_code, product_name, \
    description, country_code, quantity, weight_kg, order_number, posting_number, \
    created_at, updated_at";

/// Provides CRUD and classification-persistence operations for parcels.
pub struct ParcelRepo;

impl ParcelRepo {
    /// Bulk-insert parcels under a register within one transaction.
    /// Every parcel starts in the `NotChecked` status.
    pub async fn bulk_insert(
        pool: &PgPool,
        parcels: &[CreateParcel],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let query = "INSERT INTO parcels
                (register_id, check_status_id, tariff_code, product_name, description,
                 country_code, quantity, weight_kg, order_number, posting_number)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING id";

        let mut tx = pool.begin().await?;
        let mut ids = Vec::with_capacity(parcels.len());

        for parcel in parcels {
            let id: DbId = sqlx::query_scalar(query)
                .bind(parcel.register_id)
                .bind(CheckStatus::NotChecked.id())
                .bind(&parcel.tariff_code)
                .bind(&parcel.product_name)
                .bind(&parcel.description)
                .bind(&parcel.country_code)
                .bind(parcel.quantity)
                .bind(parcel.weight_kg)
                .bind(parcel.order_number())
                .bind(parcel.posting_number())
                .fetch_one(&mut *tx)
                .await?;
            ids.push(id);
        }

        tx.commit().await?;
        Ok(ids)
    }

    /// Find a parcel by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Parcel>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM parcels WHERE id = $1");
        sqlx::query_as::<_, Parcel>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// IDs of all parcels of a register, in insertion order. Used by the
    /// validation pipeline to drive the per-parcel loop without holding
    /// full rows in memory.
    pub async fn ids_by_register(
        pool: &PgPool,
        register_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM parcels WHERE register_id = $1 ORDER BY id")
            .bind(register_id)
            .fetch_all(pool)
            .await
    }

    /// List parcels of a register with an optional status filter.
    pub async fn list_by_register(
        pool: &PgPool,
        register_id: DbId,
        status: Option<CheckStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Parcel>, sqlx::Error> {
        match status {
            Some(status) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM parcels
                     WHERE register_id = $1 AND check_status_id = $2
                     ORDER BY id
                     LIMIT $3 OFFSET $4"
                );
                sqlx::query_as::<_, Parcel>(&query)
                    .bind(register_id)
                    .bind(status.id())
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query = format!(
                    "SELECT {COLUMNS} FROM parcels
                     WHERE register_id = $1
                     ORDER BY id
                     LIMIT $2 OFFSET $3"
                );
                sqlx::query_as::<_, Parcel>(&query)
                    .bind(register_id)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Persist one classification pass: replace the parcel's match links
    /// and update its status, unless a human reviewer already asserted a
    /// terminal status (those are never overwritten automatically).
    ///
    /// Returns the updated parcel, or `None` when the parcel no longer
    /// exists or was human-asserted concurrently.
    pub async fn apply_classification(
        pool: &PgPool,
        parcel_id: DbId,
        result: &ClassificationResult,
    ) -> Result<Option<Parcel>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        for table in [
            "parcel_stop_words",
            "parcel_key_words",
            "parcel_feacn_orders",
            "parcel_feacn_prefixes",
        ] {
            sqlx::query(&format!("DELETE FROM {table} WHERE parcel_id = $1"))
                .bind(parcel_id)
                .execute(&mut *tx)
                .await?;
        }

        for stop_word_id in &result.stop_word_ids {
            sqlx::query("INSERT INTO parcel_stop_words (parcel_id, stop_word_id) VALUES ($1, $2)")
                .bind(parcel_id)
                .bind(stop_word_id)
                .execute(&mut *tx)
                .await?;
        }
        for key_word_id in &result.key_word_ids {
            sqlx::query("INSERT INTO parcel_key_words (parcel_id, key_word_id) VALUES ($1, $2)")
                .bind(parcel_id)
                .bind(key_word_id)
                .execute(&mut *tx)
                .await?;
        }
        for order_id in &result.feacn_order_ids {
            sqlx::query(
                "INSERT INTO parcel_feacn_orders (parcel_id, feacn_order_id) VALUES ($1, $2)",
            )
            .bind(parcel_id)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        }
        for prefix_id in &result.feacn_prefix_ids {
            sqlx::query(
                "INSERT INTO parcel_feacn_prefixes (parcel_id, feacn_prefix_id) VALUES ($1, $2)",
            )
            .bind(parcel_id)
            .bind(prefix_id)
            .execute(&mut *tx)
            .await?;
        }

        let human_ids = [CheckStatus::Approved.id(), CheckStatus::PartnerFlagged.id()];
        let query = format!(
            "UPDATE parcels SET check_status_id = $2, updated_at = NOW()
             WHERE id = $1 AND check_status_id <> ALL($3)
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Parcel>(&query)
            .bind(parcel_id)
            .bind(result.status.id())
            .bind(&human_ids[..])
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Human status override: sets the status unconditionally.
    pub async fn set_status(
        pool: &PgPool,
        parcel_id: DbId,
        status: CheckStatus,
    ) -> Result<Option<Parcel>, sqlx::Error> {
        let query = format!(
            "UPDATE parcels SET check_status_id = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Parcel>(&query)
            .bind(parcel_id)
            .bind(status.id())
            .fetch_optional(pool)
            .await
    }

    /// Matched stop-word ids persisted for a parcel.
    pub async fn matched_stop_word_ids(
        pool: &PgPool,
        parcel_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT stop_word_id FROM parcel_stop_words WHERE parcel_id = $1 ORDER BY stop_word_id",
        )
        .bind(parcel_id)
        .fetch_all(pool)
        .await
    }
}
