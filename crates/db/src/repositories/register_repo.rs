//! Repository for the `registers` table.

use cargoscreen_core::types::DbId;
use sqlx::PgPool;

use crate::models::register::{CreateRegister, Register};

/// Column list for registers queries.
const COLUMNS: &str = "id, file_name, document_type, parcel_count, created_at, updated_at";

/// Provides CRUD operations for registers.
pub struct RegisterRepo;

impl RegisterRepo {
    /// Create a new register with a zero parcel count.
    pub async fn create(pool: &PgPool, input: &CreateRegister) -> Result<Register, sqlx::Error> {
        let query = format!(
            "INSERT INTO registers (file_name, document_type)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Register>(&query)
            .bind(&input.file_name)
            .bind(input.document_type.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a register by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Register>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM registers WHERE id = $1");
        sqlx::query_as::<_, Register>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List registers, newest first.
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Register>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM registers
             ORDER BY created_at DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Register>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Record the number of parcels imported under a register.
    pub async fn set_parcel_count(
        pool: &PgPool,
        id: DbId,
        parcel_count: i32,
    ) -> Result<Option<Register>, sqlx::Error> {
        let query = format!(
            "UPDATE registers SET parcel_count = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Register>(&query)
            .bind(id)
            .bind(parcel_count)
            .fetch_optional(pool)
            .await
    }

    /// Delete a register. Parcels cascade via foreign key.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM registers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
