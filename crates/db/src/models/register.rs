//! Register model: one uploaded declaration batch.

use cargoscreen_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Source document type of a register. Decides which variant fields
/// its parcels carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// WBR registers: parcels carry an order number.
    Wbr,
    /// Ozon registers: parcels carry a posting number.
    Ozon,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wbr => "wbr",
            Self::Ozon => "ozon",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "wbr" => Some(Self::Wbr),
            "ozon" => Some(Self::Ozon),
            _ => None,
        }
    }
}

/// A row from the `registers` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Register {
    pub id: DbId,
    pub file_name: String,
    pub document_type: String,
    pub parcel_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Register {
    pub fn document_type(&self) -> Option<DocumentType> {
        DocumentType::from_str(&self.document_type)
    }
}

/// DTO for creating a register.
#[derive(Debug, Deserialize)]
pub struct CreateRegister {
    pub file_name: String,
    pub document_type: DocumentType,
}
