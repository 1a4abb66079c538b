//! Parcel model: one declared shipment line within a register.

use cargoscreen_core::check_status::CheckStatus;
use cargoscreen_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `parcels` table.
///
/// The variant payload (order number for WBR registers, posting number
/// for Ozon registers) is stored in nullable columns; the tagged view
/// is reconstructed via [`Parcel::variant`].
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Parcel {
    pub id: DbId,
    pub register_id: DbId,
    pub check_status_id: i16,
    pub tariff_code: String,
    pub product_name: Option<String>,
    pub description: Option<String>,
    pub country_code: Option<String>,
    pub quantity: Option<i32>,
    pub weight_kg: Option<f64>,
    pub order_number: Option<String>,
    pub posting_number: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Source-specific payload of a parcel, selected by the owning
/// register's document type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "document_type", rename_all = "snake_case")]
pub enum ParcelVariant {
    Wbr { order_number: Option<String> },
    Ozon { posting_number: Option<String> },
}

impl Parcel {
    /// Current check status; unknown stored ids degrade to `NotChecked`.
    pub fn check_status(&self) -> CheckStatus {
        CheckStatus::from_id(self.check_status_id).unwrap_or(CheckStatus::NotChecked)
    }

    /// The tagged variant view of this row for the given document type.
    pub fn variant(&self, document_type: super::register::DocumentType) -> ParcelVariant {
        match document_type {
            super::register::DocumentType::Wbr => ParcelVariant::Wbr {
                order_number: self.order_number.clone(),
            },
            super::register::DocumentType::Ozon => ParcelVariant::Ozon {
                posting_number: self.posting_number.clone(),
            },
        }
    }
}

/// DTO for bulk parcel creation during register import.
#[derive(Debug, Clone)]
pub struct CreateParcel {
    pub register_id: DbId,
    pub tariff_code: String,
    pub product_name: Option<String>,
    pub description: Option<String>,
    pub country_code: Option<String>,
    pub quantity: Option<i32>,
    pub weight_kg: Option<f64>,
    pub variant: ParcelVariant,
}

impl CreateParcel {
    pub fn order_number(&self) -> Option<&str> {
        match &self.variant {
            ParcelVariant::Wbr { order_number } => order_number.as_deref(),
            ParcelVariant::Ozon { .. } => None,
        }
    }

    pub fn posting_number(&self) -> Option<&str> {
        match &self.variant {
            ParcelVariant::Ozon { posting_number } => posting_number.as_deref(),
            ParcelVariant::Wbr { .. } => None,
        }
    }
}

/// Query parameters for listing parcels of a register.
#[derive(Debug, Deserialize)]
pub struct ParcelListQuery {
    /// Optional symbolic status filter.
    pub status: Option<CheckStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for the human status override endpoint.
#[derive(Debug, Deserialize)]
pub struct StatusOverride {
    pub status: CheckStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::register::DocumentType;

    fn parcel(order_number: Option<&str>, posting_number: Option<&str>) -> Parcel {
        Parcel {
            id: 1,
            register_id: 1,
            check_status_id: CheckStatus::NotChecked.id(),
            tariff_code: "1234567890".to_string(),
            product_name: None,
            description: None,
            country_code: None,
            quantity: None,
            weight_kg: None,
            order_number: order_number.map(String::from),
            posting_number: posting_number.map(String::from),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_variant_follows_register_document_type() {
        let row = parcel(Some("WBR-1"), Some("OZON-1"));
        assert_eq!(
            row.variant(DocumentType::Wbr),
            ParcelVariant::Wbr {
                order_number: Some("WBR-1".to_string())
            }
        );
        assert_eq!(
            row.variant(DocumentType::Ozon),
            ParcelVariant::Ozon {
                posting_number: Some("OZON-1".to_string())
            }
        );
    }

    #[test]
    fn test_unknown_status_id_degrades_to_not_checked() {
        let mut row = parcel(None, None);
        row.check_status_id = 9999;
        assert_eq!(row.check_status(), CheckStatus::NotChecked);
    }

    #[test]
    fn test_document_type_round_trip() {
        for dt in [DocumentType::Wbr, DocumentType::Ozon] {
            assert_eq!(DocumentType::from_str(dt.as_str()), Some(dt));
        }
        assert_eq!(DocumentType::from_str("unknown"), None);
    }
}
