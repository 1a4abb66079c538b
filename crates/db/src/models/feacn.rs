//! FEACN reference models: legal-basis orders, prefix rules with
//! exceptions, and the hierarchical code catalog.

use cargoscreen_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `feacn_orders` table: a named legal-basis grouping
/// of prefix rules, enabled or disabled as a whole.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FeacnOrder {
    pub id: DbId,
    pub title: String,
    pub url: Option<String>,
    pub enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an order.
#[derive(Debug, Deserialize)]
pub struct CreateFeacnOrder {
    pub title: String,
    pub url: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// A row from the `feacn_prefixes` table. `feacn_order_id = NULL`
/// marks a standalone rule, always active; order-backed rules are
/// active iff their order is enabled.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FeacnPrefix {
    pub id: DbId,
    pub code: String,
    pub comment: Option<String>,
    pub feacn_order_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A prefix rule together with its exception fragments.
#[derive(Debug, Clone, Serialize)]
pub struct FeacnPrefixWithExceptions {
    #[serde(flatten)]
    pub prefix: FeacnPrefix,
    pub exceptions: Vec<String>,
}

/// DTO for creating or replacing a prefix rule.
#[derive(Debug, Deserialize)]
pub struct CreateFeacnPrefix {
    pub code: String,
    pub comment: Option<String>,
    pub feacn_order_id: Option<DbId>,
    #[serde(default)]
    pub exceptions: Vec<String>,
}

/// A row from the `feacn_codes` catalog table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FeacnCode {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub parent_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

fn default_enabled() -> bool {
    true
}
