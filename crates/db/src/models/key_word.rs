//! Key-word vocabulary model.
//!
//! Key words work like stop words for matching purposes but carry
//! associated tariff-code fragments and optional insert-before/after
//! texts used by downstream document rewriting.

use cargoscreen_core::types::{DbId, Timestamp};
use cargoscreen_core::word_match::MatchType;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `key_words` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct KeyWord {
    pub id: DbId,
    pub word: String,
    pub match_type_id: i16,
    pub enabled: bool,
    pub insert_before: Option<String>,
    pub insert_after: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl KeyWord {
    pub fn match_type(&self) -> MatchType {
        MatchType::from_id(self.match_type_id).unwrap_or(MatchType::ExactSymbols)
    }
}

/// A key word together with its tariff-code fragments.
#[derive(Debug, Clone, Serialize)]
pub struct KeyWordWithCodes {
    #[serde(flatten)]
    pub key_word: KeyWord,
    pub feacn_codes: Vec<String>,
}

/// DTO for creating a key word.
#[derive(Debug, Deserialize)]
pub struct CreateKeyWord {
    pub word: String,
    pub match_type: MatchType,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub feacn_codes: Vec<String>,
    pub insert_before: Option<String>,
    pub insert_after: Option<String>,
}

/// DTO for updating a key word. `feacn_codes`, when present, replaces
/// the full fragment list.
#[derive(Debug, Deserialize)]
pub struct UpdateKeyWord {
    pub word: Option<String>,
    pub match_type: Option<MatchType>,
    pub enabled: Option<bool>,
    pub feacn_codes: Option<Vec<String>>,
    pub insert_before: Option<String>,
    pub insert_after: Option<String>,
}

fn default_enabled() -> bool {
    true
}
