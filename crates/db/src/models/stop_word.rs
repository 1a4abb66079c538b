//! Stop-word vocabulary model.

use cargoscreen_core::types::{DbId, Timestamp};
use cargoscreen_core::word_match::MatchType;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `stop_words` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StopWord {
    pub id: DbId,
    pub word: String,
    pub match_type_id: i16,
    pub enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl StopWord {
    /// Stored match type; unknown ids degrade to the strictest literal
    /// interpretation.
    pub fn match_type(&self) -> MatchType {
        MatchType::from_id(self.match_type_id).unwrap_or(MatchType::ExactSymbols)
    }
}

/// DTO for creating a stop word.
#[derive(Debug, Deserialize)]
pub struct CreateStopWord {
    pub word: String,
    pub match_type: MatchType,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// DTO for updating a stop word.
#[derive(Debug, Deserialize)]
pub struct UpdateStopWord {
    pub word: Option<String>,
    pub match_type: Option<MatchType>,
    pub enabled: Option<bool>,
}

fn default_enabled() -> bool {
    true
}
