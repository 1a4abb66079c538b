use crate::morphology::SupportLevel;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A vocabulary word cannot satisfy the morphology support required
    /// by its match type. Carries the level the dictionary actually
    /// provides so callers can fall back to a non-morphological match
    /// type instead of treating this as a generic validation failure.
    #[error("Word '{word}' has {available} morphology support, which is insufficient for the requested match type")]
    InsufficientMorphology { word: String, available: SupportLevel },

    #[error("Internal error: {0}")]
    Internal(String),
}
