//! Handlers for the `/stop-words` vocabulary.
//!
//! Creation and update run the morphology gate: a match type requiring
//! morphology support is rejected with a distinguishing signal when
//! the dictionary cannot expand the word, and nothing is persisted.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use cargoscreen_core::error::CoreError;
use cargoscreen_core::morphology::{ensure_match_type_supported, SupportLevel};
use cargoscreen_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use cargoscreen_core::types::DbId;
use cargoscreen_core::word_match::MatchType;
use cargoscreen_db::models::stop_word::{CreateStopWord, UpdateStopWord};
use cargoscreen_db::repositories::StopWordRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum length of a vocabulary word or phrase.
const MAX_WORD_LEN: usize = 256;

/// Query parameters for listing stop words.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Validate a vocabulary word: non-empty after trimming, bounded length.
pub(crate) fn validate_word(word: &str) -> Result<String, AppError> {
    let word = word.trim();
    if word.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Word must not be empty".to_string(),
        )));
    }
    if word.chars().count() > MAX_WORD_LEN {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Word must be at most {MAX_WORD_LEN} characters"
        ))));
    }
    Ok(word.to_string())
}

/// Request body for the standalone vocabulary validation endpoint.
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub word: String,
    pub match_type: MatchType,
}

/// Typed response for the standalone vocabulary validation endpoint.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub word: String,
    pub match_type: MatchType,
    pub support_level: SupportLevel,
}

/// POST /api/v1/stop-words/validate
///
/// Dry-run the morphology gate for a word/match-type pair without
/// persisting anything, so callers can probe before creating an entry.
pub async fn validate(
    State(state): State<AppState>,
    Json(input): Json<ValidateRequest>,
) -> AppResult<impl IntoResponse> {
    let word = validate_word(&input.word)?;
    ensure_match_type_supported(state.morphology.as_ref(), &word, input.match_type)?;

    let support_level = state.morphology.support_level(&word);
    Ok(Json(DataResponse {
        data: ValidateResponse {
            word,
            match_type: input.match_type,
            support_level,
        },
    }))
}

/// GET /api/v1/stop-words?limit=&offset=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);

    let words = StopWordRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: words }))
}

/// GET /api/v1/stop-words/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let word = StopWordRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "StopWord",
            id,
        }))?;

    Ok(Json(DataResponse { data: word }))
}

/// POST /api/v1/stop-words
pub async fn create(
    State(state): State<AppState>,
    Json(mut input): Json<CreateStopWord>,
) -> AppResult<impl IntoResponse> {
    input.word = validate_word(&input.word)?;
    ensure_match_type_supported(state.morphology.as_ref(), &input.word, input.match_type)?;

    let word = StopWordRepo::create(&state.pool, &input).await?;

    tracing::info!(stop_word_id = word.id, word = %word.word, "Stop word created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: word })))
}

/// PUT /api/v1/stop-words/{id}
///
/// Patch a stop word. The morphology gate is re-run against the
/// effective word/match-type pair.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStopWord>,
) -> AppResult<impl IntoResponse> {
    let existing = StopWordRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "StopWord",
            id,
        }))?;

    let word = match input.word {
        Some(word) => validate_word(&word)?,
        None => existing.word.clone(),
    };
    let match_type = input.match_type.unwrap_or_else(|| existing.match_type());
    let enabled = input.enabled.unwrap_or(existing.enabled);

    ensure_match_type_supported(state.morphology.as_ref(), &word, match_type)?;

    let updated = StopWordRepo::update(&state.pool, id, &word, match_type, enabled)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "StopWord",
            id,
        }))?;

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/stop-words/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !StopWordRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "StopWord",
            id,
        }));
    }

    Ok(StatusCode::NO_CONTENT)
}
