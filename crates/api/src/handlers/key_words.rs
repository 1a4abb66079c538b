//! Handlers for the `/key-words` vocabulary.
//!
//! Key words pass the same morphology gate as stop words and
//! additionally carry tariff-code fragments, validated as digit
//! prefixes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use cargoscreen_core::error::CoreError;
use cargoscreen_core::feacn::validate_prefix;
use cargoscreen_core::morphology::ensure_match_type_supported;
use cargoscreen_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use cargoscreen_core::types::DbId;
use cargoscreen_db::models::key_word::{CreateKeyWord, UpdateKeyWord};
use cargoscreen_db::repositories::KeyWordRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::stop_words::validate_word;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for listing key words.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Validate tariff-code fragments attached to a key word.
fn validate_codes(codes: &[String]) -> Result<(), AppError> {
    for code in codes {
        validate_prefix(code).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    Ok(())
}

/// GET /api/v1/key-words?limit=&offset=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);

    let words = KeyWordRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: words }))
}

/// GET /api/v1/key-words/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let word = KeyWordRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "KeyWord",
            id,
        }))?;

    Ok(Json(DataResponse { data: word }))
}

/// POST /api/v1/key-words
pub async fn create(
    State(state): State<AppState>,
    Json(mut input): Json<CreateKeyWord>,
) -> AppResult<impl IntoResponse> {
    input.word = validate_word(&input.word)?;
    validate_codes(&input.feacn_codes)?;
    ensure_match_type_supported(state.morphology.as_ref(), &input.word, input.match_type)?;

    let word = KeyWordRepo::create(&state.pool, &input).await?;

    tracing::info!(
        key_word_id = word.key_word.id,
        word = %word.key_word.word,
        "Key word created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: word })))
}

/// PUT /api/v1/key-words/{id}
///
/// Patch a key word; a present `feacn_codes` replaces the full
/// fragment list. The morphology gate is re-run against the effective
/// word/match-type pair.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateKeyWord>,
) -> AppResult<impl IntoResponse> {
    let existing = KeyWordRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "KeyWord",
            id,
        }))?;

    let word = match input.word {
        Some(word) => validate_word(&word)?,
        None => existing.key_word.word.clone(),
    };
    let match_type = input
        .match_type
        .unwrap_or_else(|| existing.key_word.match_type());
    let enabled = input.enabled.unwrap_or(existing.key_word.enabled);
    let feacn_codes = input.feacn_codes.unwrap_or(existing.feacn_codes);
    let insert_before = input.insert_before.or(existing.key_word.insert_before);
    let insert_after = input.insert_after.or(existing.key_word.insert_after);

    validate_codes(&feacn_codes)?;
    ensure_match_type_supported(state.morphology.as_ref(), &word, match_type)?;

    let updated = KeyWordRepo::update(
        &state.pool,
        id,
        &word,
        match_type,
        enabled,
        &feacn_codes,
        insert_before.as_deref(),
        insert_after.as_deref(),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "KeyWord",
        id,
    }))?;

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/key-words/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !KeyWordRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "KeyWord",
            id,
        }));
    }

    Ok(StatusCode::NO_CONTENT)
}
