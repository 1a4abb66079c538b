//! Handlers for the `/parcels` resource: retrieval, human status
//! override, and standalone re-classification.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use cargoscreen_core::check_status::ClassificationResult;
use cargoscreen_core::error::CoreError;
use cargoscreen_core::types::DbId;
use cargoscreen_db::models::parcel::{Parcel, ParcelVariant, StatusOverride};
use cargoscreen_db::repositories::{ParcelRepo, RegisterRepo};
use serde::Serialize;

use crate::engine::classify::{classify_parcel, ClassificationContext};
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a parcel or return `NotFound`.
async fn ensure_parcel_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<Parcel> {
    ParcelRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Parcel",
            id,
        }))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Typed response for parcel retrieval: the row, the tagged variant
/// view derived from the owning register's document type, and the
/// stop-word matches persisted by the last classification pass.
#[derive(Debug, Serialize)]
pub struct ParcelResponse {
    #[serde(flatten)]
    pub parcel: Parcel,
    pub variant: Option<ParcelVariant>,
    pub matched_stop_word_ids: Vec<DbId>,
}

/// GET /api/v1/parcels/{id}
pub async fn get_parcel(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let parcel = ensure_parcel_exists(&state.pool, id).await?;

    let register = RegisterRepo::find_by_id(&state.pool, parcel.register_id).await?;
    let variant = register
        .and_then(|r| r.document_type())
        .map(|dt| parcel.variant(dt));

    let matched_stop_word_ids = ParcelRepo::matched_stop_word_ids(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: ParcelResponse {
            parcel,
            variant,
            matched_stop_word_ids,
        },
    }))
}

/// PUT /api/v1/parcels/{id}/status
///
/// Human reviewer override. Only the human-asserted statuses
/// (`approved`, `partner_flagged`) may be set here; automatic statuses
/// come from classification alone.
pub async fn override_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<StatusOverride>,
) -> AppResult<impl IntoResponse> {
    if !input.status.is_human_asserted() {
        return Err(AppError::BadRequest(
            "Only approved or partner_flagged can be set by a reviewer".to_string(),
        ));
    }

    let parcel = ParcelRepo::set_status(&state.pool, id, input.status)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Parcel",
            id,
        }))?;

    tracing::info!(parcel_id = id, status = ?input.status, "Parcel status overridden");
    Ok(Json(DataResponse { data: parcel }))
}

/// Typed response for the standalone classification endpoint.
#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub parcel: Parcel,
    pub result: ClassificationResult,
}

/// POST /api/v1/parcels/{id}/classify
///
/// Re-classify one parcel on demand (e.g. after a catalog edit).
/// Refuses parcels whose status was asserted by a human reviewer.
pub async fn classify(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let parcel = ensure_parcel_exists(&state.pool, id).await?;

    if parcel.check_status().is_human_asserted() {
        return Err(AppError::Core(CoreError::Conflict(
            "Parcel status was set by a reviewer and is not re-classified automatically"
                .to_string(),
        )));
    }

    let ctx = ClassificationContext::load(&state.pool).await?;
    let result = classify_parcel(&state.pool, &ctx, state.morphology.as_ref(), &parcel).await?;

    let updated = ParcelRepo::apply_classification(&state.pool, id, &result)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Parcel",
            id,
        }))?;

    Ok(Json(DataResponse {
        data: ClassifyResponse {
            parcel: updated,
            result,
        },
    }))
}
