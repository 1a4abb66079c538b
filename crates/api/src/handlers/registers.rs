//! Handlers for the `/registers` resource: upload, import job progress
//! and cancellation, register CRUD, and re-validation.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use cargoscreen_core::error::CoreError;
use cargoscreen_core::import_job::ImportHandle;
use cargoscreen_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use cargoscreen_core::types::DbId;
use cargoscreen_db::models::parcel::ParcelListQuery;
use cargoscreen_db::models::register::DocumentType;
use cargoscreen_db::repositories::{ParcelRepo, RegisterRepo};

use crate::engine::import::{start_register_import, start_register_validation};
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter and response structs
// ---------------------------------------------------------------------------

/// Query parameters for the register upload endpoint.
#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub document_type: DocumentType,
}

/// Query parameters for listing registers.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Typed response for the cancel endpoint.
#[derive(Debug, Serialize)]
pub struct CancelResult {
    pub cancelled: bool,
}

// ---------------------------------------------------------------------------
// Import job handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/registers/upload?document_type=
///
/// Accept a multipart register upload (spreadsheet or archive), create
/// the register with its parcels, and start the validation job.
/// Payload problems are rejected synchronously with distinct error
/// codes; nothing is persisted in that case.
pub async fn upload_register(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        upload = Some((filename, bytes.to_vec()));
        break;
    }

    let Some((filename, bytes)) = upload else {
        return Err(AppError::BadRequest(
            "No file received in multipart upload".to_string(),
        ));
    };

    let started = start_register_import(&state, params.document_type, &filename, &bytes).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: started })))
}

/// GET /api/v1/registers/import/{handle}
///
/// Poll the progress of an import or validation job.
pub async fn get_import_progress(
    State(state): State<AppState>,
    Path(handle): Path<ImportHandle>,
) -> AppResult<impl IntoResponse> {
    let progress = state
        .registry
        .progress(handle)
        .ok_or_else(|| AppError::NotFound(format!("Import job {handle} not found")))?;

    Ok(Json(DataResponse { data: progress }))
}

/// POST /api/v1/registers/import/{handle}/cancel
///
/// Request cooperative cancellation of a running job. `cancelled` is
/// `false` for unknown handles and jobs already in a terminal state.
pub async fn cancel_import(
    State(state): State<AppState>,
    Path(handle): Path<ImportHandle>,
) -> AppResult<impl IntoResponse> {
    let cancelled = state.registry.cancel(handle);
    if cancelled {
        tracing::info!(%handle, "Import job cancellation requested");
    }

    Ok(Json(DataResponse {
        data: CancelResult { cancelled },
    }))
}

/// DELETE /api/v1/registers/import/{handle}
///
/// Drop a terminal job entry from the registry (housekeeping for
/// long-lived processes). Running jobs cannot be removed; cancel them
/// first.
pub async fn remove_import_job(
    State(state): State<AppState>,
    Path(handle): Path<ImportHandle>,
) -> AppResult<impl IntoResponse> {
    let progress = state
        .registry
        .progress(handle)
        .ok_or_else(|| AppError::NotFound(format!("Import job {handle} not found")))?;

    if !progress.finished {
        return Err(AppError::Core(CoreError::Conflict(
            "Import job is still running; cancel it before removing".to_string(),
        )));
    }

    state.registry.remove(handle);
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Register CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/registers?limit=&offset=
pub async fn list_registers(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);

    let registers = RegisterRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: registers }))
}

/// GET /api/v1/registers/{id}
pub async fn get_register(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let register = RegisterRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Register",
            id,
        }))?;

    Ok(Json(DataResponse { data: register }))
}

/// DELETE /api/v1/registers/{id}
///
/// Delete a register; its parcels cascade.
pub async fn delete_register(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !RegisterRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Register",
            id,
        }));
    }

    tracing::info!(register_id = id, "Register deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/registers/{id}/validate
///
/// Start a re-classification job over an existing register (e.g. after
/// a vocabulary or rule edit).
pub async fn validate_register(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let started = start_register_validation(&state, id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: started })))
}

/// GET /api/v1/registers/{id}/parcels?status=&limit=&offset=
pub async fn list_register_parcels(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<ParcelListQuery>,
) -> AppResult<impl IntoResponse> {
    // 404 for unknown registers rather than an empty list.
    RegisterRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Register",
            id,
        }))?;

    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);

    let parcels =
        ParcelRepo::list_by_register(&state.pool, id, params.status, limit, offset).await?;
    Ok(Json(DataResponse { data: parcels }))
}
