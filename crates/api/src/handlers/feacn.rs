//! Handlers for the `/feacn` reference data: legal-basis orders,
//! prefix rules with exceptions, and catalog code lookup.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use cargoscreen_core::error::CoreError;
use cargoscreen_core::feacn::{is_well_formed, normalize_code, validate_prefix};
use cargoscreen_core::types::DbId;
use cargoscreen_db::models::feacn::{CreateFeacnOrder, CreateFeacnPrefix, FeacnCode};
use cargoscreen_db::repositories::FeacnRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// GET /api/v1/feacn/orders
pub async fn list_orders(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let orders = FeacnRepo::list_orders(&state.pool).await?;
    Ok(Json(DataResponse { data: orders }))
}

/// POST /api/v1/feacn/orders
pub async fn create_order(
    State(state): State<AppState>,
    Json(input): Json<CreateFeacnOrder>,
) -> AppResult<impl IntoResponse> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Order title must not be empty".to_string(),
        )));
    }

    let order = FeacnRepo::create_order(&state.pool, &input).await?;

    tracing::info!(order_id = order.id, title = %order.title, "FEACN order created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: order })))
}

/// PUT /api/v1/feacn/orders/{id}/enable
pub async fn enable_order(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    set_order_enabled(&state, id, true).await
}

/// PUT /api/v1/feacn/orders/{id}/disable
///
/// Disabling an order removes all of its prefix rules from subsequent
/// classification passes without touching the rules themselves.
pub async fn disable_order(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    set_order_enabled(&state, id, false).await
}

async fn set_order_enabled(
    state: &AppState,
    id: DbId,
    enabled: bool,
) -> AppResult<impl IntoResponse> {
    let order = FeacnRepo::set_order_enabled(&state.pool, id, enabled)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "FeacnOrder",
            id,
        }))?;

    tracing::info!(order_id = id, enabled, "FEACN order toggled");
    Ok(Json(DataResponse { data: order }))
}

// ---------------------------------------------------------------------------
// Prefix rules
// ---------------------------------------------------------------------------

/// Validate a prefix rule payload: the prefix itself and every
/// exception fragment must be digit strings of at most 10 characters.
fn validate_prefix_input(input: &CreateFeacnPrefix) -> Result<(), AppError> {
    validate_prefix(&input.code).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    for exception in &input.exceptions {
        validate_prefix(exception).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    Ok(())
}

/// GET /api/v1/feacn/prefixes
pub async fn list_prefixes(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let prefixes = FeacnRepo::list_prefixes(&state.pool).await?;
    Ok(Json(DataResponse { data: prefixes }))
}

/// GET /api/v1/feacn/prefixes/{id}
pub async fn get_prefix(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let prefix = FeacnRepo::find_prefix(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "FeacnPrefix",
            id,
        }))?;

    Ok(Json(DataResponse { data: prefix }))
}

/// POST /api/v1/feacn/prefixes
pub async fn create_prefix(
    State(state): State<AppState>,
    Json(input): Json<CreateFeacnPrefix>,
) -> AppResult<impl IntoResponse> {
    validate_prefix_input(&input)?;

    if let Some(order_id) = input.feacn_order_id {
        FeacnRepo::find_order(&state.pool, order_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "FeacnOrder",
                id: order_id,
            }))?;
    }

    let prefix = FeacnRepo::create_prefix(&state.pool, &input).await?;

    tracing::info!(prefix_id = prefix.prefix.id, code = %prefix.prefix.code, "FEACN prefix created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: prefix })))
}

/// PUT /api/v1/feacn/prefixes/{id}
pub async fn update_prefix(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateFeacnPrefix>,
) -> AppResult<impl IntoResponse> {
    validate_prefix_input(&input)?;

    let prefix = FeacnRepo::update_prefix(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "FeacnPrefix",
            id,
        }))?;

    Ok(Json(DataResponse { data: prefix }))
}

/// DELETE /api/v1/feacn/prefixes/{id}
pub async fn delete_prefix(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !FeacnRepo::delete_prefix(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "FeacnPrefix",
            id,
        }));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Code catalog
// ---------------------------------------------------------------------------

/// Typed response for the catalog lookup endpoint.
#[derive(Debug, Serialize)]
pub struct CodeLookupResponse {
    pub code: String,
    /// `known`, `unknown`, or `malformed`.
    pub outcome: &'static str,
    pub entry: Option<FeacnCode>,
    /// Direct children of the matched catalog entry.
    pub children: Vec<FeacnCode>,
}

/// GET /api/v1/feacn/codes/{code}
///
/// Look up a declared code in the catalog. Reports the same
/// well-formedness/currency outcome the classification engine uses,
/// plus the entry's direct children for hierarchy browsing.
pub async fn lookup_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let code = normalize_code(&code).to_string();

    if !is_well_formed(&code) {
        return Ok(Json(DataResponse {
            data: CodeLookupResponse {
                code,
                outcome: "malformed",
                entry: None,
                children: Vec::new(),
            },
        }));
    }

    let entry = FeacnRepo::find_code(&state.pool, &code).await?;
    let current = FeacnRepo::code_is_current(&state.pool, &code).await?;

    let children = match &entry {
        Some(entry) => FeacnRepo::list_code_children(&state.pool, entry.id).await?,
        None => Vec::new(),
    };

    Ok(Json(DataResponse {
        data: CodeLookupResponse {
            code,
            outcome: if current { "known" } else { "unknown" },
            entry,
            children,
        },
    }))
}
