//! Route definitions for parcels.
//!
//! Mounted at `/parcels`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::parcels;
use crate::state::AppState;

/// Routes mounted at `/parcels`.
///
/// ```text
/// GET  /{id}           -> get_parcel
/// PUT  /{id}/status    -> override_status (reviewer)
/// POST /{id}/classify  -> classify (standalone re-classification)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(parcels::get_parcel))
        .route("/{id}/status", put(parcels::override_status))
        .route("/{id}/classify", post(parcels::classify))
}
