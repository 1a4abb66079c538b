//! Route definitions for registers and import jobs.
//!
//! Mounted at `/registers`.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::registers;
use crate::state::AppState;

/// Routes mounted at `/registers`.
///
/// ```text
/// POST   /upload                    -> upload_register (multipart)
/// GET    /import/{handle}           -> get_import_progress
/// DELETE /import/{handle}           -> remove_import_job
/// POST   /import/{handle}/cancel    -> cancel_import
/// GET    /                          -> list_registers
/// GET    /{id}                      -> get_register
/// DELETE /{id}                      -> delete_register
/// POST   /{id}/validate             -> validate_register
/// GET    /{id}/parcels              -> list_register_parcels
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(registers::upload_register))
        .route("/import/{handle}", get(registers::get_import_progress))
        .route("/import/{handle}", delete(registers::remove_import_job))
        .route("/import/{handle}/cancel", post(registers::cancel_import))
        .route("/", get(registers::list_registers))
        .route("/{id}", get(registers::get_register))
        .route("/{id}", delete(registers::delete_register))
        .route("/{id}/validate", post(registers::validate_register))
        .route("/{id}/parcels", get(registers::list_register_parcels))
}
