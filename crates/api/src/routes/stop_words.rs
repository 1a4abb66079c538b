//! Route definitions for the stop-word vocabulary.
//!
//! Mounted at `/stop-words`.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::stop_words;
use crate::state::AppState;

/// Routes mounted at `/stop-words`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(stop_words::list))
        .route("/", post(stop_words::create))
        .route("/validate", post(stop_words::validate))
        .route("/{id}", get(stop_words::get_by_id))
        .route("/{id}", put(stop_words::update))
        .route("/{id}", delete(stop_words::delete))
}
