//! Route definitions for the key-word vocabulary.
//!
//! Mounted at `/key-words`.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::key_words;
use crate::state::AppState;

/// Routes mounted at `/key-words`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(key_words::list))
        .route("/", post(key_words::create))
        .route("/{id}", get(key_words::get_by_id))
        .route("/{id}", put(key_words::update))
        .route("/{id}", delete(key_words::delete))
}
