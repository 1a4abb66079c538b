//! Route tree assembly.

pub mod feacn;
pub mod health;
pub mod key_words;
pub mod parcels;
pub mod registers;
pub mod stop_words;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /registers/upload                      upload + start validation job
/// /registers/import/{handle}             job progress
/// /registers/import/{handle}/cancel      job cancellation
/// /registers                             list
/// /registers/{id}                        get, delete (cascades parcels)
/// /registers/{id}/validate               start re-validation job
/// /registers/{id}/parcels                list parcels
///
/// /parcels/{id}                          get
/// /parcels/{id}/status                   reviewer override
/// /parcels/{id}/classify                 standalone re-classification
///
/// /stop-words, /stop-words/{id}          vocabulary CRUD (morphology-gated)
/// /key-words, /key-words/{id}            vocabulary CRUD (morphology-gated)
///
/// /feacn/orders[...]                     legal-basis orders, enable/disable
/// /feacn/prefixes[...]                   prefix rules with exceptions
/// /feacn/codes/{code}                    catalog lookup
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/registers", registers::router())
        .nest("/parcels", parcels::router())
        .nest("/stop-words", stop_words::router())
        .nest("/key-words", key_words::router())
        .nest("/feacn", feacn::router())
}
