//! Route definitions for FEACN reference data.
//!
//! Mounted at `/feacn`.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::feacn;
use crate::state::AppState;

/// Routes mounted at `/feacn`.
///
/// ```text
/// GET    /orders                 -> list_orders
/// POST   /orders                 -> create_order
/// PUT    /orders/{id}/enable     -> enable_order
/// PUT    /orders/{id}/disable    -> disable_order
/// GET    /prefixes               -> list_prefixes
/// POST   /prefixes               -> create_prefix
/// GET    /prefixes/{id}          -> get_prefix
/// PUT    /prefixes/{id}          -> update_prefix
/// DELETE /prefixes/{id}          -> delete_prefix
/// GET    /codes/{code}           -> lookup_code
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(feacn::list_orders))
        .route("/orders", post(feacn::create_order))
        .route("/orders/{id}/enable", put(feacn::enable_order))
        .route("/orders/{id}/disable", put(feacn::disable_order))
        .route("/prefixes", get(feacn::list_prefixes))
        .route("/prefixes", post(feacn::create_prefix))
        .route("/prefixes/{id}", get(feacn::get_prefix))
        .route("/prefixes/{id}", put(feacn::update_prefix))
        .route("/prefixes/{id}", delete(feacn::delete_prefix))
        .route("/codes/{code}", get(feacn::lookup_code))
}
