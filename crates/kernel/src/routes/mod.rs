//! HTTP route handlers.

pub mod catalog;
pub mod health;
pub mod metrics;
pub mod search;

use axum::Router;

use crate::state::AppState;

/// Every route, with state applied. Middleware layers are added by the caller.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(search::router())
        .merge(catalog::router())
        .merge(metrics::router())
        .with_state(state)
}
