//! Axum router wiring.

use axum::{middleware, routing::get, Router};
use tower_http::catch_panic::CatchPanicLayer;

use crate::{app_state::AppState, handlers, obs::middleware::track_requests};

pub fn build_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(handlers::hello))
        .route("/metrics", get(handlers::metrics))
        .with_state(state.clone());
    instrument(routes, state)
}

/// Wrap every route (and the fallback) with request instrumentation.
/// Panics become 500 responses inside the instrumentation layer.
pub fn instrument(router: Router, state: AppState) -> Router {
    router
        .layer(CatchPanicLayer::new())
        .layer(middleware::from_fn_with_state(state, track_requests))
}
