//! HTTP handlers.
//!
//! - `/`        : fixed greeting
//! - `/metrics` : Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use hellometrics_core::metrics::CONTENT_TYPE;

use crate::app_state::AppState;

pub const GREETING: &str = "Hello, world!";

pub async fn hello() -> impl IntoResponse {
    (StatusCode::OK, GREETING)
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.registry().collect();

    (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response()
}
