//! Per-request instrumentation.
//!
//! [`RequestGuard`] bumps the active gauge when created and does the
//! completion bookkeeping in `Drop`, so it runs exactly once whether the
//! handler returns, panics, or the request future is dropped because the
//! client went away.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tokio::time::Instant;

use crate::app_state::AppState;
use crate::obs::metrics::HttpMetrics;

/// Recorded when the request future is dropped before a response exists.
pub const STATUS_CLIENT_CLOSED: u16 = 499;

pub struct RequestGuard {
    metrics: HttpMetrics,
    method: String,
    route: String,
    start: Instant,
    status: Option<StatusCode>,
}

impl RequestGuard {
    pub fn start(metrics: HttpMetrics, method: &str, route: &str) -> Self {
        metrics.active_requests.inc(&[]);
        Self {
            metrics,
            method: method.to_string(),
            route: route.to_string(),
            start: Instant::now(),
            status: None,
        }
    }

    /// Complete with the response status. Bookkeeping runs on drop.
    pub fn finish(mut self, status: StatusCode) {
        self.status = Some(status);
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        let status = match self.status {
            Some(s) => s.as_u16(),
            None if std::thread::panicking() => StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            None => STATUS_CLIENT_CLOSED,
        };
        let status_label = status.to_string();

        self.metrics.request_duration.observe_duration(
            &[
                ("method", self.method.as_str()),
                ("route", self.route.as_str()),
                ("status", status_label.as_str()),
            ],
            elapsed,
        );
        self.metrics.active_requests.dec(&[]);

        if self.status.is_some() {
            tracing::debug!(
                method = %self.method,
                route = %self.route,
                status,
                elapsed_us = elapsed.as_micros() as u64,
                "request completed"
            );
        } else {
            tracing::debug!(
                method = %self.method,
                route = %self.route,
                status,
                "request ended without a response"
            );
        }
    }
}

/// `from_fn_with_state` middleware wrapping every route and the fallback.
pub async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let guard = RequestGuard::start(
        state.http_metrics().clone(),
        req.method().as_str(),
        req.uri().path(),
    );
    let response = next.run(req).await;
    guard.finish(response.status());
    response
}
