#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tower::ServiceExt;

use hellometrics_server::app_state::AppState;
use hellometrics_server::config::ServerConfig;
use hellometrics_server::obs::middleware::{RequestGuard, STATUS_CLIENT_CLOSED};
use hellometrics_server::router::{build_router, instrument};
use hellometrics_server::server;

fn state() -> AppState {
    AppState::new(ServerConfig::default()).unwrap()
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_settle_gauge_and_count() {
    const N: u64 = 64;
    let state = state();
    let app = build_router(state.clone());

    let handles: Vec<_> = (0..N)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { app.oneshot(get_req("/")).await.unwrap() })
        })
        .collect();
    for h in handles {
        assert_eq!(h.await.unwrap().status(), StatusCode::OK);
    }

    let http = state.http_metrics();
    assert_eq!(http.active(), 0.0);
    assert_eq!(http.completed("GET", "/", 200), N);
}

#[tokio::test]
async fn gauge_counts_request_while_in_flight() {
    let state = state();
    let observer = state.clone();
    let routes = Router::new().route(
        "/inflight",
        get(move || {
            let observer = observer.clone();
            async move { observer.http_metrics().active().to_string() }
        }),
    );
    let app = instrument(routes, state.clone());

    let resp = app.oneshot(get_req("/inflight")).await.unwrap();
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"1");
    assert_eq!(state.http_metrics().active(), 0.0);
}

async fn boom() -> &'static str {
    panic!("handler failure")
}

#[tokio::test]
async fn panicking_handler_yields_500_and_is_recorded() {
    let state = state();
    let app = instrument(Router::new().route("/boom", get(boom)), state.clone());

    let resp = app.oneshot(get_req("/boom")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let http = state.http_metrics();
    assert_eq!(http.completed("GET", "/boom", 500), 1);
    assert_eq!(http.active(), 0.0);
}

#[tokio::test]
async fn dropped_request_future_still_completes_bookkeeping() {
    let state = state();
    let app = instrument(
        Router::new().route(
            "/slow",
            get(|| async {
                std::future::pending::<()>().await;
                "unreachable"
            }),
        ),
        state.clone(),
    );

    let res = tokio::time::timeout(Duration::from_millis(50), app.oneshot(get_req("/slow"))).await;
    assert!(res.is_err(), "handler must not finish");

    let http = state.http_metrics();
    assert_eq!(http.completed("GET", "/slow", STATUS_CLIENT_CLOSED), 1);
    assert_eq!(http.active(), 0.0);
}

#[tokio::test]
async fn guard_records_exactly_once() {
    let state = state();
    let http = state.http_metrics().clone();

    let guard = RequestGuard::start(http.clone(), "GET", "/");
    assert_eq!(http.active(), 1.0);
    guard.finish(StatusCode::OK);
    assert_eq!(http.active(), 0.0);
    assert_eq!(http.completed("GET", "/", 200), 1);

    let guard = RequestGuard::start(http.clone(), "DELETE", "/x");
    drop(guard);
    assert_eq!(http.completed("DELETE", "/x", STATUS_CLIENT_CLOSED), 1);
    assert_eq!(http.active(), 0.0);
}

#[test]
fn guard_dropped_during_unwind_records_500() {
    let state = state();
    let http = state.http_metrics().clone();

    let guarded = http.clone();
    let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
        let _guard = RequestGuard::start(guarded, "GET", "/p");
        panic!("handler failure");
    }));
    assert!(res.is_err());

    assert_eq!(http.completed("GET", "/p", 500), 1);
    assert_eq!(http.completed("GET", "/p", STATUS_CLIENT_CLOSED), 0);
    assert_eq!(http.active(), 0.0);
}

#[tokio::test]
async fn serves_over_tcp_and_shuts_down() {
    let state = state();
    let listener = server::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let srv = tokio::spawn(server::serve(listener, state.clone(), async move {
        let _ = rx.await;
    }));

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let raw = String::from_utf8(raw).unwrap();
    assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"), "{raw}");
    assert!(raw.ends_with("Hello, world!"), "{raw}");

    tx.send(()).unwrap();
    srv.await.unwrap().unwrap();
    assert_eq!(state.http_metrics().completed("GET", "/", 200), 1);
}

#[tokio::test]
async fn second_bind_on_same_port_is_io_error() {
    let first = server::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let addr = first.local_addr().unwrap();
    let err = server::bind(addr).await.expect_err("port is taken");
    assert_eq!(err.code().as_str(), "IO");
}
