//! Listener + serve loop.

use std::future::Future;

use hellometrics_core::error::Result;
use tokio::net::TcpListener;

use crate::{app_state::AppState, router};

/// Bind `addr`. A taken port is an `Io` error.
pub async fn bind(addr: std::net::SocketAddr) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr).await?;
    Ok(listener)
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let port = listener.local_addr()?.port();
    let app = router::build_router(state);

    tracing::info!("Server running at http://localhost:{port}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("server stopped");
    Ok(())
}
