//! HTTP server — bind, serve, graceful shutdown.

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::http::{build_router, AppState};

/// HTTP server wrapping the gateway router.
#[derive(Debug)]
pub struct GatewayServer {
    state: AppState,
    addr: String,
    cancel: CancellationToken,
}

impl GatewayServer {
    pub fn new(state: AppState, addr: impl Into<String>) -> Self {
        Self {
            state,
            addr: addr.into(),
            cancel: CancellationToken::new(),
        }
    }

    /// Bind the configured address and serve until shut down.
    pub async fn serve(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(&self.addr).await?;
        self.serve_on(listener).await
    }

    /// Serve on an already-bound listener until shut down.
    ///
    /// After [`shutdown`](Self::shutdown) no new connections are accepted;
    /// in-flight requests are allowed to finish.
    pub async fn serve_on(&self, listener: TcpListener) -> std::io::Result<()> {
        let local = listener.local_addr()?;
        tracing::info!("HTTP server listening on {}", local);

        let cancel = self.cancel.clone();
        axum::serve(listener, build_router(self.state.clone()))
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        tracing::info!("HTTP server shutting down");
        self.cancel.cancel();
    }

    /// Token cancelled by [`shutdown`](Self::shutdown).
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}
