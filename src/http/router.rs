//! Top-level HTTP router — binds endpoints to handlers, maps errors to envelopes.

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use std::time::Instant;

use crate::dispatch::{Dispatcher, Envelope};
use crate::health::{HttpStatusChecker, ServiceHealthAggregator};
use crate::http::handlers;
use crate::tools::ToolRegistry;
use crate::types::{Config, Error, Result};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub registry: Arc<ToolRegistry>,
    pub health: Arc<ServiceHealthAggregator>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher, health: Arc<ServiceHealthAggregator>) -> Self {
        Self {
            registry: dispatcher.registry().clone(),
            dispatcher,
            health,
        }
    }

    /// Build state from configuration: an empty registry and one
    /// [`HttpStatusChecker`] per configured service.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let registry = Arc::new(ToolRegistry::new());
        let dispatcher = Dispatcher::new(registry, config.dispatch.clone());
        let health = Arc::new(ServiceHealthAggregator::new(&config.health));

        for service in &config.services {
            let checker = HttpStatusChecker::new(service, config.health.check_timeout)?;
            health.register(Arc::new(checker)).await;
        }

        Ok(Self::new(dispatcher, health))
    }
}

/// Build the gateway router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/health",
            get(handlers::health::liveness).fallback(method_not_allowed),
        )
        .route(
            "/v1/service-health",
            get(handlers::health::service_health).fallback(method_not_allowed),
        )
        .route(
            "/v1/tools",
            get(handlers::tools::list_tools).fallback(method_not_allowed),
        )
        .route(
            "/v1/run",
            post(handlers::run::run_tool).fallback(method_not_allowed),
        )
        .fallback(not_found)
        .layer(middleware::from_fn(request_logger))
        .with_state(state)
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.to_http_status();
        (status, Json(Envelope::from(&self))).into_response()
    }
}

async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}

async fn not_found(request: Request) -> Error {
    Error::not_found(request.uri().path().to_string())
}

/// Logs method, path, status code and duration of each request.
async fn request_logger(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let start = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        http.method = %method,
        http.path = %path,
        http.status = response.status().as_u16(),
        http.duration_ms = start.elapsed().as_millis() as u64,
        "request completed"
    );

    response
}
