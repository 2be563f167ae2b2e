//! Tool gateway HTTP server - main entry point.
//!
//! Serves:
//! - GET  /health             Liveness
//! - GET  /v1/service-health  Upstream service health
//! - GET  /v1/tools           Tool catalog
//! - POST /v1/run             Tool execution

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tool_gateway::http::{AppState, GatewayServer};
use tool_gateway::Config;

#[derive(Parser, Debug)]
#[command(name = "tool-gateway", version, about = "HTTP tool-dispatch gateway")]
struct Args {
    /// JSON configuration file. Defaults apply when omitted.
    #[arg(long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Host to listen on.
    #[arg(long, env = "GATEWAY_HOST")]
    host: Option<String>,

    /// Port to listen on.
    #[arg(long, env = "GATEWAY_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "GATEWAY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit JSON logs.
    #[arg(long, env = "GATEWAY_JSON_LOGS")]
    json_logs: bool,
}

impl Args {
    fn into_config(self) -> tool_gateway::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        if self.json_logs {
            config.observability.json_logs = true;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Args::parse().into_config()?;

    // Initialize observability
    tool_gateway::observability::init_tracing(&config.observability);

    let state = AppState::from_config(&config).await?;
    let addr = config.listen_addr();

    tracing::info!("Tool gateway starting on {}", addr);
    if config.services.is_empty() {
        tracing::info!("  No upstream services configured");
    }
    for service in &config.services {
        tracing::info!("  Service {}: {}", service.name, service.base_url);
    }
    tracing::info!("  GET  /health             Liveness");
    tracing::info!("  GET  /v1/service-health  Upstream service health");
    tracing::info!("  GET  /v1/tools           Tool catalog");
    tracing::info!("  POST /v1/run             Tool execution");

    let server = Arc::new(GatewayServer::new(state, addr));
    let mut serving = tokio::spawn({
        let server = server.clone();
        async move { server.serve().await }
    });

    tokio::select! {
        result = &mut serving => {
            // Server exited on its own, e.g. the address was already in use.
            result??;
            return Ok(());
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("Shutdown signal received");
        }
    }

    server.shutdown();
    match tokio::time::timeout(config.server.shutdown_grace, serving).await {
        Ok(result) => result??,
        Err(_) => tracing::warn!(
            "In-flight requests did not drain within {:?}; exiting",
            config.server.shutdown_grace
        ),
    }

    tracing::info!("Tool gateway stopped");
    Ok(())
}
