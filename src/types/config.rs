//! Configuration structures.
//!
//! Configuration is loaded from an optional JSON file, overridden by CLI flags
//! and environment variables in the binary, then validated once at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::types::{Error, Result};

/// Log levels accepted by `observability.log_level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Global gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Dispatcher configuration.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Service health check configuration.
    #[serde(default)]
    pub health: HealthConfig,

    /// Upstream services probed by `/v1/service-health`.
    #[serde(default)]
    pub services: Vec<ServiceEndpoint>,
}

impl Config {
    /// Load configuration from a JSON file. Missing sections fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))
    }

    /// Validate the configuration, returning the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(Error::config("host cannot be empty"));
        }
        if self.server.port == 0 {
            return Err(Error::config("port must be between 1 and 65535"));
        }

        let level = self.observability.log_level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(Error::config(format!(
                "log level must be one of: {}",
                LOG_LEVELS.join(", ")
            )));
        }

        if self.dispatch.stream_channel_capacity == 0 {
            return Err(Error::config("stream_channel_capacity must be positive"));
        }

        let mut seen = HashSet::new();
        for service in &self.services {
            if service.name.is_empty() {
                return Err(Error::config("service name cannot be empty"));
            }
            if !seen.insert(service.name.as_str()) {
                return Err(Error::config(format!(
                    "duplicate service name: {}",
                    service.name
                )));
            }
            reqwest::Url::parse(&service.base_url).map_err(|e| {
                Error::config(format!(
                    "invalid base_url for service {}: {}",
                    service.name, e
                ))
            })?;
        }

        Ok(())
    }

    /// `host:port` bind address.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to listen on.
    pub host: String,

    /// Port to listen on.
    pub port: u16,

    /// How long in-flight requests may drain after a shutdown signal.
    #[serde(with = "humantime_serde")]
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            shutdown_grace: Duration::from_secs(15),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Dispatcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Upper bound for client-requested timeouts in milliseconds (0 = no cap).
    pub max_timeout_ms: u64,

    /// Timeout applied when the client omits one, in milliseconds (0 = unbounded).
    pub default_timeout_ms: u64,

    /// Bounded channel capacity for progressive (partial) responses.
    pub stream_channel_capacity: usize,

    /// Whether the transport may deliver progressive responses. When disabled,
    /// a handler that streams output fails with `StreamingUnsupported`.
    pub streaming_enabled: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_timeout_ms: 0,
            default_timeout_ms: 0,
            stream_channel_capacity: 64,
            streaming_enabled: true,
        }
    }
}

impl DispatchConfig {
    /// Resolve the effective deadline for a request.
    ///
    /// `None` (or `Some(0)`) falls back to `default_timeout_ms`; the result is
    /// capped by `max_timeout_ms`. Returns `None` when execution is unbounded.
    pub fn effective_timeout(&self, requested_ms: Option<u64>) -> Option<Duration> {
        let ms = match requested_ms {
            Some(ms) if ms > 0 => ms,
            _ => self.default_timeout_ms,
        };
        if ms == 0 {
            return None;
        }
        let capped = if self.max_timeout_ms > 0 {
            ms.min(self.max_timeout_ms)
        } else {
            ms
        };
        Some(Duration::from_millis(capped))
    }
}

/// Service health check configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Per-checker deadline. A checker exceeding it is reported unhealthy.
    #[serde(with = "humantime_serde")]
    pub check_timeout: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_timeout: Duration::from_secs(5),
        }
    }
}

/// An upstream service whose status endpoint is probed for health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    /// Name reported in the health summary.
    pub name: String,

    /// Base URL, e.g. `http://localhost:8989`.
    pub base_url: String,

    /// Sent as `X-Api-Key`.
    #[serde(default)]
    pub api_key: String,

    /// Path probed on the base URL.
    #[serde(default = "default_status_path")]
    pub status_path: String,
}

fn default_status_path() -> String {
    "/api/v3/system/status".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(name: &str, url: &str) -> ServiceEndpoint {
        ServiceEndpoint {
            name: name.to_string(),
            base_url: url.to_string(),
            api_key: "key".to_string(),
            status_path: default_status_path(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.listen_addr(), "localhost:8080");
    }

    #[test]
    fn test_empty_host_rejected() {
        let mut config = Config::default();
        config.server.host = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("host cannot be empty"));
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let mut config = Config::default();
        config.observability.log_level = "verbose".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log level must be one of"));

        config.observability.log_level = "WARN".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_service_rejected() {
        let mut config = Config::default();
        config.services = vec![
            service("Sonarr", "http://localhost:8989"),
            service("Sonarr", "http://localhost:8990"),
        ];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate service name: Sonarr"));
    }

    #[test]
    fn test_bad_service_url_rejected() {
        let mut config = Config::default();
        config.services = vec![service("Radarr", "not a url")];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(
            r#"{
                "server": {"port": 9000},
                "health": {"check_timeout": "2s"},
                "services": [{"name": "Sonarr", "base_url": "http://localhost:8989"}]
            }"#,
        )
        .unwrap();

        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.shutdown_grace, Duration::from_secs(15));
        assert_eq!(config.health.check_timeout, Duration::from_secs(2));
        assert_eq!(config.services[0].status_path, "/api/v3/system/status");
        assert!(config.dispatch.streaming_enabled);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.json");
        std::fs::write(&path, r#"{"observability": {"log_level": "debug"}}"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.observability.log_level, "debug");

        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(Config::from_file(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_effective_timeout() {
        let dispatch = DispatchConfig::default();
        assert_eq!(dispatch.effective_timeout(None), None);
        assert_eq!(dispatch.effective_timeout(Some(0)), None);
        assert_eq!(
            dispatch.effective_timeout(Some(250)),
            Some(Duration::from_millis(250))
        );
        assert_eq!(
            dispatch.effective_timeout(Some(600_000)),
            Some(Duration::from_millis(600_000))
        );

        let capped = DispatchConfig {
            max_timeout_ms: 300_000,
            ..DispatchConfig::default()
        };
        assert_eq!(
            capped.effective_timeout(Some(10_000_000)),
            Some(Duration::from_millis(300_000))
        );
        assert_eq!(
            capped.effective_timeout(Some(250)),
            Some(Duration::from_millis(250))
        );

        let dispatch = DispatchConfig {
            default_timeout_ms: 1_000,
            max_timeout_ms: 0,
            ..DispatchConfig::default()
        };
        assert_eq!(
            dispatch.effective_timeout(None),
            Some(Duration::from_secs(1))
        );
        assert_eq!(
            dispatch.effective_timeout(Some(10_000_000)),
            Some(Duration::from_millis(10_000_000))
        );
    }
}
