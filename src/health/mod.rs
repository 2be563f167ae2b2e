//! Service health aggregation.
//!
//! Holds a list of [`ServiceChecker`]s and merges their results into one
//! [`ServiceHealthReport`]. Reports are computed fresh on every call.

mod http;

pub use http::HttpStatusChecker;

use async_trait::async_trait;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::types::HealthConfig;

/// Failure detail reported by a checker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CheckError(pub String);

impl CheckError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self(detail.into())
    }
}

/// Reports whether one collaborator service is reachable.
#[async_trait]
pub trait ServiceChecker: Send + Sync + 'static {
    /// Name used as the key in the health summary.
    fn name(&self) -> &str;

    async fn check(&self) -> Result<(), CheckError>;
}

// =============================================================================
// Report
// =============================================================================

/// Status of one service. Serialized as `"healthy"` or `"unhealthy: <detail>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStatus {
    Healthy,
    Unhealthy(String),
}

impl ServiceStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ServiceStatus::Healthy)
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceStatus::Healthy => f.write_str("healthy"),
            ServiceStatus::Unhealthy(detail) => write!(f, "unhealthy: {}", detail),
        }
    }
}

impl Serialize for ServiceStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Overall status across all checkers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Ok,
    Degraded,
}

/// Merged result of one `check_all` round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceHealthReport {
    pub status: OverallStatus,
    pub services: BTreeMap<String, ServiceStatus>,
}

impl ServiceHealthReport {
    fn from_results(services: BTreeMap<String, ServiceStatus>) -> Self {
        let status = if services.values().all(ServiceStatus::is_healthy) {
            OverallStatus::Ok
        } else {
            OverallStatus::Degraded
        };
        Self { status, services }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == OverallStatus::Ok
    }
}

// =============================================================================
// Aggregator
// =============================================================================

/// Runs every registered checker concurrently, each bounded by `check_timeout`.
pub struct ServiceHealthAggregator {
    checkers: RwLock<Vec<Arc<dyn ServiceChecker>>>,
    check_timeout: Duration,
}

impl fmt::Debug for ServiceHealthAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceHealthAggregator")
            .field("check_timeout", &self.check_timeout)
            .finish_non_exhaustive()
    }
}

impl ServiceHealthAggregator {
    pub fn new(config: &HealthConfig) -> Self {
        Self {
            checkers: RwLock::new(Vec::new()),
            check_timeout: config.check_timeout,
        }
    }

    pub async fn register(&self, checker: Arc<dyn ServiceChecker>) {
        let mut checkers = self.checkers.write().await;
        if checkers.iter().any(|c| c.name() == checker.name()) {
            tracing::warn!(
                "Health checker {} registered twice; later result wins",
                checker.name()
            );
        }
        tracing::info!("Registered health checker: {}", checker.name());
        checkers.push(checker);
    }

    pub async fn len(&self) -> usize {
        self.checkers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.checkers.read().await.is_empty()
    }

    /// Run all checkers and merge their results.
    pub async fn check_all(&self) -> ServiceHealthReport {
        // Snapshot so slow checks never hold the lock.
        let checkers: Vec<Arc<dyn ServiceChecker>> = self.checkers.read().await.clone();
        let limit = self.check_timeout;

        let handles: Vec<_> = checkers
            .into_iter()
            .map(|checker| {
                let name = checker.name().to_string();
                let task = tokio::spawn(async move {
                    match tokio::time::timeout(limit, checker.check()).await {
                        Ok(Ok(())) => ServiceStatus::Healthy,
                        Ok(Err(e)) => ServiceStatus::Unhealthy(e.0),
                        Err(_) => ServiceStatus::Unhealthy(format!(
                            "check timed out after {}ms",
                            limit.as_millis()
                        )),
                    }
                });
                (name, task)
            })
            .collect();

        let mut services = BTreeMap::new();
        for (name, task) in handles {
            let status = match task.await {
                Ok(status) => status,
                Err(_) => ServiceStatus::Unhealthy("health checker panicked".to_string()),
            };
            if let ServiceStatus::Unhealthy(detail) = &status {
                tracing::warn!("Service {} is unhealthy: {}", name, detail);
            }
            services.insert(name, status);
        }

        let report = ServiceHealthReport::from_results(services);
        tracing::debug!(
            status = ?report.status,
            services = report.services.len(),
            "Service health check complete"
        );
        report
    }
}
