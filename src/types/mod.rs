//! Core types for the gateway.
//!
//! This module provides foundational types used throughout the system:
//! - **IDs**: Request correlation identifiers
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for server, dispatch, and health checks

mod config;
mod errors;
mod ids;

pub use config::{
    Config, DispatchConfig, HealthConfig, ObservabilityConfig, ServerConfig, ServiceEndpoint,
    LOG_LEVELS,
};
pub use errors::{Error, Result};
pub use ids::RequestId;
