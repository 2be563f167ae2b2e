//! # Tool Gateway - HTTP tool-dispatch service
//!
//! Exposes a small RPC-style protocol over HTTP: run a named tool with named
//! inputs and get back a typed result. Provides:
//! - A concurrent-safe registry of tool definitions and their handlers
//! - Schema-driven parameter validation
//! - Uniform final/partial/error response envelopes
//! - Deadline-bounded handler execution with cooperative cancellation
//! - Aggregated health reporting for upstream services
//!
//! ## Architecture
//!
//! ```text
//!                    ┌───────────────────────────────────┐
//!   HTTP requests →  │            axum Router            │
//!                    │  /health  /v1/tools  /v1/run  ... │
//!                    └─────┬──────────────┬──────────────┘
//!                          │              │
//!                   ┌──────▼─────┐  ┌─────▼───────┐
//!                   │ Dispatcher │  │   Health    │
//!                   │ (validate, │  │ Aggregator  │
//!                   │  execute)  │  └─────────────┘
//!                   └──────┬─────┘
//!                   ┌──────▼─────┐
//!                   │    Tool    │
//!                   │  Registry  │
//!                   └────────────┘
//! ```
//!
//! Concrete tools implement [`tools::ToolHandler`] and are registered with
//! [`tools::ToolRegistry::register`] at startup.

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

// Re-export public API
pub mod dispatch;
pub mod health;
pub mod http;
pub mod tools;
pub mod types;

// Internal utilities
pub mod observability;

pub use types::{Config, Error, Result};
