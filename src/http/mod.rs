//! HTTP transport layer.
//!
//! Binds the registry, dispatcher and health aggregator to the JSON-over-HTTP
//! endpoints. Every error leaves as an [`Envelope`](crate::dispatch::Envelope).

pub mod codec;
pub mod handlers;
pub mod router;
pub mod server;

pub use router::{build_router, AppState};
pub use server::GatewayServer;
