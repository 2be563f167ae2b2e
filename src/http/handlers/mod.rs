//! Endpoint handlers, one module per resource.

pub mod health;
pub mod run;
pub mod tools;
