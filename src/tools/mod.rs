//! Tool infrastructure — catalog, registry, validation, handler contract.
//!
//! The gateway owns tool metadata and parameter validation; the behavior of a
//! tool lives behind the [`ToolHandler`] trait and is supplied at wiring time.

pub mod catalog;
pub mod handler;
pub mod validation;

pub use catalog::{
    ParamSpec, ParamType, ParameterSchema, RegisteredTool, ToolDefinition, ToolRegistry,
};
pub use handler::{HandlerError, PartialSink, ToolHandler, ToolRequest};
pub use validation::{validate, ValidationError, ValidationReason};
