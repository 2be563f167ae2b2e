//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context. Every variant maps to an HTTP status
//! and a stable wire code used in the error envelope.

use axum::http::StatusCode;
use thiserror::Error;

use crate::tools::ValidationError;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the gateway.
#[derive(Error, Debug)]
pub enum Error {
    /// Request body could not be parsed (400).
    #[error("Invalid request format: {0}")]
    MalformedRequest(String),

    /// Request did not name a tool (400).
    #[error("Missing tool_name in request")]
    MissingToolName,

    /// Request named a tool that is not registered (400).
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Input failed schema validation (400).
    #[error("Parameter validation failed: {0}")]
    InvalidParameter(#[from] ValidationError),

    /// Handler returned an error. The message is passed through verbatim (500).
    #[error("{0}")]
    HandlerFailure(String),

    /// Handler did not finish within the requested deadline (500).
    #[error("timeout: {0}")]
    Timeout(String),

    /// Handler produces progressive output but the transport cannot stream it (500).
    #[error("Streaming not supported: {0}")]
    StreamingUnsupported(String),

    /// Wrong HTTP method for an endpoint (405).
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Unknown route (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid registration data (tool definitions, checkers).
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Internal errors.
    #[error("internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status for this error.
    pub fn to_http_status(&self) -> StatusCode {
        match self {
            Error::MalformedRequest(_)
            | Error::MissingToolName
            | Error::UnknownTool(_)
            | Error::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::HandlerFailure(_)
            | Error::Timeout(_)
            | Error::StreamingUnsupported(_)
            | Error::Validation(_)
            | Error::Config(_)
            | Error::Internal(_)
            | Error::Serialization(_)
            | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error code for the wire envelope.
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::MalformedRequest(_) => "MALFORMED_REQUEST",
            Error::MissingToolName => "MISSING_TOOL_NAME",
            Error::UnknownTool(_) => "UNKNOWN_TOOL",
            Error::InvalidParameter(_) => "INVALID_PARAMETER",
            Error::HandlerFailure(_) => "HANDLER_FAILURE",
            Error::Timeout(_) => "TIMEOUT",
            Error::StreamingUnsupported(_) => "STREAMING_UNSUPPORTED",
            Error::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Validation(_) => "VALIDATION",
            Error::Config(_) => "CONFIG",
            Error::Internal(_) | Error::Serialization(_) | Error::Io(_) => "INTERNAL",
        }
    }

    /// True for errors caused by the caller rather than a collaborator.
    pub fn is_client_error(&self) -> bool {
        self.to_http_status().is_client_error()
    }
}

// Convenience constructors
impl Error {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRequest(msg.into())
    }

    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }

    pub fn handler_failure(msg: impl Into<String>) -> Self {
        Self::HandlerFailure(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn streaming_unsupported(msg: impl Into<String>) -> Self {
        Self::StreamingUnsupported(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ValidationError;

    #[test]
    fn test_user_errors_map_to_bad_request() {
        assert_eq!(Error::malformed("eof").to_http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::MissingToolName.to_http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::unknown_tool("X").to_http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::from(ValidationError::missing("msg")).to_http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_collaborator_errors_map_to_internal() {
        assert_eq!(
            Error::handler_failure("boom").to_http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::timeout("slow").to_http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::streaming_unsupported("Echo").to_http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_handler_failure_message_is_verbatim() {
        let err = Error::handler_failure("sonarr search failed: connection refused");
        assert_eq!(err.to_string(), "sonarr search failed: connection refused");
    }

    #[test]
    fn test_unknown_tool_message_names_tool() {
        assert_eq!(Error::unknown_tool("Nope").to_string(), "Unknown tool: Nope");
        assert_eq!(Error::unknown_tool("Nope").error_code(), "UNKNOWN_TOOL");
    }

    #[test]
    fn test_invalid_parameter_message_names_parameter() {
        let err = Error::from(ValidationError::missing("msg"));
        assert_eq!(
            err.to_string(),
            "Parameter validation failed: required parameter missing: msg"
        );
        assert!(err.is_client_error());
    }
}
