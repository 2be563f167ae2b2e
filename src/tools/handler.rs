//! Handler contract — the capability each tool implements.
//!
//! The dispatcher only ever sees `Arc<dyn ToolHandler>`; concrete tool types
//! are wired in at startup and never inspected.

use crate::dispatch::Envelope;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

// =============================================================================
// Request
// =============================================================================

/// One `/v1/run` call as seen by the dispatcher and the handler.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_name: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub input: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Deadline in milliseconds, measured from the start of execution.
    #[serde(rename = "timeout", default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Opaque token passed through to the handler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

fn null_as_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ToolRequest {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            ..Self::default()
        }
    }

    /// Set the input mapping. Non-object values yield an empty input.
    pub fn with_input(mut self, input: Value) -> Self {
        self.input = match input {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// String input value, if present and textual.
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.input.get(key).and_then(Value::as_str)
    }
}

impl fmt::Debug for ToolRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRequest")
            .field("tool_name", &self.tool_name)
            .field("input", &self.input)
            .field("request_id", &self.request_id)
            .field("timeout_ms", &self.timeout_ms)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

// =============================================================================
// Handler error
// =============================================================================

/// Failure reported by a handler. The message reaches the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_message(self) -> String {
        self.message
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

// =============================================================================
// Partial output
// =============================================================================

/// Channel through which a streaming handler emits intermediate content.
///
/// Every frame sent here has `done = false`; the dispatcher owns the single
/// terminal frame.
#[derive(Debug)]
pub struct PartialSink {
    tx: mpsc::Sender<Envelope>,
}

impl PartialSink {
    pub(crate) fn new(tx: mpsc::Sender<Envelope>) -> Self {
        Self { tx }
    }

    /// Emit one intermediate frame. Fails once the caller has gone away.
    pub async fn send(&self, content: Value) -> Result<(), HandlerError> {
        self.tx
            .send(Envelope::partial(content, false))
            .await
            .map_err(|_| HandlerError::new("response stream closed"))
    }
}

// =============================================================================
// Handler trait
// =============================================================================

/// Executes one tool.
///
/// `cancel` fires when the request deadline passes or the caller disconnects.
/// Observing it is advisory: the dispatcher stops waiting either way.
#[async_trait]
pub trait ToolHandler: Send + Sync + 'static {
    async fn handle(
        &self,
        request: ToolRequest,
        cancel: CancellationToken,
    ) -> Result<Value, HandlerError>;

    /// Whether this handler produces progressive output.
    fn streams_output(&self) -> bool {
        false
    }

    /// Progressive variant of [`handle`](Self::handle). Intermediate content
    /// goes through `sink`; the returned value becomes the terminal frame.
    async fn handle_stream(
        &self,
        request: ToolRequest,
        sink: PartialSink,
        cancel: CancellationToken,
    ) -> Result<Value, HandlerError> {
        drop(sink);
        self.handle(request, cancel).await
    }
}
