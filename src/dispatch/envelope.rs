//! Wire envelopes — the tagged shape of every `/v1/run` response.

use crate::types::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error payload inside an [`Envelope::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Response frame. Exactly one terminal frame (`Final`, `Partial` with
/// `done = true`, or `Error`) ends every response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Envelope {
    Final { result: Value },
    Partial { content: Value, done: bool },
    Error { error: ErrorBody },
}

impl Envelope {
    pub fn final_result(result: Value) -> Self {
        Envelope::Final { result }
    }

    pub fn partial(content: Value, done: bool) -> Self {
        Envelope::Partial { content, done }
    }

    pub fn error(message: impl Into<String>, code: Option<&str>) -> Self {
        Envelope::Error {
            error: ErrorBody {
                message: message.into(),
                code: code.map(str::to_string),
            },
        }
    }

    /// Terminal frame of a progressive response carrying a failure.
    pub fn partial_error(message: impl Into<String>) -> Self {
        Envelope::partial(serde_json::json!({ "error": message.into() }), true)
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            Envelope::Final { .. } | Envelope::Error { .. } => true,
            Envelope::Partial { done, .. } => *done,
        }
    }
}

impl From<&Error> for Envelope {
    fn from(err: &Error) -> Self {
        Envelope::error(err.to_string(), Some(err.error_code()))
    }
}
