//! Strongly-typed identifiers.

use std::fmt;

/// Correlation id for one `/v1/run` call.
///
/// Taken from the client's `request_id` when present, otherwise a fresh UUID v4.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Use the client-supplied id, or generate one if it is absent or blank.
    pub fn from_client(id: Option<&str>) -> Self {
        match id {
            Some(s) if !s.trim().is_empty() => Self(s.to_string()),
            _ => Self::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
