//! Tool catalog — typed metadata and the concurrent tool registry.
//!
//! Owns tool *definitions* together with their handlers. Schemas are typed at
//! construction time (`ParamType`, `ParamSpec`) so validation never inspects
//! loosely-typed schema values.

use crate::tools::handler::ToolHandler;
use crate::types::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

// =============================================================================
// Parameter types
// =============================================================================

/// JSON type a parameter must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    /// Check the runtime type of a JSON value.
    ///
    /// `Integer` accepts any number with a zero fractional part, so `5.0`
    /// passes and `5.5` does not. `Array` does not look at its elements.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Number => value.is_number(),
            ParamType::Integer => {
                value.is_i64()
                    || value.is_u64()
                    || value
                        .as_f64()
                        .is_some_and(|n| n.is_finite() && n.fract() == 0.0)
            }
            ParamType::Boolean => value.is_boolean(),
            ParamType::Array => value.is_array(),
            ParamType::Object => value.is_object(),
        }
    }

    /// Type name with its indefinite article, for error messages.
    pub fn with_article(self) -> &'static str {
        match self {
            ParamType::String => "a string",
            ParamType::Number => "a number",
            ParamType::Integer => "an integer",
            ParamType::Boolean => "a boolean",
            ParamType::Array => "an array",
            ParamType::Object => "an object",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Integer => "integer",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
            ParamType::Object => "object",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON type name of a value, for error messages.
pub(crate) fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Parameter specification
// =============================================================================

/// Declared shape of a single tool parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    #[serde(rename = "type")]
    pub param_type: ParamType,

    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Element type for arrays. Published in the tool listing only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ParamSpec>>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl ParamSpec {
    pub fn new(param_type: ParamType) -> Self {
        Self {
            param_type,
            required: false,
            description: String::new(),
            items: None,
        }
    }

    pub fn string() -> Self {
        Self::new(ParamType::String)
    }

    pub fn number() -> Self {
        Self::new(ParamType::Number)
    }

    pub fn integer() -> Self {
        Self::new(ParamType::Integer)
    }

    pub fn boolean() -> Self {
        Self::new(ParamType::Boolean)
    }

    pub fn object() -> Self {
        Self::new(ParamType::Object)
    }

    /// Array parameter with the given element spec.
    pub fn array_of(items: ParamSpec) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::new(ParamType::Array)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Parameter name → spec. Ordered so validation reports deterministically.
pub type ParameterSchema = BTreeMap<String, ParamSpec>;

// =============================================================================
// Tool definition
// =============================================================================

/// Complete tool metadata, immutable after registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: ParameterSchema,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: ParameterSchema::new(),
        }
    }

    /// Declare a parameter (builder style).
    pub fn param(mut self, name: impl Into<String>, spec: ParamSpec) -> Self {
        self.parameters.insert(name.into(), spec);
        self
    }
}

// =============================================================================
// Tool registry
// =============================================================================

/// A definition paired with the handler that executes it.
#[derive(Clone)]
pub struct RegisteredTool {
    pub definition: Arc<ToolDefinition>,
    pub handler: Arc<dyn ToolHandler>,
}

impl fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("definition", &self.definition)
            .field("streams_output", &self.handler.streams_output())
            .finish()
    }
}

/// In-memory tool registry shared by all request tasks.
///
/// Registration (startup) takes the write lock; lookup and listing take the
/// read lock and run in parallel with each other.
#[derive(Default)]
pub struct ToolRegistry {
    entries: RwLock<HashMap<String, RegisteredTool>>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry").finish_non_exhaustive()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Register a tool, replacing any existing tool with the same name.
    pub async fn register(
        &self,
        definition: ToolDefinition,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<()> {
        if definition.name.is_empty() {
            return Err(Error::validation("Tool name cannot be empty"));
        }

        let name = definition.name.clone();
        let entry = RegisteredTool {
            definition: Arc::new(definition),
            handler,
        };

        let previous = self.entries.write().await.insert(name.clone(), entry);
        if previous.is_some() {
            tracing::warn!("Replaced existing registration for tool: {}", name);
        } else {
            tracing::info!("Registered tool: {}", name);
        }
        Ok(())
    }

    /// Get a tool definition by name.
    pub async fn lookup(&self, name: &str) -> Option<Arc<ToolDefinition>> {
        self.entries
            .read()
            .await
            .get(name)
            .map(|entry| entry.definition.clone())
    }

    /// Get a tool's definition and handler by name.
    pub async fn resolve(&self, name: &str) -> Option<RegisteredTool> {
        self.entries.read().await.get(name).cloned()
    }

    /// List all tool definitions, sorted by name.
    pub async fn list_all(&self) -> Vec<Arc<ToolDefinition>> {
        let mut definitions: Vec<Arc<ToolDefinition>> = self
            .entries
            .read()
            .await
            .values()
            .map(|entry| entry.definition.clone())
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Number of registered tools.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
