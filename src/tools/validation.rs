//! Parameter validation against a tool's declared schema.
//!
//! Shallow and fail-fast: declared parameters are checked in name order and
//! the first violation is reported. Input keys the schema does not declare are
//! passed through untouched, and array elements are never inspected.

use crate::tools::catalog::{value_type_name, ParamType, ParameterSchema};
use serde_json::{Map, Value};
use std::fmt;

/// Why a parameter was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    /// Declared `required` but absent from the input.
    Missing,
    /// Present with the wrong JSON type.
    TypeMismatch {
        expected: ParamType,
        actual: &'static str,
    },
}

/// First parameter that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub param: String,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn missing(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            reason: ValidationReason::Missing,
        }
    }

    pub fn type_mismatch(param: impl Into<String>, expected: ParamType, actual: &Value) -> Self {
        Self {
            param: param.into(),
            reason: ValidationReason::TypeMismatch {
                expected,
                actual: value_type_name(actual),
            },
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            ValidationReason::Missing => write!(f, "required parameter missing: {}", self.param),
            ValidationReason::TypeMismatch { expected, actual } => write!(
                f,
                "parameter {} must be {}, got {}",
                self.param,
                expected.with_article(),
                actual
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate `input` against `schema`.
pub fn validate(
    input: &Map<String, Value>,
    schema: &ParameterSchema,
) -> Result<(), ValidationError> {
    for (name, spec) in schema {
        match input.get(name) {
            None if spec.required => return Err(ValidationError::missing(name)),
            None => {}
            Some(value) => {
                if !spec.param_type.matches(value) {
                    return Err(ValidationError::type_mismatch(name, spec.param_type, value));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::catalog::{ParamSpec, ToolDefinition};
    use proptest::prelude::*;
    use serde_json::json;

    fn input(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn schema(definition: ToolDefinition) -> ParameterSchema {
        definition.parameters
    }

    #[test]
    fn test_required_present_passes() {
        let s = schema(ToolDefinition::new("Echo", "").param("msg", ParamSpec::string().required()));
        assert!(validate(&input(json!({"msg": "hi"})), &s).is_ok());
    }

    #[test]
    fn test_required_missing_fails() {
        let s = schema(ToolDefinition::new("Echo", "").param("msg", ParamSpec::string().required()));
        let err = validate(&input(json!({})), &s).unwrap_err();
        assert_eq!(err, ValidationError::missing("msg"));
        assert_eq!(err.to_string(), "required parameter missing: msg");
    }

    #[test]
    fn test_optional_missing_passes() {
        let s = schema(ToolDefinition::new("T", "").param("limit", ParamSpec::integer()));
        assert!(validate(&input(json!({})), &s).is_ok());
    }

    #[test]
    fn test_extra_keys_are_ignored() {
        let s = schema(ToolDefinition::new("T", "").param("query", ParamSpec::string()));
        assert!(validate(&input(json!({"query": "x", "bogus": [1, 2]})), &s).is_ok());
    }

    #[test]
    fn test_integer_boundary() {
        let s = schema(ToolDefinition::new("T", "").param("n", ParamSpec::integer()));
        assert!(validate(&input(json!({"n": 5.0})), &s).is_ok());
        assert!(validate(&input(json!({"n": 5})), &s).is_ok());

        let err = validate(&input(json!({"n": 5.5})), &s).unwrap_err();
        assert_eq!(err.to_string(), "parameter n must be an integer, got number");

        let err = validate(&input(json!({"n": "5"})), &s).unwrap_err();
        assert_eq!(err.to_string(), "parameter n must be an integer, got string");
    }

    #[test]
    fn test_array_elements_not_checked() {
        let s = schema(
            ToolDefinition::new("T", "").param("categories", ParamSpec::array_of(ParamSpec::integer())),
        );
        assert!(validate(&input(json!({"categories": ["not", "ints"]})), &s).is_ok());
        assert!(validate(&input(json!({"categories": 1})), &s).is_err());
    }

    #[test]
    fn test_object_and_boolean() {
        let s = schema(
            ToolDefinition::new("T", "")
                .param("movieData", ParamSpec::object().required())
                .param("monitored", ParamSpec::boolean()),
        );
        assert!(validate(&input(json!({"movieData": {"tmdbId": 1}, "monitored": true})), &s).is_ok());

        let err = validate(&input(json!({"movieData": [], "monitored": true})), &s).unwrap_err();
        assert_eq!(err.param, "movieData");
    }

    #[test]
    fn test_null_is_not_a_string() {
        let s = schema(ToolDefinition::new("T", "").param("query", ParamSpec::string()));
        let err = validate(&input(json!({"query": null})), &s).unwrap_err();
        assert_eq!(
            err.reason,
            ValidationReason::TypeMismatch {
                expected: ParamType::String,
                actual: "null"
            }
        );
    }

    #[test]
    fn test_first_error_wins() {
        let s = schema(
            ToolDefinition::new("T", "")
                .param("alpha", ParamSpec::string().required())
                .param("beta", ParamSpec::string().required()),
        );
        let err = validate(&input(json!({})), &s).unwrap_err();
        assert_eq!(err.param, "alpha");
    }

    proptest! {
        #[test]
        fn prop_integral_floats_are_integers(n in -1_000_000i64..1_000_000i64) {
            let s = schema(ToolDefinition::new("T", "").param("n", ParamSpec::integer()));
            let args = input(json!({"n": n as f64}));
            prop_assert!(validate(&args, &s).is_ok());
        }

        #[test]
        fn prop_fractional_floats_are_not_integers(n in -1_000_000.0f64..1_000_000.0f64) {
            prop_assume!(n.fract() != 0.0);
            let s = schema(ToolDefinition::new("T", "").param("n", ParamSpec::integer()));
            let args = input(json!({"n": n}));
            prop_assert!(validate(&args, &s).is_err());
        }

        #[test]
        fn prop_missing_required_is_named(name in "[a-z]{1,12}", other in "[A-Z]{1,12}") {
            let s = schema(ToolDefinition::new("T", "").param(name.clone(), ParamSpec::string().required()));

            let mut only_other = Map::new();
            only_other.insert(other, json!("x"));
            let err = validate(&only_other, &s).unwrap_err();
            prop_assert_eq!(err, ValidationError::missing(name.clone()));

            let mut with_name = Map::new();
            with_name.insert(name, json!("x"));
            prop_assert!(validate(&with_name, &s).is_ok());
        }
    }
}
