//! Named policy expressions

use crate::Result;
use cel_interpreter::Program;
use core::panic::AssertUnwindSafe;
use ohno::bail;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::panic;
use std::sync::Arc;

/// A compiled CEL expression with the name and description it was declared with
///
/// The expression text is compiled once, when the value is created or deserialized.
#[derive(Debug, Clone)]
pub struct PolicyExpression {
    name: String,
    description: Option<String>,
    resource: Option<String>,
    program: Arc<Program>,
    source: String,
}

impl PolicyExpression {
    /// Compile an expression
    ///
    /// # Errors
    ///
    /// Returns an error if the expression cannot be parsed
    pub fn new(name: String, description: Option<String>, expression: String) -> Result<Self> {
        // The parser panics on some truncated input, such as a trailing binary operator
        let program = match panic::catch_unwind(AssertUnwindSafe(|| Program::compile(&expression))) {
            Ok(Ok(program)) => program,
            Ok(Err(e)) => bail!("Could not parse expression '{name}': {e}"),
            Err(_) => bail!("Could not parse expression '{name}': invalid expression '{expression}'"),
        };

        Ok(Self {
            name,
            description,
            resource: None,
            program: Arc::new(program),
            source: expression,
        })
    }

    /// Restrict the expression to one resource type
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The resource type this expression is written for, if it names one
    #[must_use]
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    #[must_use]
    pub fn expression(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// The description when there is one, else the expression text
    #[must_use]
    pub fn summary(&self) -> &str {
        self.description().unwrap_or_else(|| self.expression())
    }
}

impl Serialize for PolicyExpression {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("PolicyExpression", 4)?;
        state.serialize_field("name", &self.name)?;
        if let Some(ref desc) = self.description {
            state.serialize_field("description", desc)?;
        }
        if let Some(ref resource) = self.resource {
            state.serialize_field("resource", resource)?;
        }
        state.serialize_field("expression", &self.source)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for PolicyExpression {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct ExpressionData {
            name: String,
            description: Option<String>,
            resource: Option<String>,
            expression: String,
        }

        let data = ExpressionData::deserialize(deserializer)?;

        let expression = Self::new(data.name, data.description, data.expression).map_err(D::Error::custom)?;
        Ok(match data.resource {
            Some(resource) => expression.with_resource(resource),
            None => expression,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_expression() {
        let expr = PolicyExpression::new(
            "public-sg".to_string(),
            Some("Security groups open to the world".to_string()),
            r#"Resource.IpRanges.exists(r, r == "0.0.0.0/0")"#.to_string(),
        )
        .unwrap();

        assert_eq!(expr.name(), "public-sg");
        assert_eq!(expr.description(), Some("Security groups open to the world"));
        assert_eq!(expr.summary(), "Security groups open to the world");
        assert!(expr.resource().is_none());
    }

    #[test]
    fn test_summary_falls_back_to_expression() {
        let expr = PolicyExpression::new("tagged".to_string(), None, "Resource.Tags.size() > 0".to_string()).unwrap();
        assert_eq!(expr.summary(), "Resource.Tags.size() > 0");
    }

    #[test]
    fn test_create_expression_invalid() {
        let err = PolicyExpression::new("bad_expr".to_string(), None, "(Resource.x > 5".to_string()).unwrap_err();
        assert!(err.to_string().contains("Could not parse expression 'bad_expr'"));
    }

    #[test]
    fn test_trailing_operator_is_a_parse_error() {
        for text in ["Resource.x >", "1 +"] {
            let err = PolicyExpression::new("truncated".to_string(), None, text.to_string()).unwrap_err();
            assert!(err.to_string().contains("Could not parse expression 'truncated'"), "{text}: {err}");
        }
    }

    #[test]
    fn test_method_style_calls_compile() {
        let _ = PolicyExpression::new(
            "schedule".to_string(),
            None,
            r#"Resource.Tags.key("maid_offhours").resource_schedule().off.exists(s, Now.getDayOfWeek(s.tz) in s.days)"#.to_string(),
        )
        .unwrap();
    }

    #[test]
    fn test_serialize_format() {
        let expr = PolicyExpression::new("test".to_string(), None, "true".to_string())
            .unwrap()
            .with_resource("ec2");

        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(json["name"], "test");
        assert_eq!(json["resource"], "ec2");
        assert_eq!(json["expression"], "true");
        assert!(!json.as_object().unwrap().contains_key("description"));
    }

    #[test]
    fn test_roundtrip() {
        let original = r#"{"name":"test","description":"desc","resource":"s3","expression":"Resource.Name != ''"}"#;
        let expr: PolicyExpression = serde_json::from_str(original).unwrap();
        let reserialized = serde_json::to_string(&expr).unwrap();
        let expr2: PolicyExpression = serde_json::from_str(&reserialized).unwrap();

        assert_eq!(expr.name(), expr2.name());
        assert_eq!(expr.description(), expr2.description());
        assert_eq!(expr.resource(), Some("s3"));
        assert_eq!(expr.expression(), expr2.expression());
    }

    #[test]
    fn test_deserialize_invalid_expression() {
        let json = r#"{"name": "bad", "expression": "(x > 5"}"#;
        let err = serde_json::from_str::<PolicyExpression>(json).unwrap_err();
        assert!(err.to_string().contains("Could not parse expression"));
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let json = r#"{"name": "test", "descriptiono": "typo", "expression": "x > 5"}"#;
        let result: Result<PolicyExpression, _> = serde_json::from_str(json);
        assert!(result.is_err(), "misspelled field should be rejected");
    }
}
