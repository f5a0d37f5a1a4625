use crate::Result;
use crate::expr::PolicyExpression;
use camino::Utf8Path;
use ohno::{IntoAppError, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;

/// A set of named CEL expressions loaded from TOML
///
/// ```toml
/// resource = "ec2"
///
/// [[expressions]]
/// name = "untagged"
/// description = "Instances without an owner tag"
/// expression = 'Resource.Tags.key("Owner") == null'
/// ```
///
/// An expression's own `resource` overrides the file-level one.
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyFile {
    /// Resource type the expressions apply to unless they name their own
    #[serde(default)]
    pub resource: Option<String>,

    pub expressions: Vec<PolicyExpression>,
}

impl PolicyFile {
    /// Load and compile a policy file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if any expression fails to
    /// compile, or if the expression list is empty or has duplicate names.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = fs::read_to_string(path).into_app_err_with(|| format!("reading policy file '{path}'"))?;
        Self::parse(&text).into_app_err_with(|| format!("parsing policy file '{path}'"))
    }

    /// Parse and compile policy TOML
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid policy.
    pub fn parse(text: &str) -> Result<Self> {
        let policy: Self = toml::from_str(text).into_app_err("invalid policy TOML")?;
        policy.validate()?;
        Ok(policy)
    }

    /// The resource type an expression is meant for
    #[must_use]
    pub fn resource_for<'a>(&'a self, expression: &'a PolicyExpression) -> Option<&'a str> {
        expression.resource().or(self.resource.as_deref())
    }

    fn validate(&self) -> Result<()> {
        if self.expressions.is_empty() {
            bail!("the policy declares no expressions");
        }

        let mut seen = HashSet::new();
        for expression in &self.expressions {
            if !seen.insert(expression.name()) {
                bail!("expression name '{}' is declared more than once", expression.name());
            }
        }

        Ok(())
    }
}
