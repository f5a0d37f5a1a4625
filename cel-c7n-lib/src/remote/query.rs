use crate::Result;
use jmespath::Expression;
use ohno::app_err;
use serde_json::Value as JsonValue;

/// Apply a `JMESPath` query to one document
///
/// # Errors
///
/// Returns an error when the query does not compile or fails at run time.
pub fn jmes_path(data: &JsonValue, query: &str) -> Result<JsonValue> {
    let expression = compile(query)?;
    search(&expression, data)
}

/// Apply a `JMESPath` query to each element of a list independently
///
/// The query is compiled once per call.
///
/// # Errors
///
/// Returns an error when the query does not compile or fails on any element.
pub fn jmes_path_map(items: &[JsonValue], query: &str) -> Result<Vec<JsonValue>> {
    let expression = compile(query)?;
    items.iter().map(|item| search(&expression, item)).collect()
}

fn compile(query: &str) -> Result<Expression<'static>> {
    jmespath::compile(query).map_err(|e| app_err!("invalid JMESPath query '{query}': {e}"))
}

fn search(expression: &Expression<'_>, data: &JsonValue) -> Result<JsonValue> {
    let result = expression
        .search(data)
        .map_err(|e| app_err!("unable to evaluate JMESPath query: {e}"))?;
    serde_json::to_value(&*result).map_err(|e| app_err!("unable to convert JMESPath result: {e}"))
}
