use super::ExtensionFunction;
use crate::Result;
use crate::bridge::to_native;
use cel_interpreter::Value;
use ohno::{app_err, bail};
use serde_json::Value as JsonValue;

/// The arguments of one extension-function call, method receiver first
#[derive(Debug)]
pub struct CallArgs<'a> {
    function: ExtensionFunction,
    args: &'a [Value],
}

impl<'a> CallArgs<'a> {
    /// Wrap the arguments after checking their count against the function's arity
    ///
    /// # Errors
    ///
    /// Returns an error when too few or too many arguments were passed.
    pub fn new(function: ExtensionFunction, args: &'a [Value]) -> Result<Self> {
        let (min, max) = function.arity();
        if args.len() < min || args.len() > max {
            let expected = if min == max { min.to_string() } else { format!("{min} to {max}") };
            bail!("expected {expected} argument(s) but got {}", args.len());
        }

        Ok(Self { function, args })
    }

    pub const fn function(&self) -> ExtensionFunction {
        self.function
    }

    pub fn value(&self, index: usize) -> Result<&'a Value> {
        self.args.get(index).ok_or_else(|| app_err!("missing argument {}", index + 1))
    }

    /// An optional trailing argument; an explicit `null` counts as absent
    pub fn optional(&self, index: usize) -> Option<&'a Value> {
        self.args.get(index).filter(|value| !matches!(value, Value::Null))
    }

    pub fn string(&self, index: usize) -> Result<&'a str> {
        match self.value(index)? {
            Value::String(s) => Ok(s.as_str()),
            other => bail!("argument {} must be a string, found {}", index + 1, type_name(other)),
        }
    }

    /// A string argument, or `None` for `null`
    pub fn optional_string(&self, index: usize) -> Result<Option<&'a str>> {
        match self.optional(index) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => bail!("argument {} must be a string or null, found {}", index + 1, type_name(other)),
        }
    }

    pub fn list(&self, index: usize) -> Result<&'a [Value]> {
        match self.value(index)? {
            Value::List(items) => Ok(items.as_slice()),
            other => bail!("argument {} must be a list, found {}", index + 1, type_name(other)),
        }
    }

    /// An argument bridged to native JSON
    pub fn native(&self, index: usize) -> Result<JsonValue> {
        to_native(self.value(index)?)
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::List(_) => "list",
        Value::Map(_) => "map",
        Value::Function(..) => "function",
        Value::Int(_) => "int",
        Value::UInt(_) => "uint",
        Value::Float(_) => "double",
        Value::String(_) => "string",
        Value::Bytes(_) => "bytes",
        Value::Bool(_) => "bool",
        Value::Duration(_) => "duration",
        Value::Timestamp(_) => "timestamp",
        Value::Null => "null",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::string_value;

    #[test]
    fn test_arity_checked() {
        let args = [string_value("a")];
        let err = CallArgs::new(ExtensionFunction::Glob, &args).unwrap_err();
        assert!(err.to_string().contains("expected 2 argument(s) but got 1"));

        let args = [string_value("https://example.com/a.json"), string_value("json"), Value::Null];
        let err = CallArgs::new(ExtensionFunction::ValueFrom, &args).unwrap_err();
        assert!(err.to_string().contains("expected 1 to 2"));
    }

    #[test]
    fn test_typed_accessors() {
        let args = [string_value("text"), Value::Int(3)];
        let call = CallArgs::new(ExtensionFunction::Glob, &args).unwrap();
        assert_eq!(call.string(0).unwrap(), "text");

        let err = call.string(1).unwrap_err();
        assert!(err.to_string().contains("argument 2 must be a string, found int"));

        let err = call.list(0).unwrap_err();
        assert!(err.to_string().contains("must be a list"));
    }

    #[test]
    fn test_optional_treats_null_as_absent() {
        let args = [string_value("https://example.com/a"), Value::Null];
        let call = CallArgs::new(ExtensionFunction::ValueFrom, &args).unwrap();
        assert!(call.optional(1).is_none());
        assert_eq!(call.optional_string(1).unwrap(), None);
        assert!(call.optional(5).is_none());
    }
}
