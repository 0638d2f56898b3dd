use serde::Serialize;

use crate::{Error, Result};

/// Parameter names the client adds itself; callers may not supply them.
pub const RESERVED_PARAMETER_NAMES: [&str; 3] = ["access_token", "method", "format"];

/// A named request parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }

    /// Creates a parameter whose value is the JSON encoding of `value`.
    /// Strings are passed through as-is rather than quoted.
    pub fn json<T: Serialize + ?Sized>(name: impl Into<String>, value: &T) -> Result<Self> {
        let encoded = serde_json::to_value(value)
            .map_err(|e| Error::InvalidArgument(format!("Unable to encode parameter value: {e}")))?;
        let value = match encoded {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        };
        Ok(Self::new(name, value))
    }
}

/// Validates caller-supplied parameters: names must be non-blank and not
/// collide with [`RESERVED_PARAMETER_NAMES`].
pub fn verify_parameters(parameters: &[Parameter]) -> Result<()> {
    for parameter in parameters {
        if parameter.name.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "Parameter names must not be blank".to_string(),
            ));
        }
        if RESERVED_PARAMETER_NAMES.contains(&parameter.name.as_str()) {
            return Err(Error::InvalidArgument(format!(
                "Parameter '{}' is reserved and will be added automatically",
                parameter.name
            )));
        }
    }
    Ok(())
}

/// Encodes parameters as `application/x-www-form-urlencoded`, preserving
/// order.
pub fn to_query_string(parameters: &[Parameter]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for parameter in parameters {
        serializer.append_pair(&parameter.name, &parameter.value);
    }
    serializer.finish()
}
