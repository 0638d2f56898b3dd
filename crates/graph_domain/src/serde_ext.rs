//! Deserializers for Graph API fields whose JSON type varies between
//! endpoints: ids arrive as numbers or strings, and timestamps sometimes as
//! numeric strings.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads an optional integer from a number or a numeric string. Any other
/// value yields `None` instead of failing the whole document.
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(number)) => number.as_i64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    })
}

/// Reads an optional identifier that may be encoded as a JSON number or
/// string.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number identifier, found {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Fixture {
        #[serde(default, deserialize_with = "lenient_i64")]
        count: Option<i64>,
        #[serde(default, deserialize_with = "string_or_number")]
        id: Option<String>,
    }

    #[test]
    fn test_lenient_i64_variants() {
        let actual: Vec<Option<i64>> = [
            r#"{"count": 7}"#,
            r#"{"count": "8"}"#,
            r#"{"count": "soon"}"#,
            r#"{"count": null}"#,
            r#"{}"#,
        ]
        .iter()
        .map(|json| serde_json::from_str::<Fixture>(json).unwrap().count)
        .collect();

        assert_eq!(actual, vec![Some(7), Some(8), None, None, None]);
    }

    #[test]
    fn test_string_or_number_accepts_large_numeric_ids() {
        let actual: Fixture = serde_json::from_str(r#"{"id": 138483919580948}"#).unwrap();
        assert_eq!(actual.id, Some("138483919580948".to_string()));
    }

    #[test]
    fn test_string_or_number_rejects_objects() {
        let actual = serde_json::from_str::<Fixture>(r#"{"id": {"nested": 1}}"#);
        assert!(actual.is_err());
    }
}
