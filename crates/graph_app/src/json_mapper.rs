use graph_domain::{Error, JsonMapper, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

const MAX_BODY_PREVIEW: usize = 200;

/// serde_json-backed [`JsonMapper`] aware of Graph API response quirks.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultJsonMapper;

fn preview(json: &str) -> String {
    if json.len() <= MAX_BODY_PREVIEW {
        return json.to_string();
    }
    let end = (0..=MAX_BODY_PREVIEW)
        .rev()
        .find(|index| json.is_char_boundary(*index))
        .unwrap_or(0);
    format!("{}...", &json[..end])
}

fn mapping_error(error: serde_json::Error, json: &str) -> Error {
    Error::json_mapping(format!("{error} while decoding '{}'", preview(json)))
}

impl JsonMapper for DefaultJsonMapper {
    fn to_object<T: DeserializeOwned>(&self, json: &str) -> Result<T> {
        let json = json.trim();
        if json == "false" {
            return Err(Error::json_mapping(
                "Graph API returned 'false'; the object may not exist or is not visible with \
                 the current access token",
            ));
        }
        serde_json::from_str(json).map_err(|e| mapping_error(e, json))
    }

    fn to_list<T: DeserializeOwned>(&self, json: &str) -> Result<Vec<T>> {
        let json = json.trim();
        let value: Value = serde_json::from_str(json).map_err(|e| mapping_error(e, json))?;

        let array = match value {
            Value::Array(_) => value,
            // Objects keep document order, so the fallback is the first array
            // field as written.
            Value::Object(mut object) => {
                let key = if object.get("data").is_some_and(Value::is_array) {
                    Some("data".to_string())
                } else {
                    object
                        .iter()
                        .find(|(_, field)| field.is_array())
                        .map(|(name, _)| name.clone())
                };
                key.and_then(|key| object.remove(&key)).ok_or_else(|| {
                    Error::json_mapping(format!(
                        "Expected a JSON array or an object wrapping one, got '{}'",
                        preview(json)
                    ))
                })?
            }
            _ => {
                return Err(Error::json_mapping(format!(
                    "Expected a JSON array, got '{}'",
                    preview(json)
                )));
            }
        };

        serde_json::from_value(array).map_err(|e| mapping_error(e, json))
    }

    fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        serde_json::to_string(value)
            .map_err(|e| Error::json_mapping(format!("Unable to encode value as JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use graph_domain::ApiError;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Deserialize)]
    struct User {
        id: String,
        name: String,
    }

    fn fixture_user(id: &str, name: &str) -> User {
        User { id: id.to_string(), name: name.to_string() }
    }

    #[test]
    fn test_to_object() {
        let actual: User = DefaultJsonMapper
            .to_object(r#"{"id":"4","name":"Mark","extra":true}"#)
            .unwrap();
        assert_eq!(actual, fixture_user("4", "Mark"));
    }

    #[test]
    fn test_to_object_false_is_a_mapping_error() {
        let actual = DefaultJsonMapper.to_object::<User>("false");
        assert!(matches!(
            actual,
            Err(Error::Api(ApiError::JsonMapping(_)))
        ));
    }

    #[test]
    fn test_to_list_from_bare_array() {
        let actual: Vec<User> = DefaultJsonMapper
            .to_list(r#"[{"id":"1","name":"A"},{"id":"2","name":"B"}]"#)
            .unwrap();
        assert_eq!(actual, vec![fixture_user("1", "A"), fixture_user("2", "B")]);
    }

    #[test]
    fn test_to_list_from_data_wrapper() {
        let actual: Vec<User> = DefaultJsonMapper
            .to_list(r#"{"paging":{"next":"x"},"data":[{"id":"1","name":"A"}]}"#)
            .unwrap();
        assert_eq!(actual, vec![fixture_user("1", "A")]);
    }

    #[test]
    fn test_to_list_from_other_array_field() {
        let actual: Vec<User> = DefaultJsonMapper
            .to_list(r#"{"results":[{"id":"9","name":"Z"}]}"#)
            .unwrap();
        assert_eq!(actual, vec![fixture_user("9", "Z")]);
    }

    #[test]
    fn test_to_list_takes_first_array_field_in_document_order() {
        let actual: Vec<User> = DefaultJsonMapper
            .to_list(r#"{"zeta":[{"id":"1","name":"Z"}],"alpha":[{"id":"2","name":"A"}]}"#)
            .unwrap();
        assert_eq!(actual, vec![fixture_user("1", "Z")]);
    }

    #[test]
    fn test_to_list_rejects_scalars() {
        let actual = DefaultJsonMapper.to_list::<User>("42");
        assert!(actual.is_err());
    }

    #[test]
    fn test_to_json() {
        let fixture: BTreeMap<&str, &str> = [("b", "2"), ("a", "1")].into();
        let actual = DefaultJsonMapper.to_json(&fixture).unwrap();
        assert_eq!(actual, r#"{"a":"1","b":"2"}"#);
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let fixture = "é".repeat(150);
        let actual = preview(&fixture);
        assert!(actual.ends_with("..."));
        assert!(actual.len() <= MAX_BODY_PREVIEW + 3);
    }
}
