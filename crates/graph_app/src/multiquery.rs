use serde::Deserialize;
use serde_json::{Map, Value};

/// One named result set of a multiquery response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MultiqueryResult {
    pub name: String,
    #[serde(default)]
    pub fql_result_set: Value,
}

/// Reshapes `[{"name": .., "fql_result_set": ..}, ..]` into
/// `{name: result_set, ..}` so it decodes into a caller container keyed by
/// query name. A repeated name keeps the last result set.
pub fn reshape(results: Vec<MultiqueryResult>) -> Value {
    let object: Map<String, Value> = results
        .into_iter()
        .map(|result| (result.name, result.fql_result_set))
        .collect();
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_reshape_keys_result_sets_by_name() {
        let fixture: Vec<MultiqueryResult> = serde_json::from_value(json!([
            {"name": "users", "fql_result_set": [{"uid": 1}]},
            {"name": "likes", "fql_result_set": []}
        ]))
        .unwrap();

        let actual = reshape(fixture);
        let expected = json!({"users": [{"uid": 1}], "likes": []});
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_reshape_empty() {
        assert_eq!(reshape(vec![]), json!({}));
    }
}
