use derive_setters::Setters;
use serde::{Deserialize, Serialize};

use crate::parameter::to_query_string;
use crate::{Error, Parameter, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchHeader {
    pub name: String,
    pub value: String,
}

impl BatchHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// One operation inside a batch call.
///
/// `parameters` are appended to the relative URL as a query string; `body`
/// parameters are form-encoded into the sub-request body (used with
/// [`HttpMethod::Post`]).
#[derive(Debug, Clone, PartialEq, Setters)]
#[setters(strip_option, into)]
pub struct BatchRequest {
    #[setters(skip)]
    relative_url: String,
    method: HttpMethod,
    headers: Vec<BatchHeader>,
    parameters: Vec<Parameter>,
    body: Vec<Parameter>,
    /// Name other requests can reference via JSONPath expressions
    name: Option<String>,
    depends_on: Option<String>,
    /// Comma-separated attachment file names used by this request
    attached_files: Option<String>,
    omit_response_on_success: Option<bool>,
}

#[derive(Debug, Serialize)]
struct WireBatchRequest<'a> {
    method: HttpMethod,
    relative_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    headers: Option<&'a [BatchHeader]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    depends_on: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attached_files: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    omit_response_on_success: Option<bool>,
}

impl BatchRequest {
    pub fn new(relative_url: impl Into<String>) -> Self {
        Self {
            relative_url: relative_url.into(),
            method: HttpMethod::default(),
            headers: Vec::new(),
            parameters: Vec::new(),
            body: Vec::new(),
            name: None,
            depends_on: None,
            attached_files: None,
            omit_response_on_success: None,
        }
    }

    pub fn get_relative_url(&self) -> &str {
        &self.relative_url
    }

    pub fn get_method(&self) -> HttpMethod {
        self.method
    }

    /// Relative URL including the encoded query parameters.
    pub fn full_relative_url(&self) -> String {
        if self.parameters.is_empty() {
            return self.relative_url.clone();
        }
        let separator = if self.relative_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}{}",
            self.relative_url,
            separator,
            to_query_string(&self.parameters)
        )
    }

    /// JSON value of this request as it appears in the `batch` parameter.
    pub fn to_wire_value(&self) -> Result<serde_json::Value> {
        let wire = WireBatchRequest {
            method: self.method,
            relative_url: self.full_relative_url(),
            body: (!self.body.is_empty()).then(|| to_query_string(&self.body)),
            headers: (!self.headers.is_empty()).then_some(self.headers.as_slice()),
            name: self.name.as_deref(),
            depends_on: self.depends_on.as_deref(),
            attached_files: self.attached_files.as_deref(),
            omit_response_on_success: self.omit_response_on_success,
        };
        serde_json::to_value(wire)
            .map_err(|e| Error::json_mapping(format!("Unable to encode batch request: {e}")))
    }
}

/// Response to one batch sub-request. `body` is the raw JSON text the
/// sub-request produced, absent when the response was omitted on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub code: u16,
    #[serde(default)]
    pub headers: Vec<BatchHeader>,
    #[serde(default)]
    pub body: Option<String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_get_request_wire_format() {
        let fixture = BatchRequest::new("me/friends")
            .parameters(vec![Parameter::new("limit", "10")])
            .name("friends");

        let actual = fixture.to_wire_value().unwrap();
        let expected = json!({
            "method": "GET",
            "relative_url": "me/friends?limit=10",
            "name": "friends"
        });
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_post_request_wire_format() {
        let fixture = BatchRequest::new("me/photos")
            .method(HttpMethod::Post)
            .body(vec![Parameter::new("message", "hi there")])
            .headers(vec![BatchHeader::new("X-Custom", "1")])
            .attached_files("photo.png")
            .depends_on("first")
            .omit_response_on_success(false);

        let actual = fixture.to_wire_value().unwrap();
        let expected = json!({
            "method": "POST",
            "relative_url": "me/photos",
            "body": "message=hi+there",
            "headers": [{"name": "X-Custom", "value": "1"}],
            "depends_on": "first",
            "attached_files": "photo.png",
            "omit_response_on_success": false
        });
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_parameters_extend_existing_query() {
        let fixture = BatchRequest::new("me?fields=id").parameters(vec![Parameter::new("limit", "1")]);
        assert_eq!(fixture.full_relative_url(), "me?fields=id&limit=1");
    }

    #[test]
    fn test_batch_response_without_body() {
        let actual: BatchResponse = serde_json::from_str(r#"{"code": 200}"#).unwrap();
        let expected = BatchResponse { code: 200, headers: vec![], body: None };
        assert_eq!(actual, expected);
    }
}
