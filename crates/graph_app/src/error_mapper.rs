use graph_domain::{ApiError, Error, GraphErrorDetails, Result, WebResponse};
use graph_infra::format_http_context;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use url::Url;

/// Statuses the Graph API answers with; anything else is a transport-level
/// failure regardless of the body.
const EXPECTED_STATUSES: [u16; 6] = [200, 400, 401, 403, 404, 500];

const OAUTH_ERROR_TYPES: [&str; 2] = ["OAuthException", "OAuthAccessTokenException"];
const QUERY_PARSE_ERROR_TYPE: &str = "QueryParseException";

#[derive(Debug, Deserialize)]
struct LegacyError {
    error_code: i64,
    #[serde(default)]
    error_msg: Option<String>,
}

/// Classifies a Graph error envelope by its `type`.
pub fn map_graph_error(details: GraphErrorDetails) -> ApiError {
    match details.error_type.as_deref() {
        Some(kind) if OAUTH_ERROR_TYPES.contains(&kind) => ApiError::OAuth(details),
        Some(QUERY_PARSE_ERROR_TYPE) => ApiError::QueryParse(details),
        _ => ApiError::Graph(details),
    }
}

/// Extracts the error carried by a response body, if any.
fn error_from_body(body: &str, status: u16) -> Option<ApiError> {
    let value: Value = serde_json::from_str(body.trim()).ok()?;
    let object = value.as_object()?;

    if let Some(error) = object.get("error").filter(|error| error.is_object()) {
        let mut details: GraphErrorDetails =
            serde_json::from_value(error.clone()).unwrap_or_default();
        details.http_status = Some(status);
        return Some(map_graph_error(details));
    }

    if object.contains_key("error_code") {
        let legacy: LegacyError = serde_json::from_value(value).ok()?;
        return Some(ApiError::ResponseStatus {
            code: legacy.error_code,
            message: legacy.error_msg.unwrap_or_default(),
        });
    }

    None
}

/// Turns a raw response into its body, or the error it represents.
pub fn check_response(response: WebResponse, method: &str, url: &Url) -> Result<String> {
    let WebResponse { status, body } = response;

    if !EXPECTED_STATUSES.contains(&status) {
        warn!(status = status, context = %format_http_context(Some(status), method, url), "Unexpected HTTP status");
        return Err(Error::network(
            format!("Graph API request failed: {}", format_http_context(Some(status), method, url)),
            Some(status),
        ));
    }

    if let Some(error) = error_from_body(&body, status) {
        warn!(error = %error, context = %format_http_context(Some(status), method, url), "Graph API returned an error");
        return Err(error.into());
    }

    if status != 200 {
        return Err(Error::network(
            format!("Graph API request failed: {}", format_http_context(Some(status), method, url)),
            Some(status),
        ));
    }

    Ok(body)
}
