use derive_more::From;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Details carried by a Graph API error envelope
/// (`{"error": {"message": .., "type": .., "code": ..}}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphErrorDetails {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default, rename = "error_subcode")]
    pub subcode: Option<i64>,
    #[serde(default, rename = "error_user_title")]
    pub user_title: Option<String>,
    #[serde(default, rename = "error_user_msg")]
    pub user_message: Option<String>,
    #[serde(default)]
    pub fbtrace_id: Option<String>,
    #[serde(skip)]
    pub http_status: Option<u16>,
}

impl std::fmt::Display for GraphErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.error_type.as_deref().unwrap_or("UnknownError"),
            self.message.as_deref().unwrap_or("no message")
        )?;
        if let Some(code) = self.code {
            write!(f, " (code {code}")?;
            if let Some(subcode) = self.subcode {
                write!(f, ", subcode {subcode}")?;
            }
            write!(f, ")")?;
        }
        if let Some(status) = self.http_status {
            write!(f, " [HTTP {status}]")?;
        }
        Ok(())
    }
}

/// The reason a remote call failed.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error talking to the Graph API: {message}")]
    Network {
        message: String,
        status: Option<u16>,
    },

    #[error("OAuth error: {0}")]
    OAuth(GraphErrorDetails),

    #[error("Query parse error: {0}")]
    QueryParse(GraphErrorDetails),

    #[error("Graph API error: {0}")]
    Graph(GraphErrorDetails),

    #[error("Legacy API error {code}: {message}")]
    ResponseStatus { code: i64, message: String },

    #[error("Unable to map JSON response: {0}")]
    JsonMapping(String),
}

impl ApiError {
    /// HTTP status of the failed response, when one was received.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ApiError::Network { status, .. } => *status,
            ApiError::OAuth(details) | ApiError::QueryParse(details) | ApiError::Graph(details) => {
                details.http_status
            }
            ApiError::ResponseStatus { .. } | ApiError::JsonMapping(_) => None,
        }
    }
}

#[derive(Debug, Error, From)]
pub enum Error {
    #[error(transparent)]
    Api(ApiError),

    #[error("Unable to parse signed request: {0}")]
    #[from(skip)]
    SignedRequestParsing(String),

    #[error("Signed request verification failed: {0}")]
    #[from(skip)]
    SignedRequestVerification(String),

    #[error("Invalid argument: {0}")]
    #[from(skip)]
    InvalidArgument(String),

    #[error("Illegal state: {0}")]
    #[from(skip)]
    IllegalState(String),
}

impl Error {
    pub fn network(message: impl Into<String>, status: Option<u16>) -> Self {
        Error::Api(ApiError::Network { message: message.into(), status })
    }

    pub fn json_mapping(message: impl Into<String>) -> Self {
        Error::Api(ApiError::JsonMapping(message.into()))
    }

    /// Returns the underlying API failure for remote-call errors.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(error) => Some(error),
            _ => None,
        }
    }
}

pub type Result<A> = std::result::Result<A, Error>;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_graph_error_details_display() {
        let fixture = GraphErrorDetails {
            message: Some("Invalid OAuth access token.".to_string()),
            error_type: Some("OAuthException".to_string()),
            code: Some(190),
            subcode: Some(463),
            http_status: Some(400),
            ..Default::default()
        };

        let actual = fixture.to_string();
        let expected = "OAuthException: Invalid OAuth access token. (code 190, subcode 463) [HTTP 400]";
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_api_error_converts_into_umbrella_kind() {
        let actual: Error = ApiError::JsonMapping("bad".to_string()).into();
        assert!(matches!(actual.as_api(), Some(ApiError::JsonMapping(_))));
    }

    #[test]
    fn test_http_status_is_exposed() {
        let fixture = Error::network("boom", Some(502));
        let actual = fixture.as_api().and_then(ApiError::http_status);
        assert_eq!(actual, Some(502));
    }
}
