use derive_setters::Setters;
use url::Url;

use crate::HttpConfig;

pub const DEFAULT_GRAPH_ENDPOINT_URL: &str = "https://graph.facebook.com/";
pub const DEFAULT_READ_ONLY_ENDPOINT_URL: &str = "https://api-read.facebook.com/method/";
pub const DEFAULT_VIDEO_ENDPOINT_URL: &str = "https://graph-video.facebook.com/";

/// Everything a client is bound to at construction time.
#[derive(Clone, PartialEq, Setters)]
#[setters(strip_option, into)]
pub struct GraphConfig {
    pub graph_endpoint_url: Url,
    /// Host of the deprecated REST method endpoint used by legacy queries
    pub read_only_endpoint_url: Url,
    /// Host that receives publishes to `.../videos` connections
    pub video_endpoint_url: Url,
    pub access_token: Option<String>,
    /// When set together with an access token, every request carries an
    /// `appsecret_proof`
    pub app_secret: Option<String>,
    /// Send deletes as `POST` with `method=delete` instead of HTTP `DELETE`
    pub http_delete_fallback: bool,
    pub user_agent: String,
    pub http: HttpConfig,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            graph_endpoint_url: Url::parse(DEFAULT_GRAPH_ENDPOINT_URL).unwrap(),
            read_only_endpoint_url: Url::parse(DEFAULT_READ_ONLY_ENDPOINT_URL).unwrap(),
            video_endpoint_url: Url::parse(DEFAULT_VIDEO_ENDPOINT_URL).unwrap(),
            access_token: None,
            app_secret: None,
            http_delete_fallback: false,
            user_agent: format!("graph-client/{}", env!("CARGO_PKG_VERSION")),
            http: HttpConfig::default(),
        }
    }
}

impl std::fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("GraphConfig")
            .field("graph_endpoint_url", &self.graph_endpoint_url.as_str())
            .field("read_only_endpoint_url", &self.read_only_endpoint_url.as_str())
            .field("video_endpoint_url", &self.video_endpoint_url.as_str())
            .field("access_token", &redact(&self.access_token))
            .field("app_secret", &redact(&self.app_secret))
            .field("http_delete_fallback", &self.http_delete_fallback)
            .field("user_agent", &self.user_agent)
            .field("http", &self.http)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_output_redacts_credentials() {
        let fixture = GraphConfig::default()
            .access_token("user-token")
            .app_secret("app-secret");

        let actual = format!("{fixture:?}");

        assert!(actual.contains("[REDACTED]"));
        assert!(!actual.contains("user-token"));
        assert!(!actual.contains("app-secret"));
    }
}
