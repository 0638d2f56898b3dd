use std::time::Duration;

use anyhow::Context;
use graph_domain::{BinaryAttachment, HttpConfig, TlsBackend, TlsVersion, WebRequestor, WebResponse};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::redirect::Policy;
use reqwest::{Client, Url};
use tracing::debug;

use crate::sanitize::{format_http_context, sanitize_url};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// reqwest-backed [`WebRequestor`].
#[derive(Clone)]
pub struct DefaultWebRequestor {
    client: Client,
    user_agent: HeaderValue,
}

fn to_reqwest_tls(tls: TlsVersion) -> reqwest::tls::Version {
    use reqwest::tls::Version;
    match tls {
        TlsVersion::V1_2 => Version::TLS_1_2,
        TlsVersion::V1_3 => Version::TLS_1_3,
    }
}

impl DefaultWebRequestor {
    pub fn new(config: &HttpConfig, user_agent: &str) -> anyhow::Result<Self> {
        let mut client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .read_timeout(Duration::from_secs(config.read_timeout))
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .redirect(Policy::limited(config.max_redirects))
            .hickory_dns(config.hickory);

        if let Some(version) = config.min_tls_version {
            client = client.min_tls_version(to_reqwest_tls(version));
        }

        if let Some(version) = config.max_tls_version {
            client = client.max_tls_version(to_reqwest_tls(version));
        }

        match config.tls_backend {
            TlsBackend::Rustls => {
                client = client.use_rustls_tls();
            }
            TlsBackend::Default => {}
        }

        let user_agent = HeaderValue::from_str(user_agent)
            .with_context(|| format!("Invalid user agent: {user_agent}"))?;

        Ok(Self {
            client: client.build().context("Failed to build HTTP client")?,
            user_agent,
        })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, self.user_agent.clone());
        headers
    }

    /// Sends the request and collects status and body. Non-success statuses
    /// are returned, not raised; only transport failures are errors.
    async fn execute_request<F>(
        &self,
        method: &str,
        url: &Url,
        request_builder: F,
    ) -> anyhow::Result<WebResponse>
    where
        F: FnOnce(&Client) -> reqwest::RequestBuilder,
    {
        debug!(method = method, url = %sanitize_url(url), "Executing request");

        let response = request_builder(&self.client)
            .headers(self.headers())
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format_http_context(None, method, url))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format_http_context(Some(status), method, url))
            .with_context(|| "Failed to decode response into text")?;

        debug!(
            method = method,
            url = %sanitize_url(url),
            status = status,
            bytes = body.len(),
            "Received response"
        );

        Ok(WebResponse::new(status, body))
    }

    fn multipart_form(attachments: &[BinaryAttachment]) -> anyhow::Result<Form> {
        attachments.iter().try_fold(Form::new(), |form, attachment| -> anyhow::Result<Form> {
            let content_type = attachment.resolved_content_type();
            let part = Part::bytes(attachment.data().to_vec())
                .file_name(attachment.filename().to_string())
                .mime_str(&content_type)
                .with_context(|| format!("Invalid content type: {content_type}"))?;
            Ok(form.part(attachment.filename().to_string(), part))
        })
    }
}

/// Appends already-encoded `parameters` to the query string of `url`.
pub fn with_query(url: &Url, parameters: &str) -> Url {
    let mut url = url.clone();
    if parameters.is_empty() {
        return url;
    }
    let query = match url.query() {
        Some(existing) if !existing.is_empty() => format!("{existing}&{parameters}"),
        _ => parameters.to_string(),
    };
    url.set_query(Some(&query));
    url
}

#[async_trait::async_trait]
impl WebRequestor for DefaultWebRequestor {
    async fn execute_get(&self, url: &Url) -> anyhow::Result<WebResponse> {
        self.execute_request("GET", url, |client| client.get(url.clone()))
            .await
    }

    async fn execute_post(
        &self,
        url: &Url,
        parameters: &str,
        attachments: &[BinaryAttachment],
    ) -> anyhow::Result<WebResponse> {
        if attachments.is_empty() {
            let body = parameters.to_string();
            return self
                .execute_request("POST", url, |client| {
                    client
                        .post(url.clone())
                        .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                        .body(body)
                })
                .await;
        }

        let url = with_query(url, parameters);
        let form = Self::multipart_form(attachments)?;
        self.execute_request("POST", &url, |client| client.post(url.clone()).multipart(form))
            .await
    }

    async fn execute_delete(&self, url: &Url) -> anyhow::Result<WebResponse> {
        self.execute_request("DELETE", url, |client| client.delete(url.clone()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use pretty_assertions::assert_eq;

    use super::*;

    fn fixture_requestor() -> DefaultWebRequestor {
        DefaultWebRequestor::new(&HttpConfig::default(), "graph-test").unwrap()
    }

    #[tokio::test]
    async fn test_get_returns_error_statuses_as_responses() -> anyhow::Result<()> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .match_header("user-agent", "graph-test")
            .with_status(404)
            .with_body(r#"{"error":{"message":"nope"}}"#)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/missing", server.url()))?;
        let actual = fixture_requestor().execute_get(&url).await?;

        mock.assert_async().await;
        assert_eq!(actual, WebResponse::new(404, r#"{"error":{"message":"nope"}}"#));
        Ok(())
    }

    #[tokio::test]
    async fn test_post_sends_form_body() -> anyhow::Result<()> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/me/feed")
            .match_header("content-type", FORM_CONTENT_TYPE)
            .match_body("message=hello&access_token=t")
            .with_status(200)
            .with_body(r#"{"id":"1_2"}"#)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/me/feed", server.url()))?;
        let actual = fixture_requestor()
            .execute_post(&url, "message=hello&access_token=t", &[])
            .await?;

        mock.assert_async().await;
        assert_eq!(actual.status, 200);
        Ok(())
    }

    #[tokio::test]
    async fn test_post_with_attachment_moves_parameters_to_query() -> anyhow::Result<()> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/me/photos")
            .match_query(Matcher::UrlEncoded("message".into(), "cat".into()))
            .match_header("content-type", Matcher::Regex("^multipart/form-data".into()))
            .match_body(Matcher::Regex("filename=\"cat.png\"".into()))
            .with_status(200)
            .with_body(r#"{"id":"3"}"#)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/me/photos", server.url()))?;
        let attachment = BinaryAttachment::new("cat.png", b"not really a png".to_vec())
            .content_type("image/png");
        let actual = fixture_requestor()
            .execute_post(&url, "message=cat", &[attachment])
            .await?;

        mock.assert_async().await;
        assert_eq!(actual.body, r#"{"id":"3"}"#);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete() -> anyhow::Result<()> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/123")
            .with_status(200)
            .with_body("true")
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/123", server.url()))?;
        let actual = fixture_requestor().execute_delete(&url).await?;

        mock.assert_async().await;
        assert_eq!(actual.body, "true");
        Ok(())
    }

    #[tokio::test]
    async fn test_transport_failure_does_not_leak_credentials() {
        let url = Url::parse("http://127.0.0.1:1/unreachable?access_token=secret-token").unwrap();

        let actual = fixture_requestor().execute_get(&url).await;

        let Err(error) = actual else {
            panic!("expected a transport error");
        };
        let message = format!("{error:#}");
        assert!(!message.contains("secret-token"), "{message}");
        assert!(message.contains("access_token=REDACTED"), "{message}");
    }

    #[test]
    fn test_with_query_appends_to_existing_query() {
        let fixture = Url::parse("https://graph.example.com/me?fields=id").unwrap();
        let actual = with_query(&fixture, "limit=1");
        assert_eq!(actual.as_str(), "https://graph.example.com/me?fields=id&limit=1");
    }
}
