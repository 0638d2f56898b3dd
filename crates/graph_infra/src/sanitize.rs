use url::Url;

/// Query parameters whose values must never reach the logs.
const SENSITIVE_PARAMETERS: [&str; 5] = [
    "access_token",
    "client_secret",
    "appsecret_proof",
    "input_token",
    "fb_exchange_token",
];

/// Renders `url` with the values of credential-bearing query parameters
/// replaced by `REDACTED`.
pub fn sanitize_url(url: &Url) -> String {
    if url.query().is_none() {
        return url.to_string();
    }

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in url.query_pairs() {
        if SENSITIVE_PARAMETERS.contains(&name.as_ref()) {
            serializer.append_pair(&name, "REDACTED");
        } else {
            serializer.append_pair(&name, &value);
        }
    }

    let mut sanitized = url.clone();
    sanitized.set_query(Some(&serializer.finish()));
    sanitized.to_string()
}

/// Formats HTTP request/response context for logging and error reporting
pub fn format_http_context(status: Option<u16>, method: &str, url: &Url) -> String {
    let url = sanitize_url(url);
    if let Some(status) = status {
        format!("{status} {method} {url}")
    } else {
        format!("{method} {url}")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_sanitize_url_redacts_credentials() {
        let fixture = Url::parse(
            "https://graph.example.com/me?fields=id&access_token=secret&appsecret_proof=abc",
        )
        .unwrap();

        let actual = sanitize_url(&fixture);
        let expected = "https://graph.example.com/me?fields=id&access_token=REDACTED&appsecret_proof=REDACTED";
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_sanitize_url_without_query() {
        let fixture = Url::parse("https://graph.example.com/me").unwrap();
        assert_eq!(sanitize_url(&fixture), "https://graph.example.com/me");
    }

    #[test]
    fn test_format_http_context() {
        let fixture = Url::parse("https://graph.example.com/me?access_token=t").unwrap();
        assert_eq!(
            format_http_context(Some(400), "GET", &fixture),
            "400 GET https://graph.example.com/me?access_token=REDACTED"
        );
    }
}
