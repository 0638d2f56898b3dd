use anyhow::Context as _;
use url::Url;

/// Joins an endpoint base URL with a relative Graph path, validating the
/// path for security
///
/// # Errors
///
/// Returns an error if the path contains forbidden patterns or if the joined
/// URL cannot be parsed
pub fn join_url(base_url: &Url, path: &str) -> anyhow::Result<Url> {
    if path.contains("://") || path.contains("..") {
        anyhow::bail!("Invalid path '{path}': Contains forbidden patterns");
    }

    // A base without a trailing slash would lose its last segment on join
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }

    let path = path.trim_start_matches('/');
    base.join(path)
        .with_context(|| format!("Failed to append {path} to base URL: {base_url}"))
}

/// True when publishing to `connection` should go to the video endpoint.
pub fn is_video_connection(connection: &str) -> bool {
    connection
        .split('?')
        .next()
        .is_some_and(|path| path.trim_end_matches('/').ends_with("/videos"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_join_url_keeps_base_path() {
        let fixture = Url::parse("https://api-read.example.com/method").unwrap();
        let actual = join_url(&fixture, "fql.query").unwrap();
        assert_eq!(actual.as_str(), "https://api-read.example.com/method/fql.query");
    }

    #[test]
    fn test_join_url_strips_leading_slash() {
        let fixture = Url::parse("https://graph.example.com/").unwrap();
        let actual = join_url(&fixture, "/me/feed").unwrap();
        assert_eq!(actual.as_str(), "https://graph.example.com/me/feed");
    }

    #[test]
    fn test_join_url_rejects_traversal_and_absolute_urls() {
        let fixture = Url::parse("https://graph.example.com/").unwrap();
        assert!(join_url(&fixture, "../admin").is_err());
        assert!(join_url(&fixture, "https://evil.example.com/").is_err());
    }

    #[test]
    fn test_is_video_connection() {
        assert!(is_video_connection("me/videos"));
        assert!(is_video_connection("12345/videos/"));
        assert!(!is_video_connection("me/photos"));
        assert!(!is_video_connection("videos"));
    }
}
