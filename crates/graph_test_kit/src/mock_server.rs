use mockito::{Matcher, Mock, Server, ServerGuard};

/// A local HTTP server standing in for the Graph API endpoints.
pub struct MockGraphServer {
    server: ServerGuard,
}

fn url_encoded(pairs: &[(&str, &str)]) -> Matcher {
    Matcher::AllOf(
        pairs
            .iter()
            .map(|(name, value)| Matcher::UrlEncoded(name.to_string(), value.to_string()))
            .collect(),
    )
}

impl MockGraphServer {
    pub async fn new() -> Self {
        Self { server: Server::new_async().await }
    }

    /// Base URL with a trailing slash, usable as an endpoint URL.
    pub fn url(&self) -> String {
        format!("{}/", self.server.url())
    }

    /// Access to the underlying server for mocks that need custom matchers.
    pub fn server(&mut self) -> &mut ServerGuard {
        &mut self.server
    }

    /// Mocks a `GET path` whose query contains every pair in `query`.
    pub async fn mock_get(
        &mut self,
        path: &str,
        query: &[(&str, &str)],
        status: usize,
        body: &str,
    ) -> Mock {
        self.server
            .mock("GET", path)
            .match_query(url_encoded(query))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// Mocks a form-encoded `POST path` whose body contains every pair in
    /// `form`.
    pub async fn mock_post(
        &mut self,
        path: &str,
        form: &[(&str, &str)],
        status: usize,
        body: &str,
    ) -> Mock {
        self.server
            .mock("POST", path)
            .match_body(url_encoded(form))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    pub async fn mock_delete(
        &mut self,
        path: &str,
        query: &[(&str, &str)],
        status: usize,
        body: &str,
    ) -> Mock {
        self.server
            .mock("DELETE", path)
            .match_query(url_encoded(query))
            .with_status(status)
            .with_body(body)
            .create_async()
            .await
    }
}
