use std::collections::HashSet;

use futures::Stream;
use graph_domain::{Connection, Result};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::GraphClient;

/// Yields `first` and then every following page of the connection, stopping
/// when a page has no next link or links back to a page already fetched.
pub fn connection_pages<'a, C, T>(
    client: &'a C,
    first: Connection<T>,
) -> impl Stream<Item = Result<Connection<T>>> + Send + 'a
where
    C: GraphClient,
    T: DeserializeOwned + Send + 'static,
{
    async_stream::try_stream! {
        let mut visited = HashSet::new();
        let mut next = first.next_page_url().map(str::to_string);
        yield first;

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) {
                debug!("Connection page links back to a visited page, stopping");
                break;
            }

            let page: Connection<T> = client.fetch_connection_page(&url).await?;
            debug!(count = page.data.len(), "Fetched connection page");
            next = page.next_page_url().map(str::to_string);
            yield page;
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;
    use graph_domain::{GraphConfig, Paging};
    use graph_test_kit::MockGraphServer;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use url::Url;

    use super::*;
    use crate::DefaultGraphClient;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Post {
        id: String,
    }

    fn fixture_client(server: &MockGraphServer) -> DefaultGraphClient {
        let config = GraphConfig::default()
            .graph_endpoint_url(Url::parse(&server.url()).unwrap())
            .access_token("user-token");
        DefaultGraphClient::new(config).unwrap()
    }

    fn ids(pages: &[Connection<Post>]) -> Vec<Vec<&str>> {
        pages
            .iter()
            .map(|page| page.data.iter().map(|post| post.id.as_str()).collect())
            .collect()
    }

    #[tokio::test]
    async fn test_connection_pages_follow_next_links() -> anyhow::Result<()> {
        let mut server = MockGraphServer::new().await;
        let base = server.url();
        server
            .mock_get(
                "/me/feed",
                &[("after", "2")],
                200,
                &format!(r#"{{"data":[{{"id":"2"}}],"paging":{{"next":"{base}me/feed?after=3"}}}}"#),
            )
            .await;
        server
            .mock_get("/me/feed", &[("after", "3")], 200, r#"{"data":[{"id":"3"}],"paging":{}}"#)
            .await;
        let client = fixture_client(&server);
        let first = Connection::new(
            vec![Post { id: "1".to_string() }],
            Some(Paging { previous: None, next: Some(format!("{base}me/feed?after=2")) }),
        );

        let actual: Vec<Connection<Post>> = connection_pages(&client, first).try_collect().await?;

        assert_eq!(ids(&actual), vec![vec!["1"], vec!["2"], vec!["3"]]);
        Ok(())
    }

    #[tokio::test]
    async fn test_connection_pages_stop_on_cycle() -> anyhow::Result<()> {
        let mut server = MockGraphServer::new().await;
        let base = server.url();
        let mock = server
            .mock_get(
                "/me/feed",
                &[("after", "2")],
                200,
                &format!(r#"{{"data":[{{"id":"2"}}],"paging":{{"next":"{base}me/feed?after=2"}}}}"#),
            )
            .await;
        let client = fixture_client(&server);
        let first = Connection::new(
            vec![Post { id: "1".to_string() }],
            Some(Paging { previous: None, next: Some(format!("{base}me/feed?after=2")) }),
        );

        let actual: Vec<Connection<Post>> = connection_pages(&client, first).try_collect().await?;

        mock.assert_async().await;
        assert_eq!(ids(&actual), vec![vec!["1"], vec!["2"]]);
        Ok(())
    }

    #[tokio::test]
    async fn test_connection_pages_surface_errors() -> anyhow::Result<()> {
        let mut server = MockGraphServer::new().await;
        let base = server.url();
        server
            .mock_get(
                "/me/feed",
                &[],
                400,
                r#"{"error":{"message":"expired","type":"OAuthException","code":190}}"#,
            )
            .await;
        let client = fixture_client(&server);
        let first = Connection::<Post>::new(
            vec![],
            Some(Paging { previous: None, next: Some(format!("{base}me/feed?after=1")) }),
        );

        let actual = connection_pages(&client, first)
            .try_collect::<Vec<_>>()
            .await;

        assert!(actual.is_err());
        Ok(())
    }
}
