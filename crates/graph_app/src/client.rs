use std::collections::BTreeMap;

use graph_domain::{
    AccessToken, BatchRequest, BatchResponse, BinaryAttachment, Connection, DebugTokenInfo,
    JsonMapper, Parameter, QueryEndpoint, Result, WebRequestor,
};
use serde::de::DeserializeOwned;

/// Operations against the Graph API.
///
/// Every operation is a single request/response exchange. Caller parameters
/// must not use the reserved names `access_token`, `method` or `format`; the
/// client adds those itself.
#[async_trait::async_trait]
pub trait GraphClient: Send + Sync {
    type Mapper: JsonMapper;
    type Requestor: WebRequestor;

    /// Fetches a single object, e.g. `me` or a numeric id.
    async fn fetch_object<T>(&self, object: &str, parameters: &[Parameter]) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static;

    /// Fetches several objects in one call. The response is an object keyed
    /// by id, so `T` is usually a map or a struct with one field per id.
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` when `ids` is empty or contains a
    /// blank id.
    async fn fetch_objects<T>(&self, ids: &[&str], parameters: &[Parameter]) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static;

    /// Fetches the first page of a connection such as `me/feed`.
    async fn fetch_connection<T>(
        &self,
        connection: &str,
        parameters: &[Parameter],
    ) -> Result<Connection<T>>
    where
        T: DeserializeOwned + Send + 'static;

    /// Fetches a page by the absolute URL a previous page linked to.
    async fn fetch_connection_page<T>(&self, page_url: &str) -> Result<Connection<T>>
    where
        T: DeserializeOwned + Send + 'static;

    async fn execute_query_on<T>(
        &self,
        endpoint: QueryEndpoint,
        query: &str,
        parameters: &[Parameter],
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static;

    /// Runs several named queries at once; the result decodes into a
    /// container keyed by query name.
    async fn execute_multiquery_on<T>(
        &self,
        endpoint: QueryEndpoint,
        queries: &BTreeMap<String, String>,
        parameters: &[Parameter],
    ) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static;

    async fn execute_fql_query<T>(&self, query: &str, parameters: &[Parameter]) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.execute_query_on(QueryEndpoint::Graph, query, parameters)
            .await
    }

    async fn execute_fql_multiquery<T>(
        &self,
        queries: &BTreeMap<String, String>,
        parameters: &[Parameter],
    ) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.execute_multiquery_on(QueryEndpoint::Graph, queries, parameters)
            .await
    }

    #[deprecated(note = "the REST query endpoint is retired; use `execute_fql_query`")]
    async fn execute_query<T>(&self, query: &str, parameters: &[Parameter]) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.execute_query_on(QueryEndpoint::Legacy, query, parameters)
            .await
    }

    #[deprecated(note = "the REST query endpoint is retired; use `execute_fql_multiquery`")]
    async fn execute_multiquery<T>(
        &self,
        queries: &BTreeMap<String, String>,
        parameters: &[Parameter],
    ) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.execute_multiquery_on(QueryEndpoint::Legacy, queries, parameters)
            .await
    }

    async fn execute_batch(&self, requests: &[BatchRequest]) -> Result<Vec<BatchResponse>> {
        self.execute_batch_with_attachments(requests, &[]).await
    }

    /// Sends all requests in one round trip. The responses have the same
    /// length and order as `requests`.
    async fn execute_batch_with_attachments(
        &self,
        requests: &[BatchRequest],
        attachments: &[BinaryAttachment],
    ) -> Result<Vec<BatchResponse>>;

    async fn publish<T>(&self, connection: &str, parameters: &[Parameter]) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.publish_with_attachment(connection, None, parameters)
            .await
    }

    /// Publishes to a connection, uploading `attachment` as multipart data
    /// when given. Connections ending in `/videos` go to the video endpoint.
    async fn publish_with_attachment<T>(
        &self,
        connection: &str,
        attachment: Option<&BinaryAttachment>,
        parameters: &[Parameter],
    ) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static;

    /// Returns `true` iff the server confirms the deletion.
    async fn delete_object(&self, object: &str, parameters: &[Parameter]) -> Result<bool>;

    /// Exchanges legacy session keys for access tokens, in the same order.
    async fn convert_session_keys_to_access_tokens(
        &self,
        app_id: &str,
        secret_key: &str,
        session_keys: &[&str],
    ) -> Result<Vec<AccessToken>>;

    async fn obtain_app_access_token(&self, app_id: &str, app_secret: &str) -> Result<AccessToken>;

    /// Trades a short-lived token for a long-lived one.
    async fn obtain_extended_access_token(
        &self,
        app_id: &str,
        app_secret: &str,
        access_token: &str,
    ) -> Result<AccessToken>;

    fn obtain_app_secret_proof(&self, access_token: &str, app_secret: &str) -> Result<String>;

    fn parse_signed_request<T>(&self, signed_request: &str, app_secret: &str) -> Result<T>
    where
        T: DeserializeOwned;

    /// Introspects `input_token`. The client's own token must be allowed to
    /// inspect it, typically an app token.
    async fn debug_token(&self, input_token: &str) -> Result<DebugTokenInfo>;

    fn json_mapper(&self) -> &Self::Mapper;

    fn web_requestor(&self) -> &Self::Requestor;
}
