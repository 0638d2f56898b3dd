use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use graph_domain::{
    AccessToken, BatchRequest, BatchResponse, BinaryAttachment, Connection, DebugTokenInfo, Error,
    GraphConfig, HttpMethod, JsonMapper, Parameter, QueryEndpoint, Result, TokenResponse,
    WebRequestor, to_query_string, verify_parameters,
};
use graph_infra::{DefaultWebRequestor, GraphEnvironment, sanitize_url, with_query};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::app_secret_proof::app_secret_proof;
use crate::client::GraphClient;
use crate::error_mapper::check_response;
use crate::json_mapper::DefaultJsonMapper;
use crate::multiquery::{MultiqueryResult, reshape};
use crate::signed_request;
use crate::utils::{is_video_connection, join_url};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Graph,
    ReadOnly,
    Video,
}

/// A call to one of the Graph endpoints before credentials are attached.
struct ApiRequest<'a> {
    method: HttpMethod,
    endpoint: Endpoint,
    path: &'a str,
    parameters: Vec<Parameter>,
    attachments: &'a [BinaryAttachment],
    anonymous: bool,
    legacy: bool,
}

impl<'a> ApiRequest<'a> {
    /// Caller parameters are verified here, before internal ones are added.
    fn new(method: HttpMethod, path: &'a str, parameters: &[Parameter]) -> Result<Self> {
        verify_parameters(parameters)?;
        Ok(Self {
            method,
            endpoint: Endpoint::Graph,
            path,
            parameters: parameters.to_vec(),
            attachments: &[],
            anonymous: false,
            legacy: false,
        })
    }

    fn get(path: &'a str, parameters: &[Parameter]) -> Result<Self> {
        Self::new(HttpMethod::Get, path, parameters)
    }

    fn post(path: &'a str, parameters: &[Parameter]) -> Result<Self> {
        Self::new(HttpMethod::Post, path, parameters)
    }

    fn parameter(mut self, name: &str, value: impl Into<String>) -> Self {
        self.parameters.push(Parameter::new(name, value));
        self
    }

    fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    fn attachments(mut self, attachments: &'a [BinaryAttachment]) -> Self {
        self.attachments = attachments;
        self
    }

    /// Sends no access token; used by calls authenticated with the app secret.
    fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    fn query_endpoint(mut self, endpoint: QueryEndpoint) -> Self {
        if endpoint == QueryEndpoint::Legacy {
            self.endpoint = Endpoint::ReadOnly;
            self.legacy = true;
        }
        self
    }
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

fn network_error(error: anyhow::Error) -> Error {
    Error::network(format!("{error:#}"), None)
}

/// Delete calls answer with `true` or `{"success": true}`.
fn is_confirmed(body: &str) -> bool {
    match serde_json::from_str::<Value>(body.trim()) {
        Ok(Value::Bool(confirmed)) => confirmed,
        Ok(Value::Object(object)) => object
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        _ => false,
    }
}

/// [`GraphClient`] bound to one [`GraphConfig`], talking through a
/// [`WebRequestor`] and decoding with a [`JsonMapper`].
pub struct DefaultGraphClient<W = DefaultWebRequestor, J = DefaultJsonMapper> {
    config: GraphConfig,
    web_requestor: Arc<W>,
    json_mapper: J,
}

impl DefaultGraphClient {
    /// Builds a client with the reqwest transport described by
    /// `config.http`.
    ///
    /// # Errors
    /// Returns `Error::IllegalState` if the HTTP client cannot be built.
    pub fn new(config: GraphConfig) -> Result<Self> {
        let web_requestor = DefaultWebRequestor::new(&config.http, &config.user_agent)
            .map_err(|e| Error::IllegalState(format!("Unable to build HTTP transport: {e:#}")))?;
        Ok(Self::with_parts(config, Arc::new(web_requestor), DefaultJsonMapper))
    }

    /// Builds a client from `GRAPH_*` environment variables and `.env` files
    /// found from the current directory upwards.
    pub fn from_env() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| {
            Error::IllegalState(format!("Unable to resolve the working directory: {e}"))
        })?;
        Self::new(GraphEnvironment::new(cwd).config())
    }
}

impl<W: WebRequestor, J: JsonMapper> DefaultGraphClient<W, J> {
    pub fn with_parts(config: GraphConfig, web_requestor: Arc<W>, json_mapper: J) -> Self {
        Self { config, web_requestor, json_mapper }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    fn base_url(&self, endpoint: Endpoint) -> &Url {
        match endpoint {
            Endpoint::Graph => &self.config.graph_endpoint_url,
            Endpoint::ReadOnly => &self.config.read_only_endpoint_url,
            Endpoint::Video => &self.config.video_endpoint_url,
        }
    }

    async fn make_request(&self, request: ApiRequest<'_>) -> Result<String> {
        let ApiRequest { method, endpoint, path, mut parameters, attachments, anonymous, legacy } =
            request;

        if !anonymous && let Some(access_token) = self.config.access_token.as_deref() {
            parameters.push(Parameter::new("access_token", access_token));
            if let Some(app_secret) = self.config.app_secret.as_deref() {
                parameters.push(Parameter::new(
                    "appsecret_proof",
                    app_secret_proof(access_token, app_secret)?,
                ));
            }
        }
        if legacy {
            parameters.push(Parameter::new("format", "json"));
        }

        let url = join_url(self.base_url(endpoint), path)
            .map_err(|e| Error::InvalidArgument(format!("{e:#}")))?;
        let encoded = to_query_string(&parameters);
        let url = match method {
            HttpMethod::Post => url,
            HttpMethod::Get | HttpMethod::Delete => with_query(&url, &encoded),
        };

        debug!(
            method = method.as_str(),
            url = %sanitize_url(&url),
            attachments = attachments.len(),
            "Sending Graph API request"
        );

        let response = match method {
            HttpMethod::Get => self.web_requestor.execute_get(&url).await,
            HttpMethod::Post => {
                self.web_requestor
                    .execute_post(&url, &encoded, attachments)
                    .await
            }
            HttpMethod::Delete => self.web_requestor.execute_delete(&url).await,
        }
        .map_err(network_error)?;

        check_response(response, method.as_str(), &url)
    }

    /// Token endpoints answer either `access_token=..&expires=..` or a JSON
    /// object.
    fn parse_access_token(&self, body: &str) -> Result<AccessToken> {
        let body = body.trim();
        let token = if body.starts_with('{') {
            self.json_mapper
                .to_object::<TokenResponse>(body)
                .and_then(|response| AccessToken::from_token_response(response, Utc::now()))
        } else {
            AccessToken::from_query_string(body)
        };
        token.map_err(|e| {
            Error::json_mapping(format!("Unable to extract access token from response: {e}"))
        })
    }
}

#[async_trait::async_trait]
impl<W: WebRequestor, J: JsonMapper> GraphClient for DefaultGraphClient<W, J> {
    type Mapper = J;
    type Requestor = W;

    async fn fetch_object<T>(&self, object: &str, parameters: &[Parameter]) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let body = self
            .make_request(ApiRequest::get(object, parameters)?)
            .await?;
        self.json_mapper.to_object(&body)
    }

    async fn fetch_objects<T>(&self, ids: &[&str], parameters: &[Parameter]) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        if ids.is_empty() {
            return Err(Error::InvalidArgument(
                "The list of IDs cannot be empty".to_string(),
            ));
        }
        if ids.iter().any(|id| id.trim().is_empty()) {
            return Err(Error::InvalidArgument(
                "The list of IDs cannot contain blank strings".to_string(),
            ));
        }

        let ids = ids.iter().map(|id| id.trim()).collect::<Vec<_>>().join(",");
        let request = ApiRequest::get("", parameters)?.parameter("ids", ids);
        let body = self.make_request(request).await?;
        self.json_mapper.to_object(&body)
    }

    async fn fetch_connection<T>(
        &self,
        connection: &str,
        parameters: &[Parameter],
    ) -> Result<Connection<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let body = self
            .make_request(ApiRequest::get(connection, parameters)?)
            .await?;
        self.json_mapper.to_object(&body)
    }

    async fn fetch_connection_page<T>(&self, page_url: &str) -> Result<Connection<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let url = Url::parse(page_url)
            .map_err(|e| Error::InvalidArgument(format!("Invalid connection page URL: {e}")))?;
        debug!(url = %sanitize_url(&url), "Fetching connection page");

        let response = self
            .web_requestor
            .execute_get(&url)
            .await
            .map_err(network_error)?;
        let body = check_response(response, HttpMethod::Get.as_str(), &url)?;
        self.json_mapper.to_object(&body)
    }

    async fn execute_query_on<T>(
        &self,
        endpoint: QueryEndpoint,
        query: &str,
        parameters: &[Parameter],
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let request = ApiRequest::get(endpoint.path(false), parameters)?
            .parameter(endpoint.query_parameter(false), query)
            .query_endpoint(endpoint);
        let body = self.make_request(request).await?;
        self.json_mapper.to_list(&body)
    }

    async fn execute_multiquery_on<T>(
        &self,
        endpoint: QueryEndpoint,
        queries: &BTreeMap<String, String>,
        parameters: &[Parameter],
    ) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let request = ApiRequest::get(endpoint.path(true), parameters)?
            .parameter(endpoint.query_parameter(true), self.json_mapper.to_json(queries)?)
            .query_endpoint(endpoint);
        let body = self.make_request(request).await?;

        let results: Vec<MultiqueryResult> = self.json_mapper.to_list(&body)?;
        serde_json::from_value(reshape(results))
            .map_err(|e| Error::json_mapping(format!("Unable to map multiquery results: {e}")))
    }

    async fn execute_batch_with_attachments(
        &self,
        requests: &[BatchRequest],
        attachments: &[BinaryAttachment],
    ) -> Result<Vec<BatchResponse>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        info!(
            count = requests.len(),
            attachments = attachments.len(),
            "Executing batch request"
        );

        let batch = requests
            .iter()
            .map(BatchRequest::to_wire_value)
            .collect::<Result<Vec<_>>>()?;
        let request = ApiRequest::post("", &[])?
            .parameter("batch", self.json_mapper.to_json(&batch)?)
            .parameter("include_headers", "false")
            .attachments(attachments);
        let body = self.make_request(request).await?;

        let responses: Vec<Option<BatchResponse>> = self.json_mapper.to_list(&body)?;
        if responses.len() != requests.len() {
            return Err(Error::json_mapping(format!(
                "Batch returned {} responses for {} requests",
                responses.len(),
                requests.len()
            )));
        }

        responses
            .into_iter()
            .enumerate()
            .map(|(index, response)| {
                response.ok_or_else(|| {
                    Error::json_mapping(format!("Batch response at index {index} is null"))
                })
            })
            .collect()
    }

    async fn publish_with_attachment<T>(
        &self,
        connection: &str,
        attachment: Option<&BinaryAttachment>,
        parameters: &[Parameter],
    ) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let endpoint = if is_video_connection(connection) {
            Endpoint::Video
        } else {
            Endpoint::Graph
        };
        info!(
            connection = connection,
            attachment = ?attachment.map(BinaryAttachment::filename),
            "Publishing"
        );

        let request = ApiRequest::post(connection, parameters)?
            .endpoint(endpoint)
            .attachments(attachment.map(std::slice::from_ref).unwrap_or_default());
        let body = self.make_request(request).await?;
        self.json_mapper.to_object(&body)
    }

    async fn delete_object(&self, object: &str, parameters: &[Parameter]) -> Result<bool> {
        let request = if self.config.http_delete_fallback {
            ApiRequest::post(object, parameters)?.parameter("method", "delete")
        } else {
            ApiRequest::new(HttpMethod::Delete, object, parameters)?
        };
        info!(object = object, "Deleting object");

        let body = self.make_request(request).await?;
        Ok(is_confirmed(&body))
    }

    async fn convert_session_keys_to_access_tokens(
        &self,
        app_id: &str,
        secret_key: &str,
        session_keys: &[&str],
    ) -> Result<Vec<AccessToken>> {
        if session_keys.is_empty() {
            return Ok(Vec::new());
        }

        let request = ApiRequest::post("oauth/exchange_sessions", &[])?
            .parameter("client_id", app_id)
            .parameter("client_secret", secret_key)
            .parameter("sessions", session_keys.join(","))
            .anonymous();
        let body = self.make_request(request).await?;

        let responses: Vec<TokenResponse> = self.json_mapper.to_list(&body)?;
        if responses.len() != session_keys.len() {
            return Err(Error::json_mapping(format!(
                "Received {} access tokens for {} session keys",
                responses.len(),
                session_keys.len()
            )));
        }

        let now = Utc::now();
        responses
            .into_iter()
            .map(|response| {
                AccessToken::from_token_response(response, now).map_err(|e| {
                    Error::json_mapping(format!("Unable to extract access token: {e}"))
                })
            })
            .collect()
    }

    async fn obtain_app_access_token(&self, app_id: &str, app_secret: &str) -> Result<AccessToken> {
        let request = ApiRequest::get("oauth/access_token", &[])?
            .parameter("grant_type", "client_credentials")
            .parameter("client_id", app_id)
            .parameter("client_secret", app_secret)
            .anonymous();
        let body = self.make_request(request).await?;
        self.parse_access_token(&body)
    }

    async fn obtain_extended_access_token(
        &self,
        app_id: &str,
        app_secret: &str,
        access_token: &str,
    ) -> Result<AccessToken> {
        let request = ApiRequest::get("oauth/access_token", &[])?
            .parameter("grant_type", "fb_exchange_token")
            .parameter("client_id", app_id)
            .parameter("client_secret", app_secret)
            .parameter("fb_exchange_token", access_token)
            .anonymous();
        let body = self.make_request(request).await?;
        self.parse_access_token(&body)
    }

    fn obtain_app_secret_proof(&self, access_token: &str, app_secret: &str) -> Result<String> {
        app_secret_proof(access_token, app_secret)
    }

    fn parse_signed_request<T>(&self, signed_request: &str, app_secret: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        signed_request::parse_signed_request(signed_request, app_secret)
    }

    async fn debug_token(&self, input_token: &str) -> Result<DebugTokenInfo> {
        let request = ApiRequest::get("debug_token", &[])?.parameter("input_token", input_token);
        let body = self.make_request(request).await?;
        let envelope: DataEnvelope<DebugTokenInfo> = self.json_mapper.to_object(&body)?;
        Ok(envelope.data)
    }

    fn json_mapper(&self) -> &J {
        &self.json_mapper
    }

    fn web_requestor(&self) -> &W {
        self.web_requestor.as_ref()
    }
}
