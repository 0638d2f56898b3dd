use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::{BinaryAttachment, Result};

/// Status and body of a raw HTTP exchange. Non-success statuses are not
/// errors at this level; the client inspects the body for error envelopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebResponse {
    pub status: u16,
    pub body: String,
}

impl WebResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }
}

/// Transport used to talk to the Graph API endpoints.
#[async_trait::async_trait]
pub trait WebRequestor: Send + Sync + 'static {
    async fn execute_get(&self, url: &Url) -> anyhow::Result<WebResponse>;

    /// Posts form-encoded `parameters`. With attachments the request becomes
    /// multipart and the parameters move to the URL query string.
    async fn execute_post(
        &self,
        url: &Url,
        parameters: &str,
        attachments: &[BinaryAttachment],
    ) -> anyhow::Result<WebResponse>;

    async fn execute_delete(&self, url: &Url) -> anyhow::Result<WebResponse>;
}

/// Converts Graph API JSON to typed values and back.
pub trait JsonMapper: Send + Sync + 'static {
    fn to_object<T: DeserializeOwned>(&self, json: &str) -> Result<T>;

    /// Decodes a list from a bare JSON array or from an object wrapping one
    /// (e.g. `{"data": [...]}`).
    fn to_list<T: DeserializeOwned>(&self, json: &str) -> Result<Vec<T>>;

    fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String>;
}
