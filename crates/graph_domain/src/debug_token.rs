use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::serde_ext::{lenient_i64, string_or_number};

/// Result of a token introspection (`debug_token`) call.
///
/// The wire timestamps are epoch *seconds*; `issued_at` is not returned for
/// short-lived tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugTokenInfo {
    #[serde(default, deserialize_with = "string_or_number")]
    app_id: Option<String>,

    #[serde(default)]
    application: Option<String>,

    #[serde(default, deserialize_with = "lenient_i64")]
    expires_at: Option<i64>,

    #[serde(default, deserialize_with = "lenient_i64")]
    issued_at: Option<i64>,

    #[serde(default)]
    is_valid: Option<bool>,

    #[serde(default, deserialize_with = "string_or_number")]
    user_id: Option<String>,

    #[serde(default)]
    scopes: Vec<String>,

    #[serde(default)]
    metadata: Map<String, Value>,
}

impl DebugTokenInfo {
    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    /// Display name of the application.
    pub fn application(&self) -> Option<&str> {
        self.application.as_deref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.issued_at
            .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
    }

    pub fn is_valid(&self) -> Option<bool> {
        self.is_valid
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Permissions granted to the token.
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }
}
