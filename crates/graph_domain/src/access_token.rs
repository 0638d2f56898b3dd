use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::serde_ext::lenient_i64;
use crate::{Error, Result};

/// An access token and the instant it stops being valid, if known.
///
/// Returned by the token lifecycle operations: session-key conversion, app
/// token acquisition and token extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AccessToken {
    access_token: String,
    expires: Option<DateTime<Utc>>,
}

/// Token payload as the OAuth endpoints return it in JSON form.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,

    /// Seconds until the token expires
    #[serde(default, alias = "expires_in", deserialize_with = "lenient_i64")]
    pub expires: Option<i64>,
}

impl AccessToken {
    pub fn new(access_token: impl Into<String>, expires: Option<DateTime<Utc>>) -> Result<Self> {
        let access_token = access_token.into();
        if access_token.is_empty() {
            return Err(Error::InvalidArgument(
                "access token value must not be empty".to_string(),
            ));
        }
        Ok(Self { access_token, expires })
    }

    /// Parses a query string of the form `access_token=XXX` or
    /// `access_token=XXX&expires=YYY`, where `YYY` is the number of seconds
    /// until the token expires.
    ///
    /// An `expires` value that is not an integer is ignored and the token is
    /// returned without an expiration.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] when `access_token` is missing or
    /// empty.
    pub fn from_query_string(query_string: &str) -> Result<Self> {
        Self::from_query_string_at(query_string, Utc::now())
    }

    pub(crate) fn from_query_string_at(query_string: &str, now: DateTime<Utc>) -> Result<Self> {
        let query = query_string.trim().trim_start_matches('?');
        let first_value = |key: &str| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.into_owned())
        };

        let access_token = first_value("access_token")
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "Was expecting a query string of the form 'access_token=XXX' or \
                     'access_token=XXX&expires=YYY'. Instead, the query string was '{query_string}'"
                ))
            })?;

        let expires = first_value("expires")
            .and_then(|value| value.trim().parse::<i64>().ok())
            .and_then(|seconds| expires_after(now, seconds));

        Ok(Self { access_token, expires })
    }

    /// Builds a token from a JSON token response received at `now`.
    pub fn from_token_response(response: TokenResponse, now: DateTime<Utc>) -> Result<Self> {
        let access_token = response
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                Error::InvalidArgument("token response has no 'access_token' field".to_string())
            })?;
        let expires = response
            .expires
            .and_then(|seconds| expires_after(now, seconds));
        Ok(Self { access_token, expires })
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }
}

fn expires_after(now: DateTime<Utc>, seconds: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_seconds(seconds).and_then(|delta| now.checked_add_signed(delta))
}
