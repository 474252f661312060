//! Thin reqwest client for the hosted store's REST dialect.
//!
//! Tables live under `/rest/v1/{table}` and are filtered with
//! `column=eq.value` query pairs. Every request carries the anon key as
//! `apikey` and a bearer token: the user's access token when one is
//! configured, otherwise the anon key itself.

use std::fmt;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::dto::{AuthUserDto, StoreErrorDto};
use crate::config::StoreConnection;

const REST_PREFIX: &str = "rest/v1";
const AUTH_USER_PATH: &str = "auth/v1/user";
const UNIQUE_VIOLATION: &str = "23505";

/// Errors raised by [`RestClient`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RestError {
    /// The request never produced a response.
    #[error("transport failure: {message}")]
    Transport {
        /// Transport error text.
        message: String,
    },
    /// The request or the store timed out.
    #[error("request timed out: {message}")]
    Timeout {
        /// Timeout detail.
        message: String,
    },
    /// The store answered with a non-success status.
    #[error("status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Database error code, e.g. `23505`.
        code: Option<String>,
        /// Error text or body preview.
        message: String,
    },
    /// The response body did not decode.
    #[error("invalid response payload: {message}")]
    Decode {
        /// Decoder message.
        message: String,
    },
    /// A request URL could not be built.
    #[error("invalid request URL: {message}")]
    Url {
        /// Parser message.
        message: String,
    },
}

impl RestError {
    /// Whether the store rejected a write because of a unique constraint.
    ///
    /// Only the database code counts: the store answers `409` for foreign-key
    /// violations too.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::Status { code: Some(code), .. } if code == UNIQUE_VIOLATION)
    }
}

/// One `column=eq.value` predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    column: &'static str,
    value: String,
}

impl Filter {
    /// Exact-match predicate on `column`.
    pub fn equals(column: &'static str, value: impl fmt::Display) -> Self {
        Self {
            column,
            value: value.to_string(),
        }
    }
}

/// Client for table reads and writes plus the auth user endpoint.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: Url,
    anon_key: String,
    access_token: Option<String>,
}

impl RestClient {
    /// Build a client using a reqwest client with the connection's timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(connection: &StoreConnection) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(connection.timeout).build()?;
        Ok(Self {
            client,
            base_url: connection.base_url.clone(),
            anon_key: connection.anon_key.clone(),
            access_token: connection.access_token.clone(),
        })
    }

    /// Whether a user access token is configured.
    pub const fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }

    fn endpoint(&self, path: &str) -> Result<Url, RestError> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path).map_err(|error| RestError::Url {
            message: error.to_string(),
        })
    }

    pub(super) fn table_url(
        &self,
        table: &str,
        select: Option<&str>,
        filters: &[Filter],
    ) -> Result<Url, RestError> {
        let mut url = self.endpoint(&format!("{REST_PREFIX}/{table}"))?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(columns) = select {
                pairs.append_pair("select", columns);
            }
            for filter in filters {
                pairs.append_pair(filter.column, &format!("eq.{}", filter.value));
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, token: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", self.anon_key.as_str())
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
    }

    fn table_request(&self, method: Method, url: Url) -> RequestBuilder {
        let token = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.request(method, url, token)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Vec<u8>, RestError> {
        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }

    /// `GET /rest/v1/{table}?select=...&col=eq.value`.
    ///
    /// # Errors
    ///
    /// Returns [`RestError`] on transport, status, or decode failures.
    pub async fn select<T>(
        &self,
        table: &str,
        select: &str,
        filters: &[Filter],
    ) -> Result<Vec<T>, RestError>
    where
        T: DeserializeOwned,
    {
        let url = self.table_url(table, Some(select), filters)?;
        let body = self.send(self.table_request(Method::GET, url)).await?;
        decode(&body)
    }

    /// `POST /rest/v1/{table}` returning the stored rows.
    ///
    /// # Errors
    ///
    /// Returns [`RestError`] on transport, status, or decode failures.
    pub async fn insert<B, T>(&self, table: &str, row: &B) -> Result<Vec<T>, RestError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.table_url(table, None, &[])?;
        let builder = self
            .table_request(Method::POST, url)
            .header("Prefer", "return=representation")
            .json(row);
        let body = self.send(builder).await?;
        decode(&body)
    }

    /// `PATCH /rest/v1/{table}?select=...&col=eq.value` with `changes` as the
    /// body, returning the `select` columns of every patched row.
    ///
    /// An empty result means no row matched the filters.
    ///
    /// # Errors
    ///
    /// Returns [`RestError`] on transport, status, or decode failures.
    pub async fn update<B, T>(
        &self,
        table: &str,
        select: &str,
        filters: &[Filter],
        changes: &B,
    ) -> Result<Vec<T>, RestError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.table_url(table, Some(select), filters)?;
        let builder = self
            .table_request(Method::PATCH, url)
            .header("Prefer", "return=representation")
            .json(changes);
        let body = self.send(builder).await?;
        decode(&body)
    }

    /// `DELETE /rest/v1/{table}?col=eq.value`. Deleting zero rows succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`RestError`] on transport or status failures.
    pub async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), RestError> {
        let url = self.table_url(table, None, filters)?;
        let builder = self
            .table_request(Method::DELETE, url)
            .header("Prefer", "return=minimal");
        self.send(builder).await.map(drop)
    }

    /// Raw id of the user owning the access token.
    ///
    /// Returns `None` without a request when no token is configured, and
    /// `None` when the auth service rejects the token.
    ///
    /// # Errors
    ///
    /// Returns [`RestError`] on transport, unexpected status, or decode
    /// failures.
    pub async fn current_user_id(&self) -> Result<Option<String>, RestError> {
        let Some(token) = self.access_token.as_deref() else {
            return Ok(None);
        };
        let url = self.endpoint(AUTH_USER_PATH)?;
        match self.send(self.request(Method::GET, url, token)).await {
            Ok(body) => decode::<AuthUserDto>(&body).map(|user| Some(user.id)),
            Err(RestError::Status {
                status: 401 | 403, ..
            }) => Ok(None),
            Err(error) => Err(error),
        }
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, RestError> {
    serde_json::from_slice(body).map_err(|error| RestError::Decode {
        message: error.to_string(),
    })
}

fn map_transport_error(error: reqwest::Error) -> RestError {
    if error.is_timeout() {
        RestError::Timeout {
            message: error.to_string(),
        }
    } else {
        RestError::Transport {
            message: error.to_string(),
        }
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> RestError {
    if matches!(
        status,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT
    ) {
        return RestError::Timeout {
            message: format!("status {}", status.as_u16()),
        };
    }

    let parsed = serde_json::from_slice::<StoreErrorDto>(body).ok();
    let code = parsed.as_ref().and_then(|dto| dto.code.clone());
    let message = parsed
        .and_then(StoreErrorDto::into_message)
        .unwrap_or_else(|| body_preview(body));
    RestError::Status {
        status: status.as_u16(),
        code,
        message,
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
