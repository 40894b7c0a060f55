//! REST client implementation.
//!
//! Uses `reqwest` for HTTP and classifies PostgREST error bodies into
//! [`BackendError`] variants.

use std::sync::Arc;

use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{BackendError, NO_ROWS, UNIQUE_VIOLATION};
use crate::config::BackendConfig;

/// Media type asking PostgREST for a single JSON object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Longest response excerpt included in logs.
const LOG_BODY_LIMIT: usize = 500;

/// Client for the hosted backend's REST API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    rest_url: Url,
    anon_key: SecretString,
    access_token: Option<SecretString>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("rest_url", &self.inner.rest_url.as_str())
            .field("anon_key", &"[REDACTED]")
            .field("signed_in", &self.inner.access_token.is_some())
            .finish()
    }
}

/// Error body returned by PostgREST.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

impl BackendClient {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::InvalidUrl` if the REST base cannot be derived
    /// from the configured URL.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let rest_url = rest_base(&config.url)?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                rest_url,
                anon_key: config.anon_key.clone(),
                access_token: None,
            }),
        })
    }

    /// A client that authenticates as a signed-in shopper.
    #[must_use]
    pub fn with_access_token(&self, token: SecretString) -> Self {
        Self {
            inner: Arc::new(BackendClientInner {
                client: self.inner.client.clone(),
                rest_url: self.inner.rest_url.clone(),
                anon_key: self.inner.anon_key.clone(),
                access_token: Some(token),
            }),
        }
    }

    /// Select rows from a table.
    ///
    /// `query` carries PostgREST parameters, e.g. `[("select", "*"),
    /// ("category", "eq.Books")]`.
    ///
    /// # Errors
    ///
    /// Returns a `BackendError` on transport failure or an error response.
    #[instrument(skip(self, query))]
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, BackendError> {
        let url = self.table_url(table, query)?;
        let body = self.execute(self.inner.client.get(url)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Select exactly one row, mapping "no rows" to `None`.
    ///
    /// # Errors
    ///
    /// Returns a `BackendError` on transport failure or any error response
    /// other than "no rows".
    #[instrument(skip(self, query))]
    pub async fn select_single<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, BackendError> {
        let url = self.table_url(table, query)?;
        let request = self
            .inner
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT);

        match self.execute(request).await {
            Ok(body) => Ok(Some(serde_json::from_str(&body)?)),
            Err(BackendError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Insert rows and return them as stored (ids and defaults filled in).
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Conflict` on a unique violation, or another
    /// `BackendError` on failure.
    #[instrument(skip(self, rows))]
    pub async fn insert<B, T>(&self, table: &str, rows: &B) -> Result<Vec<T>, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.table_url(table, &[])?;
        let request = self
            .inner
            .client
            .post(url)
            .header("Prefer", "return=representation")
            .json(rows);

        let body = self.execute(request).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Insert a single row and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Conflict` on a unique violation, or another
    /// `BackendError` on failure.
    #[instrument(skip(self, row))]
    pub async fn insert_one<B, T>(&self, table: &str, row: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.table_url(table, &[])?;
        let request = self
            .inner
            .client
            .post(url)
            .header("Prefer", "return=representation")
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT)
            .json(row);

        let body = self.execute(request).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Delete rows matching the filters.
    ///
    /// # Errors
    ///
    /// Returns a `BackendError` on transport failure or an error response.
    #[instrument(skip(self, filters))]
    pub async fn delete(&self, table: &str, filters: &[(&str, &str)]) -> Result<(), BackendError> {
        let url = self.table_url(table, filters)?;
        self.execute(self.inner.client.delete(url)).await?;
        Ok(())
    }

    fn table_url(&self, table: &str, query: &[(&str, &str)]) -> Result<Url, BackendError> {
        let mut url = self.inner.rest_url.join(table)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Send a request with auth headers and return the body of a success response.
    async fn execute(&self, request: RequestBuilder) -> Result<String, BackendError> {
        let bearer = self
            .inner
            .access_token
            .as_ref()
            .unwrap_or(&self.inner.anon_key)
            .expose_secret()
            .to_string();

        let response = request
            .header("apikey", self.inner.anon_key.expose_secret())
            .bearer_auth(bearer)
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let err = classify_error(status, &body);
        if err.is_conflict() || err.is_not_found() {
            debug!(status = %status, error = %err, "Backend returned expected error");
        } else {
            tracing::error!(
                status = %status,
                body = %body.chars().take(LOG_BODY_LIMIT).collect::<String>(),
                "Backend returned non-success status"
            );
        }
        Err(err)
    }
}

/// Derive `<base>/rest/v1/` from the configured project URL.
fn rest_base(base: &Url) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("rest/v1/")
}

/// Map an error response onto a `BackendError`.
fn classify_error(status: StatusCode, body: &str) -> BackendError {
    let parsed = serde_json::from_str::<ApiErrorBody>(body).ok();
    let code = parsed.as_ref().and_then(|b| b.code.clone());
    let message = parsed
        .as_ref()
        .and_then(|b| b.message.clone().or_else(|| b.details.clone()))
        .unwrap_or_else(|| body.chars().take(200).collect());

    match code.as_deref() {
        Some(UNIQUE_VIOLATION) => BackendError::Conflict(message),
        Some(NO_ROWS) => BackendError::NotFound(message),
        _ if status == StatusCode::NOT_FOUND => BackendError::NotFound(message),
        _ => BackendError::Api {
            status: status.as_u16(),
            code,
            message,
        },
    }
}
