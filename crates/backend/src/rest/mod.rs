//! REST client for the hosted backend.
//!
//! Speaks the `PostgREST` dialect served under `{BACKEND_URL}/rest/v1/`:
//!
//! - `GET {table}?select=...&col=eq.v&order=created_at.desc` - reads
//! - `POST {table}` - inserts
//! - `PATCH {table}?id=eq.v` - updates
//! - `POST rpc/{name}` - stored procedure calls
//!
//! Every request carries the project API key and the configured timeout.
//!
//! # Example
//!
//! ```rust,ignore
//! use rojarhat_backend::{BackendConfig, RestClient};
//!
//! let client = RestClient::new(&BackendConfig::from_env()?)?;
//!
//! let rows: Vec<serde_json::Value> = client
//!     .from("products")
//!     .select("id,name")
//!     .in_list("id", ["3f2b8c1e-9a4d-4e6b-8f1a-2c3d4e5f6a7b"])
//!     .fetch()
//!     .await?;
//! ```

mod rows;
mod store;

use std::sync::Arc;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::BackendConfig;
use crate::error::BackendError;

/// `PostgREST` code for "function not found in the schema cache".
const PROCEDURE_NOT_FOUND_CODE: &str = "PGRST202";

// =============================================================================
// RestClient
// =============================================================================

/// Client for the hosted backend's REST interface.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<RestClientInner>,
}

struct RestClientInner {
    client: reqwest::Client,
    /// `{BACKEND_URL}/rest/v1/`, always with a trailing slash.
    base: Url,
    order_rpc: String,
}

/// Error body returned by the backend.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

impl RestClient {
    /// Create a new REST client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be extended or the HTTP
    /// client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut base = config.url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let base = base.join("rest/v1/")?;

        let key = config.api_key.expose_secret();
        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(key)?);
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {key}"))?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(RestClientInner {
                client,
                base,
                order_rpc: config.order_rpc.clone(),
            }),
        })
    }

    /// Name of the atomic order procedure.
    #[must_use]
    pub fn order_rpc(&self) -> &str {
        &self.inner.order_rpc
    }

    /// Start a read query against `table`.
    #[must_use]
    pub fn from(&self, table: &str) -> Select<'_> {
        Select {
            client: self,
            table: table.to_string(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
        }
    }

    /// Insert rows and return the inserted representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects the rows.
    #[instrument(skip(self, rows))]
    pub async fn insert<T, R>(
        &self,
        table: &str,
        rows: &T,
        returning: &str,
    ) -> Result<Vec<R>, BackendError>
    where
        T: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let mut url = self.inner.base.join(table)?;
        url.query_pairs_mut().append_pair("select", returning);

        let request = self
            .inner
            .client
            .post(url)
            .header("Prefer", "return=representation")
            .json(rows);

        let body = self.send(request, table).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Insert rows without reading them back.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects the rows.
    #[instrument(skip(self, rows))]
    pub async fn insert_minimal<T>(&self, table: &str, rows: &T) -> Result<(), BackendError>
    where
        T: Serialize + ?Sized + Sync,
    {
        let url = self.inner.base.join(table)?;
        let request = self
            .inner
            .client
            .post(url)
            .header("Prefer", "return=minimal")
            .json(rows);

        self.send(request, table).await?;
        Ok(())
    }

    /// Patch rows matching `column = value` and return how many changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects the patch.
    #[instrument(skip(self, patch))]
    pub async fn update<T>(
        &self,
        table: &str,
        patch: &T,
        column: &str,
        value: &str,
    ) -> Result<usize, BackendError>
    where
        T: Serialize + ?Sized + Sync,
    {
        let mut url = self.inner.base.join(table)?;
        url.query_pairs_mut()
            .append_pair(column, &format!("eq.{value}"))
            .append_pair("select", column);

        let request = self
            .inner
            .client
            .patch(url)
            .header("Prefer", "return=representation")
            .json(patch);

        let body = self.send(request, table).await?;
        let rows: Vec<serde_json::Value> = serde_json::from_str(&body)?;
        Ok(rows.len())
    }

    /// Call a stored procedure.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::ProcedureMissing` if the procedure is not
    /// deployed, or another error if the call fails.
    #[instrument(skip(self, params))]
    pub async fn rpc<P, R>(&self, name: &str, params: &P) -> Result<R, BackendError>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = self.inner.base.join(&format!("rpc/{name}"))?;
        let request = self.inner.client.post(url).json(params);

        let body = match self.send(request, name).await {
            Ok(body) => body,
            Err(BackendError::Api { status, code, .. })
                if status == 404 || code.as_deref() == Some(PROCEDURE_NOT_FOUND_CODE) =>
            {
                return Err(BackendError::ProcedureMissing(name.to_string()));
            }
            Err(e) => return Err(e),
        };

        Ok(serde_json::from_str(&body)?)
    }

    /// Send a request and return the body of a successful response.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        target: &str,
    ) -> Result<String, BackendError> {
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            let error = api_error(status.as_u16(), &body);
            tracing::warn!(
                status = %status,
                target = %target,
                error = %error,
                "Backend returned non-success status"
            );
            return Err(error);
        }

        debug!(target = %target, bytes = body.len(), "Backend request succeeded");
        Ok(body)
    }
}

/// Build an `Api` error from a non-success response body.
fn api_error(status: u16, body: &str) -> BackendError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => {
            let mut message = parsed
                .message
                .unwrap_or_else(|| format!("HTTP {status}"));
            if let Some(details) = parsed.details.filter(|d| !d.is_empty()) {
                message = format!("{message} ({details})");
            }
            if let Some(hint) = parsed.hint.filter(|h| !h.is_empty()) {
                message = format!("{message}; hint: {hint}");
            }
            BackendError::Api {
                status,
                code: parsed.code,
                message,
            }
        }
        Err(_) => BackendError::Api {
            status,
            code: None,
            message: if body.is_empty() {
                format!("HTTP {status}")
            } else {
                body.chars().take(200).collect()
            },
        },
    }
}

fn header_value(value: &str) -> Result<HeaderValue, BackendError> {
    HeaderValue::from_str(value)
        .map_err(|e| BackendError::MissingData(format!("API key is not a valid header: {e}")))
}

// =============================================================================
// Select builder
// =============================================================================

/// A read query under construction.
#[must_use]
pub struct Select<'a> {
    client: &'a RestClient,
    table: String,
    columns: String,
    filters: Vec<(String, String)>,
    order: Option<String>,
}

impl Select<'_> {
    /// Columns (and embedded resources) to return.
    pub fn select(mut self, columns: &str) -> Self {
        self.columns = columns.to_string();
        self
    }

    /// Filter `column = value`.
    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{value}")));
        self
    }

    /// Filter `column IN (values)`. Values are quoted.
    pub fn in_list<I, S>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let list = values
            .into_iter()
            .map(|v| format!("\"{}\"", v.as_ref().replace('"', "\\\"")))
            .collect::<Vec<_>>()
            .join(",");
        self.filters
            .push((column.to_string(), format!("in.({list})")));
        self
    }

    /// Sort by `column`.
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.order = Some(format!("{column}.{direction}"));
        self
    }

    /// The request URL this query will hit.
    ///
    /// # Errors
    ///
    /// Returns an error if the table name does not form a valid URL.
    pub fn url(&self) -> Result<Url, BackendError> {
        let mut url = self.client.inner.base.join(&self.table)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", &self.columns);
            for (column, filter) in &self.filters {
                pairs.append_pair(column, filter);
            }
            if let Some(order) = &self.order {
                pairs.append_pair("order", order);
            }
        }
        Ok(url)
    }

    /// Run the query and deserialize the rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the rows do not parse.
    pub async fn fetch<R: DeserializeOwned>(self) -> Result<Vec<R>, BackendError> {
        let url = self.url()?;
        let request = self.client.inner.client.get(url);
        let body = self.client.send(request, &self.table).await?;
        Ok(serde_json::from_str(&body)?)
    }
}
