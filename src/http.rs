//! HTTP transport shared by every Zep sub-client.
//!
//! Adds authentication, retries transient failures and maps HTTP status codes
//! onto [`ZepError`] variants. Paths are passed as segments so ids are always
//! percent-encoded.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ZepConfig;
use crate::error::{Result, ZepError};

const MAX_BACKOFF: Duration = Duration::from_secs(10);
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Query parameters with optional values already dropped.
pub type Query = Vec<(&'static str, String)>;

/// Build a query list, skipping `None` values.
pub fn query<const N: usize>(pairs: [(&'static str, Option<String>); N]) -> Query {
    pairs
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect()
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpClient {
    /// Build a transport from config; fails without an API key.
    pub fn new(config: &ZepConfig) -> Result<Self> {
        let api_key = config.require_api_key()?;

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Api-Key {}", api_key))
            .map_err(|e| ZepError::Config(format!("API key is not a valid header value: {}", e)))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("zep-client-rust/", env!("CARGO_PKG_VERSION"))),
        );

        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::default()
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(redirect)
            .build()?;

        let base_url = Url::parse(config.base_url())
            .map_err(|e| ZepError::Config(format!("Invalid API URL '{}': {}", config.api_url, e)))?;

        Ok(Self {
            client,
            base_url,
            max_retries: config.max_retries,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    /// Override the initial backoff delay.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    pub fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ZepError::Config(format!("API URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        self.get_with_query(segments, &Query::new()).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(&self, segments: &[&str], query: &Query) -> Result<T> {
        let url = self.url(segments)?;
        let response = self
            .send(Method::GET, || self.client.get(url.clone()).query(query))
            .await?;
        decode(response).await
    }

    pub async fn post<T, B>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post_with_query(segments, &Query::new(), body).await
    }

    pub async fn post_with_query<T, B>(&self, segments: &[&str], query: &Query, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(segments)?;
        let response = self
            .send(Method::POST, || self.client.post(url.clone()).query(query).json(body))
            .await?;
        decode(response).await
    }

    /// POST that treats 404 as "nothing there" instead of an error.
    pub async fn post_optional<T, B>(&self, segments: &[&str], query: &Query, body: &B) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        match self.post_with_query(segments, query, body).await {
            Ok(value) => Ok(Some(value)),
            Err(ZepError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn patch<T, B>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(segments)?;
        let response = self
            .send(Method::PATCH, || self.client.patch(url.clone()).json(body))
            .await?;
        decode(response).await
    }

    pub async fn put<T, B>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(segments)?;
        let response = self
            .send(Method::PUT, || self.client.put(url.clone()).json(body))
            .await?;
        decode(response).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.url(segments)?;
        let response = self
            .send(Method::DELETE, || self.client.delete(url.clone()))
            .await?;
        decode(response).await
    }

    /// Send a request, retrying transient failures, and check its status.
    async fn send<F>(&self, method: Method, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt: u32 = 0;
        loop {
            let request = build().build()?;
            debug!(method = %method, url = %request.url(), attempt, "zep request");

            match self.client.execute(request).await {
                Ok(response) if attempt < self.max_retries && is_retryable(response.status()) => {
                    let delay = retry_after(&response).unwrap_or_else(|| self.backoff(attempt));
                    warn!(
                        status = response.status().as_u16(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "retrying zep request"
                    );
                    tokio::time::sleep(delay).await;
                }
                Ok(response) => return check_status(response).await,
                Err(e) if attempt < self.max_retries && (e.is_timeout() || e.is_connect()) => {
                    let delay = self.backoff(attempt);
                    warn!(error = %e, attempt, "retrying zep request after transport error");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(ZepError::Http(e)),
            }
            attempt += 1;
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(MAX_BACKOFF)
    }
}

fn is_retryable(status: StatusCode) -> bool {
    matches!(status.as_u16(), 408 | 409 | 429) || status.is_server_error()
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| Duration::from_secs(secs).min(MAX_BACKOFF))
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Extract a readable message from an error body.
fn error_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                trimmed.to_string()
            }
        })
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body, status);

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ZepError::Unauthorized(message),
        StatusCode::NOT_FOUND => ZepError::NotFound(message),
        _ => ZepError::Api {
            status: status.as_u16(),
            message,
        },
    })
}

/// Decode a JSON body; an empty body decodes as JSON `null`.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

// ============================================================================
// Tests
// ============================================================================
