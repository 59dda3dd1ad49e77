//! Resilient HTTP client session.
//!
//! # Responsibilities
//! - Join a normalized base URL with relative paths
//! - Attach default headers and a default timeout to every call
//! - Retry transient failures according to a `RetryPolicy`
//! - Reuse one connection pool for the lifetime of the client
//!
//! # Design Decisions
//! - One `reqwest::Client` per session; it is dropped (and its pooled
//!   connections closed) together with the `ResilientClient`
//! - The pool is safe for concurrent calls; the client can be shared via `Arc`
//! - Non-2xx statuses are returned, never raised

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::client::response::ApiResponse;
use crate::client::url::{join_url, normalize_base_url};
use crate::config::{ClientConfig, RetryConfig};
use crate::observability::metrics;
use crate::resilience::timeouts::effective_timeout;
use crate::resilience::{Outcome, RetryDecision, RetryPolicy, RetryState, TransportFailure};

/// Header carrying the per-session request id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Errors surfaced by the resilient client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("{failure} failure calling {url} after {retries} retries: {source}")]
    Transport {
        url: String,
        failure: TransportFailure,
        retries: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} still returned {status} after {retries} retries")]
    RetriesExhausted {
        url: String,
        status: StatusCode,
        retries: u32,
    },
}

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Overrides the session timeout for this call only.
    pub timeout: Option<Duration>,
    /// Extra headers; they win over session defaults with the same name.
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    /// Pre-encoded JSON body.
    pub body: Option<Vec<u8>>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }
}

/// Standard headers for a test session: JSON `Accept` plus one
/// `X-Request-ID` shared by every call of the session.
pub fn session_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let Ok(id) = HeaderValue::from_str(&uuid::Uuid::new_v4().to_string()) {
        headers.insert(X_REQUEST_ID, id);
    }
    headers
}

/// HTTP client with base URL handling, default headers, timeouts and retries.
#[derive(Debug, Clone)]
pub struct ResilientClient {
    base_url: String,
    timeout: Duration,
    policy: RetryPolicy,
    http: reqwest::Client,
}

impl ResilientClient {
    /// Create a client for `base_url`.
    ///
    /// `headers` are attached to every request; `timeout` defaults to the
    /// configured `DEFAULT_TIMEOUT` (10 seconds).
    pub fn new(
        base_url: &str,
        headers: Option<HeaderMap>,
        timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        let base_url = normalize_base_url(base_url).to_string();
        match Url::parse(&base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ClientError::InvalidBaseUrl(base_url)),
        }

        let http = reqwest::Client::builder()
            .default_headers(headers.unwrap_or_default())
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            base_url,
            timeout: timeout.unwrap_or_else(|| ClientConfig::default().default_timeout()),
            policy: RetryPolicy::default(),
            http,
        })
    }

    /// Create a session client from configuration, with `session_headers()`.
    pub fn from_config(client: &ClientConfig, retries: &RetryConfig) -> Result<Self, ClientError> {
        let session = Self::new(
            &client.base_url,
            Some(session_headers()),
            Some(client.default_timeout()),
        )?;
        Ok(session.with_retry_policy(RetryPolicy::from_config(retries)))
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Absolute URL for a relative `path`.
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse, ClientError> {
        self.request(Method::GET, path, RequestOptions::new()).await
    }

    /// POST with an optional JSON body.
    pub async fn post(
        &self,
        path: &str,
        json: Option<&Value>,
    ) -> Result<ApiResponse, ClientError> {
        self.request(Method::POST, path, with_body(json)?).await
    }

    /// PUT with an optional JSON body.
    pub async fn put(
        &self,
        path: &str,
        json: Option<&Value>,
    ) -> Result<ApiResponse, ClientError> {
        self.request(Method::PUT, path, with_body(json)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ClientError> {
        self.request(Method::DELETE, path, RequestOptions::new()).await
    }

    /// Issue a request, retrying per the session policy.
    ///
    /// Returns the last response once retries are exhausted (unless the
    /// policy has `raise_on_status`), or the transport error when no attempt
    /// produced a response.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.url(path);
        let timeout = effective_timeout(self.timeout, options.timeout);
        let mut state = RetryState::start();

        let (result, retries, exhausted) = loop {
            state = match state {
                RetryState::Attempting { retries_done } => {
                    let result = self.send_once(&method, &url, &options, timeout).await;
                    let decision = {
                        let outcome = match &result {
                            Ok(response) => Outcome::Response {
                                status: response.status,
                                retry_after: response.headers.get(RETRY_AFTER),
                            },
                            Err(err) => Outcome::Transport(TransportFailure::classify(err)),
                        };
                        self.policy.decide(&method, retries_done, &outcome)
                    };

                    if let RetryDecision::Retry { delay, reason } = decision {
                        tracing::debug!(
                            method = %method,
                            url = %url,
                            attempt = retries_done + 1,
                            reason = %reason.label(),
                            delay = ?delay,
                            "Retrying request"
                        );
                        metrics::record_retry(&reason);
                    }
                    state.on_decision(&decision, result)
                }
                RetryState::Waiting { delay, .. } => {
                    tokio::time::sleep(delay).await;
                    state.on_wake()
                }
                RetryState::Done {
                    retries_done,
                    exhausted,
                    last,
                } => break (last, retries_done, exhausted),
            };
        };

        self.finish(&method, url, result, retries, exhausted)
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &str,
        options: &RequestOptions,
        timeout: Duration,
    ) -> Result<ApiResponse, reqwest::Error> {
        let mut builder = self
            .http
            .request(method.clone(), url)
            .timeout(timeout)
            .headers(options.headers.clone());
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(body) = &options.body {
            builder = builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body.clone());
        }

        let start = Instant::now();
        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let final_url = response.url().to_string();
        let body = response.bytes().await?;

        Ok(ApiResponse {
            status,
            headers,
            body,
            elapsed: start.elapsed(),
            url: final_url,
            retries: 0,
        })
    }

    fn finish(
        &self,
        method: &Method,
        url: String,
        result: Result<ApiResponse, reqwest::Error>,
        retries: u32,
        exhausted: bool,
    ) -> Result<ApiResponse, ClientError> {
        match result {
            Ok(mut response) => {
                response.retries = retries;
                metrics::record_client_response(method.as_str(), response.status.as_u16(), retries);
                if exhausted {
                    tracing::warn!(
                        method = %method,
                        url = %url,
                        status = %response.status,
                        retries,
                        "Retries exhausted, returning last response"
                    );
                    if self.policy.raise_on_status {
                        return Err(ClientError::RetriesExhausted {
                            url,
                            status: response.status,
                            retries,
                        });
                    }
                }
                Ok(response)
            }
            Err(source) => {
                let failure = TransportFailure::classify(&source);
                tracing::warn!(
                    method = %method,
                    url = %url,
                    failure = %failure,
                    retries,
                    error = %source,
                    "Request failed without a response"
                );
                Err(ClientError::Transport {
                    url,
                    failure,
                    retries,
                    source,
                })
            }
        }
    }
}

fn with_body(json: Option<&Value>) -> Result<RequestOptions, ClientError> {
    match json {
        Some(body) => RequestOptions::new().json(body),
        None => Ok(RequestOptions::new()),
    }
}
