//! Transport - one decoded JSON request to the ledger service
//!
//! Attaches headers, serializes bodies and classifies failures:
//! - HTTP 429        -> `RPC_RATE_LIMITED`
//! - other non-2xx   -> `RPC_UPSTREAM` (status + body text)
//! - malformed JSON  -> `RPC_INVALID_RESPONSE`
//!
//! Retries and backoff are not done here; see `gateway`.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::models::errors::{AppError, AppResult};
use crate::utils::cache::CacheKey;
use crate::utils::constants::USER_AGENT as USER_AGENT_CONST;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Whether a response may be served from / stored in the response cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    Cached,
    Bypass,
}

/// Fully built request: absolute URL, method, optional JSON body
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<serde_json::Value>,
    pub cache: CachePolicy,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            body: None,
            cache: CachePolicy::Cached,
        }
    }

    pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            body: Some(body),
            cache: CachePolicy::Cached,
        }
    }

    pub fn bypass_cache(mut self) -> Self {
        self.cache = CachePolicy::Bypass;
        self
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.method.as_str(), &self.url, self.body.as_ref())
    }
}

/// Seam between the pipeline and the network
pub trait Transport: Send + Sync + 'static {
    fn send(&self, request: &ApiRequest) -> impl Future<Output = AppResult<serde_json::Value>> + Send;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(request_timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            client: Self::build_client(request_timeout)?,
        })
    }

    /// HTTP client with custom headers (gzip enabled)
    fn build_client(request_timeout: Duration) -> AppResult<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(request_timeout)
            .gzip(true)
            .build()
            .map_err(|e| AppError::invalid_config(format!("Failed to build HTTP client: {}", e)))
    }
}

/// Map a finished HTTP exchange onto the error taxonomy
pub fn classify_response(status: StatusCode, body: &str) -> AppResult<serde_json::Value> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(AppError::rate_limited());
    }
    if !status.is_success() {
        return Err(AppError::upstream(status.as_u16(), body.to_string()));
    }
    serde_json::from_str(body).map_err(AppError::from)
}

impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> AppResult<serde_json::Value> {
        debug!("🌐 {} {}", request.method.as_str(), request.url);

        let builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => {
                let body = request.body.as_ref().map(serde_json::to_vec).transpose()?;
                self.client
                    .post(&request.url)
                    .header(CONTENT_TYPE, "application/json")
                    .body(body.unwrap_or_default())
            }
        };

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        classify_response(status, &text)
    }
}
