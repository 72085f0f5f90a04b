//! Transport seam between the intercepting client and the wire.
//!
//! [`ApiClient`](super::client::ApiClient) decides what to send and how to
//! recover; an [`HttpTransport`] only moves one request and returns status +
//! body. Tests swap in a scripted transport.

use std::fmt;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::error::ApiError;
use crate::config::HttpTimeouts;

/// One outbound request, relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

impl HttpRequest {
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: Method::GET, path: path.into(), query: Vec::new(), body: None, bearer: None }
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self { method: Method::POST, path: path.into(), query: Vec::new(), body: None, bearer: None }
    }

    #[must_use]
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_owned(), value.to_owned()));
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Parse`] if `body` cannot be serialized.
    pub fn json(mut self, body: &impl Serialize) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body).map_err(|e| ApiError::Parse(e.to_string()))?);
        Ok(self)
    }

    /// Value of the `Authorization` header this request will carry.
    #[must_use]
    pub fn authorization(&self) -> Option<String> {
        self.bearer.as_ref().map(|token| format!("Bearer {token}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send one request and return whatever status came back.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] only when no response was received.
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

// =============================================================================
// REQWEST
// =============================================================================

pub struct ReqwestTransport {
    http: reqwest::Client,
    base_url: String,
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the TLS backend fails to load.
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request())
            .connect_timeout(timeouts.connect())
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        tracing::debug!(method = %request.method, path = %request.path, status, "api call");
        Ok(HttpResponse { status, body })
    }
}
