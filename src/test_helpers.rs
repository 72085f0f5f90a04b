//! Shared fixtures for unit tests.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};

use crate::auth::{SessionEvents, TokenJar};
use crate::net::client::ApiClient;
use crate::net::error::ApiError;
use crate::net::transport::{HttpRequest, HttpResponse, HttpTransport};

type Handler = dyn Fn(&HttpRequest) -> Result<HttpResponse, ApiError> + Send + Sync;

/// Transport that answers from a closure and records every request.
pub struct MockTransport {
    handler: Box<Handler>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new(handler: impl Fn(&HttpRequest) -> Result<HttpResponse, ApiError> + Send + Sync + 'static) -> Self {
        Self { handler: Box::new(handler), requests: Mutex::new(Vec::new()) }
    }

    /// Answer every request with the same status and JSON body.
    pub fn always(status: u16, body: Value) -> Self {
        Self::new(move |_| Ok(respond(status, &body)))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<HttpRequest> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }
}

#[async_trait::async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        // Give concurrently polled requests a chance to interleave.
        tokio::task::yield_now().await;
        (self.handler)(request)
    }
}

pub fn respond(status: u16, body: &Value) -> HttpResponse {
    HttpResponse { status, body: body.to_string() }
}

pub fn ok_envelope(data: Value) -> HttpResponse {
    respond(200, &json!({ "isSucceed": true, "message": "ok", "data": data }))
}

/// Client over `transport` with an in-memory jar and no redirect delay.
pub fn client_with(transport: &Arc<MockTransport>) -> ApiClient {
    let jar = Arc::new(TokenJar::in_memory());
    ApiClient::new(Arc::clone(transport) as Arc<dyn HttpTransport>, jar, SessionEvents::new())
        .with_logout_redirect_delay(Duration::from_millis(5))
}

/// Client whose jar already holds an access token for `user_id`.
pub fn signed_in_client(transport: &Arc<MockTransport>, user_id: &str) -> ApiClient {
    let client = client_with(transport);
    client.jar().set_access_token(&make_token(&json!({ "sub": user_id })));
    client
}

/// Mint an HS256 token carrying `claims`.
pub fn make_token(claims: &Value) -> String {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        claims,
        &jsonwebtoken::EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap()
}

/// Unique path under the system temp dir.
pub fn temp_path(file_name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("qrmenu-admin-test-{}", uuid::Uuid::new_v4()))
        .join(file_name)
}
