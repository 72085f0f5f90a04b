//! The single request pipeline to the menu backend.
//!
//! DESIGN
//! ======
//! Request side: every request picks up `Authorization: Bearer <accessToken>`
//! from the jar at send time, or goes out bare when there is none.
//!
//! Response side, per request:
//!
//! ```text
//! Initial --401--> Refreshing --ok--> Retried --> Success | Failed
//!                      |
//!                      +--no refresh token / refresh failed--> teardown (AuthExpired)
//! ```
//!
//! The retried flag is set before refreshing, so a request refreshes at most
//! once; a 401 on the retry is returned like any other rejection.
//!
//! CONCURRENCY
//! ===========
//! Refreshes run behind `refresh_gate`. A request that waited at the gate
//! and finds a different access token in the jar than the one it was sent
//! with retries with that token instead of refreshing again, so a burst of
//! 401s costs one refresh call.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use super::types::{AuthTokens, Envelope, RefreshTokenRequest};
use crate::auth::cookies::TokenJar;
use crate::auth::events::{SessionEvent, SessionEvents};
use crate::auth::token::{self, TokenError};
use crate::config::{AppConfig, DEFAULT_LOGOUT_REDIRECT_MS};

pub const REFRESH_TOKEN_PATH: &str = "/api/auth/refresh-token";

pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    jar: Arc<TokenJar>,
    events: SessionEvents,
    refresh_gate: tokio::sync::Mutex<()>,
    logout_redirect_delay: Duration,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("logout_redirect_delay", &self.logout_redirect_delay)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, jar: Arc<TokenJar>, events: SessionEvents) -> Self {
        Self {
            transport,
            jar,
            events,
            refresh_gate: tokio::sync::Mutex::new(()),
            logout_redirect_delay: Duration::from_millis(DEFAULT_LOGOUT_REDIRECT_MS),
        }
    }

    /// Build a reqwest-backed client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn from_config(config: &AppConfig, jar: Arc<TokenJar>, events: SessionEvents) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(&config.api_base_url, config.timeouts)?;
        Ok(Self::new(Arc::new(transport), jar, events).with_logout_redirect_delay(config.logout_redirect_delay))
    }

    #[must_use]
    pub fn with_logout_redirect_delay(mut self, delay: Duration) -> Self {
        self.logout_redirect_delay = delay;
        self
    }

    #[must_use]
    pub fn jar(&self) -> &Arc<TokenJar> {
        &self.jar
    }

    #[must_use]
    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Owner id of the current session, read from the access token.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] if there is no token or it carries no id.
    pub fn current_user_id(&self) -> Result<String, TokenError> {
        let access_token = self.jar.access_token().ok_or(TokenError::MissingToken)?;
        token::user_id_from_token(&access_token)
    }

    /// `GET` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiClient::execute`] errors and [`ApiError::Parse`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, ApiError> {
        let mut request = HttpRequest::get(path);
        for (key, value) in query {
            request = request.query(key, value);
        }
        let response = self.execute(request).await?;
        decode_body(&response)
    }

    /// `POST` a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiClient::execute`] errors and [`ApiError::Parse`].
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self.execute(HttpRequest::post(path).json(body)?).await?;
        decode_body(&response)
    }

    /// `POST` with no body (the backend's delete routes).
    ///
    /// # Errors
    ///
    /// Propagates [`ApiClient::execute`] errors and [`ApiError::Parse`].
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(HttpRequest::post(path)).await?;
        decode_body(&response)
    }

    /// Send `request` through both interceptors.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Network`] when no response arrives.
    /// - [`ApiError::AuthExpired`] when a 401 could not be refreshed away.
    /// - The normalized status error for any other non-2xx response.
    pub async fn execute(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        request.bearer = self.jar.access_token();
        let mut retried = false;

        loop {
            let response = self.transport.send(&request).await?;

            if response.status == 401 && !retried {
                retried = true;
                let Some(access_token) = self.refresh_access_token(request.bearer.as_deref()).await else {
                    return Err(ApiError::AuthExpired);
                };
                request.bearer = Some(access_token);
                continue;
            }

            if response.is_success() {
                return Ok(response);
            }
            return Err(ApiError::from_status(response.status, &response.body));
        }
    }

    /// Obtain a fresh access token, or `None` when the session is beyond saving.
    ///
    /// Teardown happens here, under the gate, so a burst of 401s that all
    /// fail to refresh ends the session (and broadcasts it) once.
    async fn refresh_access_token(&self, sent_with: Option<&str>) -> Option<String> {
        let _gate = self.refresh_gate.lock().await;

        match (self.jar.access_token(), sent_with) {
            (Some(current), _) if sent_with != Some(current.as_str()) => {
                tracing::debug!("access token already refreshed; retrying");
                return Some(current);
            }
            (None, Some(_)) => {
                tracing::debug!("session already ended by a concurrent request");
                return None;
            }
            _ => {}
        }

        let Some(refresh_token) = self.jar.refresh_token() else {
            tracing::info!("no refresh token; ending session");
            self.teardown_session();
            return None;
        };

        match self.call_refresh(sent_with, &refresh_token).await {
            Ok(tokens) => {
                self.store_refreshed(&tokens);
                Some(tokens.access_token)
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed; ending session");
                self.teardown_session();
                None
            }
        }
    }

    /// Refresh proactively, outside the 401 path. Does not tear the session
    /// down on failure.
    ///
    /// # Errors
    ///
    /// [`ApiError::AuthExpired`] without a refresh token; otherwise the
    /// refresh call's error.
    pub async fn refresh_session(&self) -> Result<AuthTokens, ApiError> {
        let _gate = self.refresh_gate.lock().await;
        let refresh_token = self.jar.refresh_token().ok_or(ApiError::AuthExpired)?;
        let access_token = self.jar.access_token();
        let tokens = self.call_refresh(access_token.as_deref(), &refresh_token).await?;
        self.store_refreshed(&tokens);
        Ok(tokens)
    }

    fn store_refreshed(&self, tokens: &AuthTokens) {
        self.jar.set_access_token(&tokens.access_token);
        if let Some(rotated) = tokens.refresh_token.as_deref().filter(|t| !t.is_empty()) {
            self.jar.set_refresh_token(rotated);
        }
        tracing::info!("access token refreshed");
    }

    /// Refresh call that bypasses both interceptors.
    async fn call_refresh(&self, access_token: Option<&str>, refresh_token: &str) -> Result<AuthTokens, ApiError> {
        let request = HttpRequest::post(REFRESH_TOKEN_PATH).json(&RefreshTokenRequest { access_token, refresh_token })?;
        let response = self.transport.send(&request).await?;
        if !response.is_success() {
            return Err(ApiError::from_status(response.status, &response.body));
        }
        parse_refreshed_tokens(&response.body)
    }

    fn teardown_session(&self) {
        self.jar.clear_tokens();
        self.events.emit(SessionEvent::LoggedOut);

        let events = self.events.clone();
        let delay = self.logout_redirect_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            events.emit(SessionEvent::LoginRequired);
        });
    }
}

fn decode_body<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Accepts the enveloped shape and a bare `{ accessToken, refreshToken }`.
fn parse_refreshed_tokens(body: &str) -> Result<AuthTokens, ApiError> {
    if let Ok(envelope) = serde_json::from_str::<Envelope<AuthTokens>>(body) {
        return match envelope.data {
            Some(tokens) if envelope.is_succeed && !tokens.access_token.is_empty() => Ok(tokens),
            _ => Err(ApiError::Parse(
                envelope.message.unwrap_or_else(|| "refresh returned no access token".to_owned()),
            )),
        };
    }
    match serde_json::from_str::<AuthTokens>(body) {
        Ok(tokens) if !tokens.access_token.is_empty() => Ok(tokens),
        Ok(_) => Err(ApiError::Parse("refresh returned no access token".to_owned())),
        Err(e) => Err(ApiError::Parse(e.to_string())),
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
