//! Auth routes and session establishment.

use crate::auth::session::{Session, SessionStore};
use crate::net::client::ApiClient;
use crate::net::error::ApiError;
use crate::net::types::{AuthTokens, Envelope, LoginRequest, RegisterRequest, UserProfile};

pub const REGISTER_PATH: &str = "/api/auth/register";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const ME_PATH: &str = "/api/auth/me";

/// `POST /api/auth/login`
///
/// # Errors
///
/// Propagates client errors.
pub async fn login(api: &ApiClient, request: &LoginRequest) -> Result<Envelope<AuthTokens>, ApiError> {
    api.post(LOGIN_PATH, request).await
}

/// `POST /api/auth/register`
///
/// # Errors
///
/// Propagates client errors; field problems arrive as [`ApiError::Validation`].
pub async fn register(api: &ApiClient, request: &RegisterRequest) -> Result<Envelope<AuthTokens>, ApiError> {
    api.post(REGISTER_PATH, request).await
}

/// `GET /api/auth/me`
///
/// # Errors
///
/// Propagates client errors.
pub async fn current_user(api: &ApiClient) -> Result<Envelope<UserProfile>, ApiError> {
    api.get(ME_PATH, &[]).await
}

/// Exchange the stored refresh token for a new access token.
///
/// # Errors
///
/// See [`ApiClient::refresh_session`].
pub async fn refresh(api: &ApiClient) -> Result<AuthTokens, ApiError> {
    api.refresh_session().await
}

/// Log in and install the resulting session in `store`.
///
/// # Errors
///
/// Client errors, [`ApiError::Rejected`] for an unsuccessful envelope, and
/// token errors when the response carries no resolvable user id.
pub async fn sign_in(api: &ApiClient, store: &SessionStore, request: &LoginRequest) -> Result<Session, ApiError> {
    store.set_loading(true);
    let result = login(api, request).await;
    store.set_loading(false);
    establish(store, result?, &request.email)
}

/// Register and install the resulting session in `store`.
///
/// # Errors
///
/// As [`sign_in`].
pub async fn sign_up(api: &ApiClient, store: &SessionStore, request: &RegisterRequest) -> Result<Session, ApiError> {
    store.set_loading(true);
    let result = register(api, request).await;
    store.set_loading(false);
    establish(store, result?, &request.email)
}

fn establish(store: &SessionStore, envelope: Envelope<AuthTokens>, email: &str) -> Result<Session, ApiError> {
    let tokens = accepted_tokens(envelope)?;
    let session = Session::from_tokens(&tokens, Some(email))?;
    store.set_user(session.clone());
    Ok(session)
}

fn accepted_tokens(envelope: Envelope<AuthTokens>) -> Result<AuthTokens, ApiError> {
    match envelope.data {
        Some(tokens) if envelope.is_succeed && !tokens.access_token.is_empty() => Ok(tokens),
        _ => Err(ApiError::Rejected {
            message: envelope
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "authentication failed".to_owned()),
        }),
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
