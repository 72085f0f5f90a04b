//! Session store: the authenticated identity for this client.
//!
//! SYSTEM CONTEXT
//! ==============
//! The store owns `{ userId, email }` and a loading flag. Tokens live in the
//! shared [`TokenJar`], which the HTTP client may rewrite during refresh, so
//! every read re-syncs tokens from the jar. A session whose access token has
//! left the jar is no session at all.
//!
//! The identity is persisted as JSON next to the jar so a restarted process
//! picks up where it left off.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use super::cookies::TokenJar;
use super::events::{SessionEvent, SessionEvents};
use super::token::{self, TokenError};
use crate::net::types::AuthTokens;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Session {
    /// Build a session from a login/register token payload.
    ///
    /// The user id comes from the payload when the backend sends one, else
    /// from the access token's claims. The email falls back to `form_email`,
    /// then to the token's email claim.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] when the id has to be read from the token and
    /// the token is malformed or carries no identifier claim.
    pub fn from_tokens(tokens: &AuthTokens, form_email: Option<&str>) -> Result<Self, TokenError> {
        let user_id = match non_empty(tokens.user_id.as_deref()) {
            Some(id) => id.to_owned(),
            None => token::user_id_from_token(&tokens.access_token)?,
        };
        let email = match non_empty(tokens.email.as_deref()).or(non_empty(form_email)) {
            Some(email) => email.to_owned(),
            None => token::email_from_token(&tokens.access_token)?.unwrap_or_default(),
        };
        Ok(Self {
            user_id,
            email,
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// What gets written to durable storage. Tokens stay in the jar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedIdentity {
    user_id: String,
    email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session: Option<Session>,
    pub loading: bool,
}

pub struct SessionStore {
    state: Mutex<SessionSnapshot>,
    jar: Arc<TokenJar>,
    storage: Option<PathBuf>,
}

impl SessionStore {
    #[must_use]
    pub fn in_memory(jar: Arc<TokenJar>) -> Self {
        Self { state: Mutex::new(SessionSnapshot::default()), jar, storage: None }
    }

    /// Open a store persisted at `path`, restoring the identity when the jar
    /// still holds an access token for it.
    #[must_use]
    pub fn open(jar: Arc<TokenJar>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let session = load_identity(&path).and_then(|identity| {
            jar.access_token().map(|access_token| Session {
                user_id: identity.user_id,
                email: identity.email,
                access_token,
                refresh_token: jar.refresh_token(),
            })
        });
        if let Some(session) = &session {
            tracing::debug!(user_id = %session.user_id, "restored session");
        }
        Self { state: Mutex::new(SessionSnapshot { session, loading: false }), jar, storage: Some(path) }
    }

    #[must_use]
    pub fn jar(&self) -> &Arc<TokenJar> {
        &self.jar
    }

    /// Current state with tokens re-read from the jar.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let session = state.session.as_ref().and_then(|session| {
            self.jar.access_token().map(|access_token| Session {
                access_token,
                refresh_token: self.jar.refresh_token(),
                ..session.clone()
            })
        });
        SessionSnapshot { session, loading: state.loading }
    }

    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.snapshot().session
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).loading
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).loading = loading;
    }

    /// Install `session`, mirroring its tokens into the jar.
    pub fn set_user(&self, session: Session) {
        self.jar.set_access_token(&session.access_token);
        if let Some(refresh_token) = &session.refresh_token {
            self.jar.set_refresh_token(refresh_token);
        }
        self.persist(&PersistedIdentity { user_id: session.user_id.clone(), email: session.email.clone() });
        tracing::info!(user_id = %session.user_id, "session established");

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.session = Some(session);
    }

    /// Drop the session and both tokens.
    pub fn logout(&self) {
        self.jar.clear_tokens();
        self.clear_local();
        tracing::info!("logged out");
    }

    /// Follow logout broadcasts from the HTTP client until the channel closes.
    pub fn spawn_logout_listener(self: &Arc<Self>, events: &SessionEvents) -> JoinHandle<()> {
        let store = Arc::clone(self);
        let mut rx = events.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(SessionEvent::LoggedOut) => store.clear_local(),
                    Ok(SessionEvent::LoginRequired) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "session listener lagged");
                        if store.jar.access_token().is_none() {
                            store.clear_local();
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    fn clear_local(&self) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).session = None;
        let Some(path) = &self.storage else {
            return;
        };
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove session file"),
        }
    }

    fn persist(&self, identity: &PersistedIdentity) {
        let Some(path) = &self.storage else {
            return;
        };
        if let Err(e) = write_identity(path, identity) {
            tracing::warn!(path = %path.display(), error = %e, "failed to persist session");
        }
    }
}

fn load_identity(path: &Path) -> Option<PersistedIdentity> {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "failed to read session file");
            }
            return None;
        }
    };
    match serde_json::from_slice(&raw) {
        Ok(identity) => Some(identity),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "discarding corrupt session file");
            None
        }
    }
}

fn write_identity(path: &Path, identity: &PersistedIdentity) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_vec_pretty(identity).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
