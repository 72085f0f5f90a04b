//! Error taxonomy for every call that leaves the process.
//!
//! Non-2xx responses are normalized here, once, so services only ever match
//! on meaning (`Forbidden`, `NotFound`, `Validation`) and never on raw status.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::auth::token::TokenError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response arrived (DNS, connect, TLS, body read).
    #[error("network request failed: {0}")]
    Network(String),

    /// A `401` could not be recovered by refreshing; the session was torn down.
    #[error("session expired; please log in again")]
    AuthExpired,

    /// A `401` on a request that was already retried after a refresh.
    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    Forbidden { message: String },

    #[error("{message}")]
    NotFound { message: String },

    /// Any other 4xx, with the backend's per-field messages when it sends them.
    #[error("{message}")]
    Validation { status: u16, message: String, errors: BTreeMap<String, Vec<String>> },

    /// 5xx and anything else outside 2xx/4xx.
    #[error("server error (status {status}): {message}")]
    Server { status: u16, message: String },

    /// A 2xx envelope with `isSucceed: false`.
    #[error("{message}")]
    Rejected { message: String },

    /// A success response whose body did not match the expected shape.
    #[error("response parse failed: {0}")]
    Parse(String),

    #[error(transparent)]
    Token(#[from] TokenError),

    /// A create call was attempted before its parent entity was chosen.
    #[error("select a {parent} first")]
    MissingParent { parent: &'static str },

    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Normalize a non-2xx response.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorBody>(body).unwrap_or_default();
        let message = parsed
            .message
            .or(parsed.title)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| default_message(status).to_owned());

        match status {
            401 => Self::Unauthorized { message },
            403 => Self::Forbidden { message },
            404 => Self::NotFound { message },
            400..=499 => Self::Validation { status, message, errors: parsed.errors.map(field_errors).unwrap_or_default() },
            _ => Self::Server { status, message },
        }
    }

    /// HTTP status this error came from, if it came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Validation { status, .. } | Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Network(_) => "E_NETWORK",
            Self::AuthExpired => "E_AUTH_EXPIRED",
            Self::Unauthorized { .. } => "E_UNAUTHORIZED",
            Self::Forbidden { .. } => "E_FORBIDDEN",
            Self::NotFound { .. } => "E_NOT_FOUND",
            Self::Validation { .. } => "E_VALIDATION",
            Self::Server { .. } => "E_SERVER",
            Self::Rejected { .. } => "E_REJECTED",
            Self::Parse(_) => "E_PARSE",
            Self::Token(TokenError::MalformedToken(_)) => "E_MALFORMED_TOKEN",
            Self::Token(TokenError::MissingIdentifierClaim) => "E_MISSING_IDENTIFIER_CLAIM",
            Self::Token(TokenError::MissingToken) => "E_MISSING_TOKEN",
            Self::MissingParent { .. } => "E_MISSING_PARENT",
            Self::InvalidUpload(_) => "E_INVALID_UPLOAD",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Server { status: 500..=599, .. })
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    title: Option<String>,
    errors: Option<Value>,
}

/// `{ field: [msg, ..] }`, `{ field: msg }`, or a bare `[msg, ..]` (keyed by `""`).
fn field_errors(value: Value) -> BTreeMap<String, Vec<String>> {
    match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(field, messages)| (field, messages_of(messages)))
            .filter(|(_, messages)| !messages.is_empty())
            .collect(),
        other => {
            let messages = messages_of(other);
            if messages.is_empty() {
                BTreeMap::new()
            } else {
                BTreeMap::from([(String::new(), messages)])
            }
        }
    }
}

fn messages_of(value: Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn default_message(status: u16) -> &'static str {
    match status {
        400 => "the request was rejected",
        401 => "authentication required",
        403 => "you do not have permission for this action",
        404 => "the requested resource was not found",
        409 => "the resource was changed by someone else",
        422 => "the submitted data is invalid",
        400..=499 => "the request could not be processed",
        _ => "the server could not complete the request",
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
