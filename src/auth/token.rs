//! Identity extraction from backend-issued access tokens.
//!
//! DESIGN
//! ======
//! Several list endpoints want the owner id as a query parameter, so the id is
//! read straight out of the token payload instead of asking the server. The
//! signature is not checked: the token came from the backend and is going
//! straight back to it. Treat the result as a cached hint, never as an
//! authorization decision.

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use serde_json::{Map, Value};

/// Claim names that may carry the user id, in lookup order.
pub const IDENTIFIER_CLAIMS: [&str; 8] = [
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier",
    "sub",
    "userId",
    "id",
    "user_id",
    "uid",
    "nameid",
    "unique_name",
];

/// Claim names that may carry the user's email, in lookup order.
pub const EMAIL_CLAIMS: [&str; 2] = ["http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress", "email"];

pub type Claims = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Wrong segment count, bad base64, or a payload that is not a JSON object.
    #[error("malformed access token: {0}")]
    MalformedToken(String),

    /// The payload decoded but none of [`IDENTIFIER_CLAIMS`] holds a value.
    #[error("access token carries no user identifier claim")]
    MissingIdentifierClaim,

    /// No access token is stored for this session.
    #[error("no access token in session; log in first")]
    MissingToken,
}

/// Decode the payload segment of a compact three-part token.
///
/// # Errors
///
/// Returns [`TokenError::MalformedToken`] unless the token has exactly three
/// `.`-separated segments and the middle one decodes to a JSON object.
pub fn decode_claims(token: &str) -> Result<Claims, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::MalformedToken(format!("expected 3 segments, found {}", segments.len())));
    }

    let payload = decode_segment(segments[1])?;
    match serde_json::from_slice::<Value>(&payload) {
        Ok(Value::Object(claims)) => Ok(claims),
        Ok(_) => Err(TokenError::MalformedToken("payload is not a JSON object".to_owned())),
        Err(e) => Err(TokenError::MalformedToken(format!("payload is not JSON: {e}"))),
    }
}

/// base64url without padding is the norm; padded and standard-alphabet
/// payloads are accepted too.
fn decode_segment(segment: &str) -> Result<Vec<u8>, TokenError> {
    let trimmed = segment.trim_end_matches('=');
    URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
        .map_err(|e| TokenError::MalformedToken(format!("payload is not base64: {e}")))
}

/// Resolve the user id carried by `token`.
///
/// # Errors
///
/// Returns [`TokenError::MalformedToken`] if the token cannot be decoded and
/// [`TokenError::MissingIdentifierClaim`] if no identifier claim is present.
pub fn user_id_from_token(token: &str) -> Result<String, TokenError> {
    let claims = decode_claims(token)?;
    first_claim(&claims, &IDENTIFIER_CLAIMS).ok_or(TokenError::MissingIdentifierClaim)
}

/// Resolve the email carried by `token`, if any.
///
/// # Errors
///
/// Returns [`TokenError::MalformedToken`] if the token cannot be decoded.
pub fn email_from_token(token: &str) -> Result<Option<String>, TokenError> {
    let claims = decode_claims(token)?;
    Ok(first_claim(&claims, &EMAIL_CLAIMS))
}

/// First candidate claim holding a non-empty string or a number.
#[must_use]
pub fn first_claim(claims: &Claims, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|name| claims.get(*name))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
