//! Domain services: one async function per backend operation.
//!
//! ARCHITECTURE
//! ============
//! Services are stateless: the session travels in the [`ApiClient`] they are
//! handed. Each one shapes the wire payload, calls the client, and returns the
//! envelope as the backend sent it. Shared error policy lives here:
//!
//! - list endpoints answer "nothing to show" with `400`; that becomes an empty
//!   successful envelope.
//! - delete endpoints get entity-specific messages for `403` and `404`.

pub mod auth;
pub mod category;
pub mod menu;
pub mod product;
pub mod upload;

use crate::net::client::ApiClient;
use crate::net::error::ApiError;
use crate::net::types::Envelope;

/// `ownerId` + `language` query used by every list endpoint.
pub(crate) fn owner_query(api: &ApiClient, language: &str) -> Result<Vec<(String, String)>, ApiError> {
    let owner_id = api.current_user_id()?;
    Ok(vec![("ownerId".to_owned(), owner_id), ("language".to_owned(), language.to_owned())])
}

/// GET a list endpoint, absorbing `400` into an empty list.
pub(crate) async fn fetch_list<T>(api: &ApiClient, path: &str, language: &str) -> Result<Envelope<Vec<T>>, ApiError>
where
    T: serde::de::DeserializeOwned,
{
    let query = owner_query(api, language)?;
    let query: Vec<(&str, &str)> = query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    match api.get(path, &query).await {
        Err(ApiError::Validation { status: 400, message, .. }) => {
            tracing::debug!(path, %message, "list endpoint answered 400; showing empty list");
            Ok(Envelope::empty_list())
        }
        other => other,
    }
}

/// POST a delete route, rewording ownership and already-gone failures.
pub(crate) async fn delete_entity(
    api: &ApiClient,
    path: &str,
    entity: &'static str,
) -> Result<Envelope<serde_json::Value>, ApiError> {
    api.post_empty(path)
        .await
        .map_err(|e| translate_delete_error(e, entity))
}

pub(crate) fn translate_delete_error(err: ApiError, entity: &'static str) -> ApiError {
    match err {
        ApiError::Forbidden { .. } => {
            ApiError::Forbidden { message: format!("You can only delete a {entity} that belongs to your account.") }
        }
        ApiError::NotFound { .. } => {
            ApiError::NotFound { message: format!("This {entity} was already deleted or no longer exists.") }
        }
        other => other,
    }
}

/// Reject create calls whose parent has not been chosen yet.
pub(crate) fn require_parent(id: &str, parent: &'static str) -> Result<(), ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::MissingParent { parent });
    }
    Ok(())
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
