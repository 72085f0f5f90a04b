//! Wire types for the menu backend.
//!
//! Every response is wrapped in an [`Envelope`]. Forms use the dashboard's
//! field names; the `*Request` types carry the backend's (`title` goes out as
//! `name`).

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// =============================================================================
// ENVELOPE
// =============================================================================

/// Uniform `{ isSucceed, message, data }` wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub is_succeed: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<Vec<T>> {
    /// Successful envelope with no items, used when a list endpoint answers 400.
    #[must_use]
    pub fn empty_list() -> Self {
        Self { is_succeed: true, message: None, data: Some(Vec::new()) }
    }
}

// =============================================================================
// ENTITIES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub menu_id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub language: Option<String>,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    pub full_name: Option<String>,
}

/// `data` of login, register, and refresh responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    #[serde(alias = "token")]
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub user_id: Option<String>,
    pub email: Option<String>,
}

// =============================================================================
// FORMS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuForm {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub language: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryForm {
    pub menu_id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub language: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub category_id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub language: String,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

// =============================================================================
// WIRE REQUESTS
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MenuRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub image_url: &'a str,
    pub language: &'a str,
}

impl<'a> From<&'a MenuForm> for MenuRequest<'a> {
    fn from(form: &'a MenuForm) -> Self {
        Self {
            name: &form.title,
            description: &form.description,
            image_url: &form.image_url,
            language: &form.language,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CategoryRequest<'a> {
    pub menu_id: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub image_url: &'a str,
    pub language: &'a str,
}

impl<'a> From<&'a CategoryForm> for CategoryRequest<'a> {
    fn from(form: &'a CategoryForm) -> Self {
        Self {
            menu_id: &form.menu_id,
            name: &form.title,
            description: &form.description,
            image_url: &form.image_url,
            language: &form.language,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductRequest<'a> {
    pub category_id: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub image_url: &'a str,
    pub language: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl<'a> From<&'a ProductForm> for ProductRequest<'a> {
    fn from(form: &'a ProductForm) -> Self {
        Self {
            category_id: &form.category_id,
            name: &form.title,
            description: &form.description,
            image_url: &form.image_url,
            language: &form.language,
            price: form.price,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshTokenRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<&'a str>,
    pub refresh_token: &'a str,
}

// =============================================================================
// ID HELPERS
// =============================================================================

/// Backend ids arrive as strings or integers depending on the entity.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected string or number id, got {other}"))),
    }
}

fn opt_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(D::Error::custom(format!("expected string or number id, got {other}"))),
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
