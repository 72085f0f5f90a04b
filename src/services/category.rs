//! Category routes. Categories hang off a menu.

use super::{delete_entity, fetch_list, require_parent};
use crate::net::client::ApiClient;
use crate::net::error::ApiError;
use crate::net::types::{Category, CategoryForm, CategoryRequest, Envelope};

pub const CATEGORIES_PATH: &str = "/api/base/categories";
pub const CATEGORY_PATH: &str = "/api/base/category";
pub const DELETE_CATEGORY_PATH: &str = "/api/base/delete-category";

/// `GET /api/base/categories/{menuId}?ownerId=&language=`
///
/// # Errors
///
/// [`ApiError::MissingParent`] for an empty menu id; otherwise as
/// [`super::menu::list_menus`].
pub async fn list_categories(
    api: &ApiClient,
    menu_id: &str,
    language: &str,
) -> Result<Envelope<Vec<Category>>, ApiError> {
    require_parent(menu_id, "menu")?;
    fetch_list(api, &format!("{CATEGORIES_PATH}/{menu_id}"), language).await
}

/// `POST /api/base/category`
///
/// # Errors
///
/// [`ApiError::MissingParent`] before any request when the form has no menu.
pub async fn create_category(api: &ApiClient, form: &CategoryForm) -> Result<Envelope<Category>, ApiError> {
    require_parent(&form.menu_id, "menu")?;
    api.post(CATEGORY_PATH, &CategoryRequest::from(form)).await
}

/// `POST /api/base/delete-category/{id}`
///
/// # Errors
///
/// Ownership and already-deleted failures are reworded for categories.
pub async fn delete_category(api: &ApiClient, category_id: &str) -> Result<Envelope<serde_json::Value>, ApiError> {
    delete_entity(api, &format!("{DELETE_CATEGORY_PATH}/{category_id}"), "category").await
}

#[cfg(test)]
#[path = "category_test.rs"]
mod tests;
