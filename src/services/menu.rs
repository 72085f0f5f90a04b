//! Menu routes.

use super::{delete_entity, fetch_list};
use crate::net::client::ApiClient;
use crate::net::error::ApiError;
use crate::net::types::{Envelope, Menu, MenuForm, MenuRequest};

pub const MENUS_PATH: &str = "/api/base/menus";
pub const MENU_PATH: &str = "/api/base/menu";
pub const DELETE_MENU_PATH: &str = "/api/base/delete-menu";

/// `GET /api/base/menus?ownerId=&language=`
///
/// # Errors
///
/// Token errors when no owner id can be resolved; otherwise client errors
/// except `400`, which yields an empty list.
pub async fn list_menus(api: &ApiClient, language: &str) -> Result<Envelope<Vec<Menu>>, ApiError> {
    fetch_list(api, MENUS_PATH, language).await
}

/// `POST /api/base/menu`
///
/// # Errors
///
/// Propagates client errors.
pub async fn create_menu(api: &ApiClient, form: &MenuForm) -> Result<Envelope<Menu>, ApiError> {
    api.post(MENU_PATH, &MenuRequest::from(form)).await
}

/// `POST /api/base/delete-menu/{id}`
///
/// # Errors
///
/// [`ApiError::Forbidden`] for menus owned by someone else,
/// [`ApiError::NotFound`] for menus already gone.
pub async fn delete_menu(api: &ApiClient, menu_id: &str) -> Result<Envelope<serde_json::Value>, ApiError> {
    delete_entity(api, &format!("{DELETE_MENU_PATH}/{menu_id}"), "menu").await
}

#[cfg(test)]
#[path = "menu_test.rs"]
mod tests;
