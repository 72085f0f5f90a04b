//! Product routes. Products hang off a category.

use super::{delete_entity, fetch_list, require_parent};
use crate::net::client::ApiClient;
use crate::net::error::ApiError;
use crate::net::types::{Envelope, Product, ProductForm, ProductRequest};

pub const PRODUCTS_PATH: &str = "/api/base/products";
pub const PRODUCT_PATH: &str = "/api/base/product";
pub const DELETE_PRODUCT_PATH: &str = "/api/base/delete-product";

/// `GET /api/base/products/{categoryId}?ownerId=&language=`
///
/// # Errors
///
/// [`ApiError::MissingParent`] for an empty category id; otherwise as
/// [`super::menu::list_menus`].
pub async fn list_products(
    api: &ApiClient,
    category_id: &str,
    language: &str,
) -> Result<Envelope<Vec<Product>>, ApiError> {
    require_parent(category_id, "category")?;
    fetch_list(api, &format!("{PRODUCTS_PATH}/{category_id}"), language).await
}

/// `POST /api/base/product`
///
/// # Errors
///
/// [`ApiError::MissingParent`] before any request when the form has no category.
pub async fn create_product(api: &ApiClient, form: &ProductForm) -> Result<Envelope<Product>, ApiError> {
    require_parent(&form.category_id, "category")?;
    api.post(PRODUCT_PATH, &ProductRequest::from(form)).await
}

/// `POST /api/base/delete-product/{id}`
///
/// # Errors
///
/// Ownership and already-deleted failures are reworded for products.
pub async fn delete_product(api: &ApiClient, product_id: &str) -> Result<Envelope<serde_json::Value>, ApiError> {
    delete_entity(api, &format!("{DELETE_PRODUCT_PATH}/{product_id}"), "product").await
}

#[cfg(test)]
#[path = "product_test.rs"]
mod tests;
