use super::*;
use crate::test_helpers::{MockTransport, ok_envelope, signed_in_client};
use serde_json::json;
use std::sync::Arc;

fn soup() -> ProductForm {
    ProductForm {
        category_id: "c1".into(),
        title: "Lentil soup".into(),
        description: "Red lentils".into(),
        image_url: String::new(),
        language: "tr".into(),
        price: Some(4.5),
    }
}

#[tokio::test]
async fn list_requires_category() {
    let transport = Arc::new(MockTransport::always(200, json!({})));
    let api = signed_in_client(&transport, "owner-1");

    let err = list_products(&api, "", "tr").await.unwrap_err();
    assert!(matches!(err, ApiError::MissingParent { parent: "category" }));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn list_parses_prices() {
    let transport = Arc::new(MockTransport::new(|_| {
        Ok(ok_envelope(json!([
            { "id": 7, "categoryId": 3, "name": "Tea", "price": 1.25 },
            { "id": 8, "categoryId": 3, "name": "Water" }
        ])))
    }));
    let api = signed_in_client(&transport, "owner-1");

    let products = list_products(&api, "3", "tr").await.unwrap().data.unwrap();
    assert_eq!(products[0].id, "7");
    assert_eq!(products[0].category_id.as_deref(), Some("3"));
    assert_eq!(products[0].price, Some(1.25));
    assert_eq!(products[1].price, None);
    assert_eq!(transport.requests()[0].path, "/api/base/products/3");
}

#[tokio::test]
async fn list_400_is_empty_success() {
    let transport = Arc::new(MockTransport::always(400, json!({ "message": "none" })));
    let api = signed_in_client(&transport, "owner-1");

    let env = list_products(&api, "c1", "tr").await.unwrap();
    assert!(env.is_succeed);
    assert_eq!(env.data, Some(Vec::new()));
}

#[tokio::test]
async fn create_without_category_sends_nothing() {
    let transport = Arc::new(MockTransport::always(200, json!({})));
    let api = signed_in_client(&transport, "owner-1");
    let form = ProductForm { category_id: String::new(), ..soup() };

    let err = create_product(&api, &form).await.unwrap_err();
    assert_eq!(err.to_string(), "select a category first");
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn create_maps_title_and_price() {
    let transport = Arc::new(MockTransport::new(|_| {
        Ok(ok_envelope(json!({ "id": "p1", "categoryId": "c1", "name": "Lentil soup", "price": 4.5 })))
    }));
    let api = signed_in_client(&transport, "owner-1");

    let created = create_product(&api, &soup()).await.unwrap().data.unwrap();
    assert_eq!(created.name, "Lentil soup");

    let body = transport.requests()[0].body.clone().unwrap();
    assert_eq!(body["categoryId"], "c1");
    assert_eq!(body["name"], "Lentil soup");
    assert_eq!(body["price"], 4.5);
    assert!(body.get("title").is_none());
}

#[tokio::test]
async fn delete_404_names_the_product() {
    let transport = Arc::new(MockTransport::always(404, json!({ "message": "Not Found" })));
    let api = signed_in_client(&transport, "owner-1");

    let err = delete_product(&api, "p1").await.unwrap_err();
    assert_eq!(err.to_string(), "This product was already deleted or no longer exists.");
    assert_eq!(transport.requests()[0].path, "/api/base/delete-product/p1");
}
