use super::*;
use serde_json::json;

#[test]
fn envelope_parses_list_payload() {
    let env: Envelope<Vec<Menu>> = serde_json::from_value(json!({
        "isSucceed": true,
        "message": "ok",
        "data": [
            { "id": 7, "name": "Lunch", "description": "Midday", "imageUrl": "", "language": "tr" },
            { "id": "c0ffee", "name": "Drinks" }
        ]
    }))
    .unwrap();

    assert!(env.is_succeed);
    assert_eq!(env.message.as_deref(), Some("ok"));
    let menus = env.data.unwrap();
    assert_eq!(menus[0].id, "7");
    assert_eq!(menus[0].language.as_deref(), Some("tr"));
    assert_eq!(menus[1].id, "c0ffee");
    assert_eq!(menus[1].description, None);
}

#[test]
fn envelope_tolerates_missing_message_and_null_data() {
    let env: Envelope<Value> = serde_json::from_value(json!({ "isSucceed": false, "data": null })).unwrap();
    assert!(!env.is_succeed);
    assert_eq!(env.message, None);
    assert_eq!(env.data, None);
}

#[test]
fn empty_list_is_successful() {
    let env = Envelope::<Vec<Menu>>::empty_list();
    assert!(env.is_succeed);
    assert_eq!(env.data, Some(Vec::new()));
}

#[test]
fn id_rejects_objects() {
    let result: Result<Menu, _> = serde_json::from_value(json!({ "id": { "nested": 1 }, "name": "x" }));
    assert!(result.is_err());
}

#[test]
fn category_parent_id_accepts_numbers() {
    let category: Category = serde_json::from_value(json!({ "id": 3, "menuId": 12, "name": "Soups" })).unwrap();
    assert_eq!(category.menu_id.as_deref(), Some("12"));
}

#[test]
fn product_without_parent_id_parses() {
    let product: Product = serde_json::from_value(json!({ "id": "p1", "name": "Tea", "price": 2.5 })).unwrap();
    assert_eq!(product.category_id, None);
    assert_eq!(product.price, Some(2.5));
}

#[test]
fn auth_tokens_accept_token_alias_and_numeric_user_id() {
    let tokens: AuthTokens = serde_json::from_value(json!({ "token": "a1", "userId": 99 })).unwrap();
    assert_eq!(tokens.access_token, "a1");
    assert_eq!(tokens.user_id.as_deref(), Some("99"));
    assert_eq!(tokens.refresh_token, None);
}

#[test]
fn menu_form_maps_title_to_name() {
    let form = MenuForm {
        title: "A".into(),
        description: "B".into(),
        image_url: String::new(),
        language: "tr".into(),
    };
    let body = serde_json::to_value(MenuRequest::from(&form)).unwrap();
    assert_eq!(body, json!({ "name": "A", "description": "B", "imageUrl": "", "language": "tr" }));
}

#[test]
fn product_request_omits_missing_price() {
    let form = ProductForm { category_id: "c1".into(), title: "Tea".into(), ..ProductForm::default() };
    let body = serde_json::to_value(ProductRequest::from(&form)).unwrap();
    assert_eq!(body["categoryId"], "c1");
    assert_eq!(body["name"], "Tea");
    assert!(body.get("price").is_none());
    assert!(body.get("title").is_none());
}

#[test]
fn register_request_skips_missing_name() {
    let req = RegisterRequest { email: "a@b.c".into(), password: "pw".into(), full_name: None };
    assert_eq!(serde_json::to_value(req).unwrap(), json!({ "email": "a@b.c", "password": "pw" }));
}
