use super::*;
use std::sync::Arc;

use serde_json::json;

use crate::test_helpers::{MockTransport, client_with, make_token, ok_envelope, respond};

fn login_request() -> LoginRequest {
    LoginRequest { email: "owner@example.com".into(), password: "hunter2".into() }
}

#[tokio::test]
async fn sign_in_establishes_session() {
    let token = make_token(&json!({ "sub": "u-42" }));
    let body = json!({ "accessToken": token, "refreshToken": "r1" });
    let transport = Arc::new(MockTransport::new(move |_| Ok(ok_envelope(body.clone()))));
    let api = client_with(&transport);
    let store = SessionStore::in_memory(Arc::clone(api.jar()));

    let session = sign_in(&api, &store, &login_request()).await.unwrap();

    assert_eq!(session.user_id, "u-42");
    assert_eq!(session.email, "owner@example.com");
    assert!(store.is_authenticated());
    assert!(!store.loading());
    assert_eq!(api.jar().access_token().as_deref(), Some(session.access_token.as_str()));
    assert_eq!(api.jar().refresh_token().as_deref(), Some("r1"));

    let sent = &transport.requests()[0];
    assert_eq!(sent.path, LOGIN_PATH);
    assert_eq!(sent.body.as_ref().unwrap()["email"], "owner@example.com");
    assert!(sent.bearer.is_none());
}

#[tokio::test]
async fn sign_in_prefers_payload_user_id() {
    let token = make_token(&json!({ "sub": "from-token" }));
    let body = json!({ "token": token, "userId": 99, "email": "other@example.com" });
    let transport = Arc::new(MockTransport::new(move |_| Ok(ok_envelope(body.clone()))));
    let api = client_with(&transport);
    let store = SessionStore::in_memory(Arc::clone(api.jar()));

    let session = sign_in(&api, &store, &login_request()).await.unwrap();
    assert_eq!(session.user_id, "99");
    assert_eq!(session.email, "other@example.com");
}

#[tokio::test]
async fn unsuccessful_envelope_is_rejected() {
    let transport = Arc::new(MockTransport::always(
        200,
        json!({ "isSucceed": false, "message": "Invalid credentials", "data": null }),
    ));
    let api = client_with(&transport);
    let store = SessionStore::in_memory(Arc::clone(api.jar()));

    let err = sign_in(&api, &store, &login_request()).await.unwrap_err();
    assert!(matches!(&err, ApiError::Rejected { message } if message == "Invalid credentials"));
    assert!(!store.is_authenticated());
    assert!(!store.loading());
    assert!(api.jar().access_token().is_none());
}

#[tokio::test]
async fn token_without_identity_is_not_installed() {
    let token = make_token(&json!({ "role": "owner" }));
    let body = json!({ "accessToken": token });
    let transport = Arc::new(MockTransport::new(move |_| Ok(ok_envelope(body.clone()))));
    let api = client_with(&transport);
    let store = SessionStore::in_memory(Arc::clone(api.jar()));

    let err = sign_in(&api, &store, &login_request()).await.unwrap_err();
    assert_eq!(err.error_code(), "E_MISSING_IDENTIFIER_CLAIM");
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn sign_up_validation_errors_pass_through() {
    let transport = Arc::new(MockTransport::new(|_| {
        Ok(respond(
            422,
            &json!({ "title": "One or more validation errors occurred.", "errors": { "Password": ["Too short"] } }),
        ))
    }));
    let api = client_with(&transport);
    let store = SessionStore::in_memory(Arc::clone(api.jar()));
    let request = RegisterRequest { email: "new@example.com".into(), password: "x".into(), full_name: None };

    let err = sign_up(&api, &store, &request).await.unwrap_err();
    match err {
        ApiError::Validation { status, errors, .. } => {
            assert_eq!(status, 422);
            assert_eq!(errors["Password"], vec!["Too short".to_owned()]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(transport.requests()[0].path, REGISTER_PATH);
    assert!(!store.loading());
}

#[tokio::test]
async fn current_user_sends_bearer() {
    let token = make_token(&json!({ "sub": "u-1" }));
    let transport = Arc::new(MockTransport::new(|_| {
        Ok(ok_envelope(json!({ "id": "u-1", "email": "owner@example.com", "fullName": "Owner" })))
    }));
    let api = client_with(&transport);
    api.jar().set_access_token(&token);

    let profile = current_user(&api).await.unwrap().data.unwrap();
    assert_eq!(profile.full_name.as_deref(), Some("Owner"));
    assert_eq!(transport.requests()[0].bearer.as_deref(), Some(token.as_str()));
}
