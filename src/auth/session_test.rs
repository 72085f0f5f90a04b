use super::*;
use crate::test_helpers::{make_token, temp_path};
use serde_json::json;

fn session(user_id: &str) -> Session {
    Session {
        user_id: user_id.to_owned(),
        email: "chef@example.com".to_owned(),
        access_token: format!("access-{user_id}"),
        refresh_token: Some(format!("refresh-{user_id}")),
    }
}

fn tokens(access_token: String) -> AuthTokens {
    AuthTokens { access_token, refresh_token: None, user_id: None, email: None }
}

// =============================================================================
// Session::from_tokens
// =============================================================================

#[test]
fn from_tokens_prefers_payload_user_id() {
    let mut t = tokens("not-a-jwt".to_owned());
    t.user_id = Some("u-payload".to_owned());
    t.email = Some("owner@example.com".to_owned());

    let s = Session::from_tokens(&t, None).unwrap();
    assert_eq!(s.user_id, "u-payload");
    assert_eq!(s.email, "owner@example.com");
}

#[test]
fn from_tokens_falls_back_to_token_claims() {
    let t = tokens(make_token(&json!({ "sub": "u1", "email": "claim@example.com" })));
    let s = Session::from_tokens(&t, None).unwrap();
    assert_eq!(s.user_id, "u1");
    assert_eq!(s.email, "claim@example.com");
}

#[test]
fn from_tokens_uses_form_email_before_claim() {
    let t = tokens(make_token(&json!({ "sub": "u1", "email": "claim@example.com" })));
    let s = Session::from_tokens(&t, Some("form@example.com")).unwrap();
    assert_eq!(s.email, "form@example.com");
}

#[test]
fn from_tokens_without_identifier_fails() {
    let t = tokens(make_token(&json!({ "role": "owner" })));
    assert_eq!(Session::from_tokens(&t, None), Err(TokenError::MissingIdentifierClaim));
}

// =============================================================================
// SessionStore
// =============================================================================

#[test]
fn set_user_mirrors_tokens_into_jar() {
    let jar = Arc::new(TokenJar::in_memory());
    let store = SessionStore::in_memory(Arc::clone(&jar));

    store.set_user(session("u1"));
    assert_eq!(jar.access_token().as_deref(), Some("access-u1"));
    assert_eq!(jar.refresh_token().as_deref(), Some("refresh-u1"));
    assert!(store.is_authenticated());
    assert_eq!(store.current().unwrap().user_id, "u1");
}

#[test]
fn current_tracks_refreshed_jar_tokens() {
    let jar = Arc::new(TokenJar::in_memory());
    let store = SessionStore::in_memory(Arc::clone(&jar));
    store.set_user(session("u1"));

    jar.set_access_token("access-new");
    jar.set_refresh_token("refresh-new");

    let current = store.current().unwrap();
    assert_eq!(current.access_token, "access-new");
    assert_eq!(current.refresh_token.as_deref(), Some("refresh-new"));
}

#[test]
fn session_without_jar_token_is_absent() {
    let jar = Arc::new(TokenJar::in_memory());
    let store = SessionStore::in_memory(Arc::clone(&jar));
    store.set_user(session("u1"));

    jar.clear_tokens();
    assert!(store.current().is_none());
}

#[test]
fn logout_clears_session_and_jar() {
    let jar = Arc::new(TokenJar::in_memory());
    let store = SessionStore::in_memory(Arc::clone(&jar));
    store.set_user(session("u1"));

    store.logout();
    assert!(store.current().is_none());
    assert_eq!(jar.access_token(), None);
    assert_eq!(jar.refresh_token(), None);
}

#[test]
fn loading_flag_round_trips() {
    let store = SessionStore::in_memory(Arc::new(TokenJar::in_memory()));
    assert!(!store.loading());
    store.set_loading(true);
    assert!(store.loading());
    assert!(store.snapshot().loading);
}

#[test]
fn reopen_restores_identity_when_jar_has_token() {
    let jar_path = temp_path("cookies.json");
    let session_path = temp_path("session.json");
    {
        let store = SessionStore::open(Arc::new(TokenJar::open(&jar_path)), &session_path);
        store.set_user(session("u7"));
    }

    let restored = SessionStore::open(Arc::new(TokenJar::open(&jar_path)), &session_path);
    let current = restored.current().unwrap();
    assert_eq!(current.user_id, "u7");
    assert_eq!(current.email, "chef@example.com");
    assert_eq!(current.access_token, "access-u7");
}

#[test]
fn reopen_without_jar_token_has_no_session() {
    let session_path = temp_path("session.json");
    {
        let store = SessionStore::open(Arc::new(TokenJar::in_memory()), &session_path);
        store.set_user(session("u7"));
    }

    let restored = SessionStore::open(Arc::new(TokenJar::in_memory()), &session_path);
    assert!(restored.current().is_none());
}

#[test]
fn persisted_file_holds_identity_only() {
    let session_path = temp_path("session.json");
    let store = SessionStore::open(Arc::new(TokenJar::in_memory()), &session_path);
    store.set_user(session("u7"));

    let raw: serde_json::Value = serde_json::from_slice(&std::fs::read(&session_path).unwrap()).unwrap();
    assert_eq!(raw, json!({ "userId": "u7", "email": "chef@example.com" }));
}

#[tokio::test]
async fn logout_broadcast_clears_store() {
    let jar = Arc::new(TokenJar::in_memory());
    let session_path = temp_path("session.json");
    let store = Arc::new(SessionStore::open(Arc::clone(&jar), &session_path));
    store.set_user(session("u1"));

    let events = SessionEvents::new();
    let listener = store.spawn_logout_listener(&events);

    events.emit(SessionEvent::LoggedOut);
    for _ in 0..100 {
        if store.state.lock().unwrap().session.is_none() {
            break;
        }
        tokio::task::yield_now().await;
    }

    assert!(store.state.lock().unwrap().session.is_none());
    assert!(!session_path.exists());
    listener.abort();
}
