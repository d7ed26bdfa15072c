use mockito::Matcher;
use serde_json::json;
use spotify_lyrics_ratui::auth::token::{ACCESS_TOKEN_KEY, ALL_KEYS, EXPIRES_AT_KEY};
use spotify_lyrics_ratui::auth::{
    FileTokenStorage, ManualClock, MemoryTokenStorage, Session, SystemClock, TokenResponse,
    TokenStorage,
};
use spotify_lyrics_ratui::backend::BackendClient;
use spotify_lyrics_ratui::config::ClientConfig;
use spotify_lyrics_ratui::settings::AppSettings;
use std::sync::Arc;
use std::time::Duration;

fn backend(url: &str) -> BackendClient {
    let cfg = ClientConfig {
        backend_url: url.to_owned(),
        ..ClientConfig::default()
    };
    BackendClient::new(cfg, &AppSettings::default()).expect("backend client")
}

fn tokens(access: &str, expires_in: u64) -> TokenResponse {
    TokenResponse {
        access_token: access.to_owned(),
        refresh_token: Some("R".to_owned()),
        expires_in,
    }
}

#[tokio::test]
async fn expired_token_is_refreshed_once() {
    let mut server = mockito::Server::new_async().await;
    let refresh = server
        .mock("POST", "/api/refresh")
        .match_body(Matcher::Json(json!({"refresh_token": "R"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"B","expires_in":3600}"#)
        .expect(1)
        .create_async()
        .await;

    let clock = Arc::new(ManualClock::new(1_000_000));
    let storage = Arc::new(MemoryTokenStorage::new());
    let session = Session::new(backend(&server.url()), storage.clone(), clock.clone());
    session.store().set_tokens(&tokens("A", 3600)).await;

    clock.advance(Duration::from_secs(3599));
    assert_eq!(session.access_token().await.as_deref(), Some("A"));

    clock.advance(Duration::from_secs(2));
    assert_eq!(session.access_token().await.as_deref(), Some("B"));
    assert_eq!(session.access_token().await.as_deref(), Some("B"));

    refresh.assert_async().await;
    assert_eq!(storage.get(ACCESS_TOKEN_KEY).as_deref(), Some("B"));
    // 刷新响应没有新的 refresh token 时保留旧的
    assert_eq!(session.store().refresh_token().await.as_deref(), Some("R"));
    assert_eq!(
        storage.get(EXPIRES_AT_KEY),
        Some((1_000_000 + 3601 * 1000 + 3600 * 1000).to_string())
    );
}

#[tokio::test]
async fn refresh_failure_logs_out() {
    let mut server = mockito::Server::new_async().await;
    let refresh = server
        .mock("POST", "/api/refresh")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"invalid_grant"}"#)
        .expect(1)
        .create_async()
        .await;
    let logout = server
        .mock("POST", "/api/logout")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let clock = Arc::new(ManualClock::new(0));
    let storage = Arc::new(MemoryTokenStorage::new());
    let session = Session::new(backend(&server.url()), storage.clone(), clock.clone());
    session.store().set_tokens(&tokens("A", 60)).await;
    let mut rx = session.subscribe();
    rx.borrow_and_update();

    clock.advance(Duration::from_secs(61));
    assert_eq!(session.access_token().await, None);
    assert!(!session.is_logged_in());
    assert!(rx.has_changed().expect("sender alive"));
    assert_eq!(*rx.borrow_and_update(), None);
    for key in ALL_KEYS {
        assert_eq!(storage.get(key), None);
    }

    refresh.assert_async().await;
    logout.assert_async().await;
}

#[tokio::test]
async fn logout_clears_everything_and_skips_network_afterwards() {
    let mut server = mockito::Server::new_async().await;
    let logout = server
        .mock("POST", "/api/logout")
        .match_body(Matcher::Json(json!({"refresh_token": "R"})))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/refresh")
        .expect(0)
        .create_async()
        .await;

    let storage = Arc::new(MemoryTokenStorage::new());
    let session = Session::new(
        backend(&server.url()),
        storage.clone(),
        Arc::new(ManualClock::new(0)),
    );
    session.store().set_tokens(&tokens("A", 3600)).await;
    assert!(session.is_logged_in());

    session.logout().await;
    assert!(!session.is_logged_in());
    for key in ALL_KEYS {
        assert_eq!(storage.get(key), None, "{key} should be removed");
    }
    assert_eq!(session.access_token().await, None);

    logout.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn logout_succeeds_locally_when_backend_is_down() {
    let storage = Arc::new(MemoryTokenStorage::new());
    let session = Session::new(
        backend("http://127.0.0.1:9"),
        storage.clone(),
        Arc::new(ManualClock::new(0)),
    );
    session.store().set_tokens(&tokens("A", 3600)).await;

    session.logout().await;
    assert!(!session.is_logged_in());
    assert_eq!(storage.get(ACCESS_TOKEN_KEY), None);
}

#[tokio::test]
async fn login_persists_tokens_across_restarts() {
    let mut server = mockito::Server::new_async().await;
    let token = server
        .mock("POST", "/api/token")
        .match_body(Matcher::Json(json!({"code": "abc"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"A","refresh_token":"R","expires_in":3600}"#)
        .expect(1)
        .create_async()
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    {
        let storage = Arc::new(FileTokenStorage::open(dir.path()).expect("storage"));
        let session = Session::new(backend(&server.url()), storage, Arc::new(SystemClock));
        session.login("abc").await.expect("login");
        assert!(session.is_logged_in());
    }

    let storage = Arc::new(FileTokenStorage::open(dir.path()).expect("storage"));
    let session = Session::new(backend(&server.url()), storage, Arc::new(SystemClock));
    assert!(session.restore().await);
    assert_eq!(session.access_token().await.as_deref(), Some("A"));
    token.assert_async().await;
}

#[tokio::test]
async fn login_rejects_response_without_access_token() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"expires_in":3600}"#)
        .create_async()
        .await;

    let session = Session::new(
        backend(&server.url()),
        Arc::new(MemoryTokenStorage::new()),
        Arc::new(SystemClock),
    );
    assert!(session.login("abc").await.is_err());
    assert!(!session.is_logged_in());
}

#[tokio::test]
async fn restore_with_only_refresh_token_refreshes() {
    let mut server = mockito::Server::new_async().await;
    let refresh = server
        .mock("POST", "/api/refresh")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"B","refresh_token":"R2","expires_in":3600}"#)
        .expect(1)
        .create_async()
        .await;

    let storage = Arc::new(MemoryTokenStorage::new());
    storage.set("refresh_token", "R").expect("set");
    let session = Session::new(
        backend(&server.url()),
        storage.clone(),
        Arc::new(ManualClock::new(0)),
    );

    assert!(session.restore().await);
    assert_eq!(session.access_token().await.as_deref(), Some("B"));
    assert_eq!(storage.get("refresh_token").as_deref(), Some("R2"));
    refresh.assert_async().await;
}

#[tokio::test]
async fn proactive_refresh_runs_before_expiry() {
    let mut server = mockito::Server::new_async().await;
    let refresh = server
        .mock("POST", "/api/refresh")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"B","expires_in":3600}"#)
        .expect(1)
        .create_async()
        .await;

    let session = Arc::new(Session::new(
        backend(&server.url()),
        Arc::new(MemoryTokenStorage::new()),
        Arc::new(SystemClock),
    ));
    session.store().set_tokens(&tokens("A", 2)).await;

    let mut rx = session.subscribe();
    rx.borrow_and_update();
    let _timer = session.spawn_refresh_timer(Duration::from_secs(60));

    tokio::time::timeout(Duration::from_secs(5), rx.changed())
        .await
        .expect("refresh in time")
        .expect("sender alive");
    assert_eq!(session.access_token().await.as_deref(), Some("B"));
    refresh.assert_async().await;
}

#[tokio::test]
async fn remaining_validity_refreshes_expired_token() {
    let mut server = mockito::Server::new_async().await;
    let refresh = server
        .mock("POST", "/api/refresh")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"B","expires_in":3600}"#)
        .expect(1)
        .create_async()
        .await;

    let clock = Arc::new(ManualClock::new(0));
    let session = Session::new(
        backend(&server.url()),
        Arc::new(MemoryTokenStorage::new()),
        clock.clone(),
    );
    session.store().set_tokens(&tokens("A", 60)).await;
    assert_eq!(
        session.remaining_validity().await,
        Some(Duration::from_secs(60))
    );

    clock.advance(Duration::from_secs(120));
    assert_eq!(
        session.remaining_validity().await,
        Some(Duration::from_secs(3600))
    );
    refresh.assert_async().await;
}

#[tokio::test]
async fn remaining_validity_is_none_when_refresh_fails() {
    let mut server = mockito::Server::new_async().await;
    let refresh = server
        .mock("POST", "/api/refresh")
        .with_status(400)
        .with_body(r#"{"error":"invalid_grant"}"#)
        .expect(1)
        .create_async()
        .await;
    let _logout = server
        .mock("POST", "/api/logout")
        .with_status(200)
        .create_async()
        .await;

    let clock = Arc::new(ManualClock::new(0));
    let session = Session::new(
        backend(&server.url()),
        Arc::new(MemoryTokenStorage::new()),
        clock.clone(),
    );
    session.store().set_tokens(&tokens("A", 60)).await;

    clock.advance(Duration::from_secs(60));
    assert_eq!(session.remaining_validity().await, None);
    assert!(!session.is_logged_in());
    refresh.assert_async().await;
}
