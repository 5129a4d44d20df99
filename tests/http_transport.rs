//! Tests of the HTTP transport against a local server

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use calendar_client::config::ClientConfig;
use calendar_client::error::TransportError;
use calendar_client::storage::MemoryStorage;
use calendar_client::traits::Transport;
use calendar_client::{AuthStatus, Credentials, HttpTransport, SyncService};

async fn transport_for(server: &MockServer) -> HttpTransport {
    let _ = env_logger::builder().is_test(true).try_init();
    HttpTransport::new(format!("{}/api", server.uri())).unwrap()
}


#[tokio::test]
async fn test_token_header_and_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/events"))
        .and(header("x-token", "abc"))
        .and(body_json(json!({ "title": "Party" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "ok": true, "evento": { "id": "7" } })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server).await;
    let reply = transport.post("/events", json!({ "title": "Party" }), Some("abc".to_string())).await.unwrap();
    assert_eq!(reply["evento"]["id"], json!("7"));
}

#[tokio::test]
async fn test_custom_token_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/renew"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    let mut config = ClientConfig::new(format!("{}/api", server.uri()).parse().unwrap());
    config.token_header = String::from("authorization");
    let transport = HttpTransport::from_config(config);

    let reply = transport.get("/auth/renew", Some("Bearer abc".to_string())).await.unwrap();
    assert_eq!(reply, json!({ "ok": true }));
}

#[tokio::test]
async fn test_error_status_keeps_the_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/events/3"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "ok": false, "msg": "Event not found" })))
        .mount(&server)
        .await;

    let transport = transport_for(&server).await;
    let err = transport.delete("/events/3", Some("abc".to_string())).await.unwrap_err();
    match &err {
        TransportError::Status { status, .. } => assert_eq!(*status, 404),
        other => panic!("Unexpected error {:?}", other),
    }
    assert_eq!(err.server_message().as_deref(), Some("Event not found"));
}

#[tokio::test]
async fn test_invalid_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let transport = transport_for(&server).await;
    let err = transport.get("/events", None).await.unwrap_err();
    assert!(matches!(err, TransportError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_server() {
    let transport = HttpTransport::new("http://127.0.0.1:9/api").unwrap();
    let err = transport.get("/events", None).await.unwrap_err();
    assert!(matches!(err, TransportError::Network(_)));
}

#[tokio::test]
async fn test_login_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .and(body_json(json!({ "email": "test@example.com", "password": "123456" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "uid": "631af3b762fd420016ea2e3e",
            "name": "Test",
            "token": "a.jwt.token",
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "ok": false, "msg": "Bad credentials" })))
        .mount(&server)
        .await;

    let service = SyncService::new(transport_for(&server).await, MemoryStorage::new());

    assert_eq!(service.login(&Credentials::new("test@example.com", "wrong")).await, false);
    assert_eq!(service.session().error_message(), Some("Bad credentials"));

    assert!(service.login(&Credentials::new("test@example.com", "123456")).await);
    assert_eq!(service.session().status(), AuthStatus::Authenticated);
    assert_eq!(service.session().user().unwrap().uid, "631af3b762fd420016ea2e3e");
    assert_eq!(service.tokens().read().as_deref(), Some("a.jwt.token"));
}
