//! Session scenarios: logging in, registering, re-validating a stored token and logging out

use chrono::{TimeZone, Utc};
use serde_json::json;

use calendar_client::error::TransportError;
use calendar_client::mock_backend::{Endpoint, MockBackend, DUPLICATE_ACCOUNT_MSG, INVALID_CREDENTIALS_MSG};
use calendar_client::mock_behaviour::MockBehaviour;
use calendar_client::storage::MemoryStorage;
use calendar_client::sync::feedback::{feedback_channel, Notification};
use calendar_client::sync::GENERIC_AUTH_ERROR;
use calendar_client::{AuthStatus, CalendarEvent, Credentials, NewUser, Session, SyncService, User};

const EMAIL: &str = "test@example.com";
const PASSWORD: &str = "123456";

fn service_with_test_user() -> (SyncService<MockBackend, MemoryStorage>, User) {
    let _ = env_logger::builder().is_test(true).try_init();

    let backend = MockBackend::new();
    let user = backend.add_user("Test", EMAIL, PASSWORD);
    (SyncService::new(backend, MemoryStorage::new()), user)
}


#[tokio::test]
async fn test_initial_state() {
    let (service, _) = service_with_test_user();
    let session = service.session();
    assert_eq!(session.status(), AuthStatus::Checking);
    assert_eq!(session.user(), None);
    assert_eq!(session.error_message(), None);
}

#[tokio::test]
async fn test_login() {
    let (service, user) = service_with_test_user();

    assert!(service.login(&Credentials::new(EMAIL, PASSWORD)).await);

    assert_eq!(service.session(), Session::authenticated(user.clone()));
    assert!(service.session().user().unwrap().uid.is_empty() == false);
    let token = service.tokens().read().unwrap();
    assert!(token.is_empty() == false);
    assert!(service.tokens().issued_at().is_some());

    // The token is sent with later requests
    service.load_events().await;
    let last_request = service.transport().requests().pop().unwrap();
    assert_eq!(last_request.token, Some(token));
}

#[tokio::test]
async fn test_login_with_invalid_credentials() {
    let (service, _) = service_with_test_user();

    assert_eq!(service.login(&Credentials::new(EMAIL, "wrong password")).await, false);

    assert_eq!(service.session(), Session::not_authenticated(Some(INVALID_CREDENTIALS_MSG.to_string())));
    assert_eq!(service.tokens().read(), None);

    // The next transition clears the message
    assert!(service.login(&Credentials::new(EMAIL, PASSWORD)).await);
    assert_eq!(service.session().error_message(), None);
}

#[tokio::test]
async fn test_login_without_network() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut service = SyncService::new(MockBackend::with_behaviour(MockBehaviour::fail_now(1)), MemoryStorage::new());
    let (sender, receiver) = feedback_channel();
    service.set_feedback_channel(sender);

    assert_eq!(service.login(&Credentials::new(EMAIL, PASSWORD)).await, false);

    assert_eq!(service.session(), Session::not_authenticated(Some(GENERIC_AUTH_ERROR.to_string())));
    assert_eq!(*receiver.borrow(), Notification::AuthFailed { message: GENERIC_AUTH_ERROR.to_string() });
}

#[tokio::test]
async fn test_register() {
    let (service, _) = service_with_test_user();

    assert!(service.register(&NewUser::new("New User", "new@example.com", "abcdef")).await);

    let session = service.session();
    assert_eq!(session.status(), AuthStatus::Authenticated);
    assert_eq!(session.user().unwrap().name, "New User");
    assert!(service.tokens().read().is_some());

    // The new account can log in
    service.logout();
    assert!(service.login(&Credentials::new("new@example.com", "abcdef")).await);
}

#[tokio::test]
async fn test_register_an_existing_account() {
    let (service, _) = service_with_test_user();

    assert_eq!(service.register(&NewUser::new("Test again", EMAIL, PASSWORD)).await, false);

    assert_eq!(service.session(), Session::not_authenticated(Some(DUPLICATE_ACCOUNT_MSG.to_string())));
    assert_eq!(service.tokens().read(), None);
}

#[tokio::test]
async fn test_register_error_message_is_verbatim() {
    let (service, _) = service_with_test_user();
    service.transport().script(Endpoint::Register, Err(TransportError::Status {
        status: 400,
        body: Some(json!({ "ok": false, "msg": "Un usuario existe con ese correo" })),
    }));

    assert_eq!(service.register(&NewUser::new("Test", EMAIL, PASSWORD)).await, false);

    let session = service.session();
    assert_eq!(session.status(), AuthStatus::NotAuthenticated);
    assert_eq!(session.error_message(), Some("Un usuario existe con ese correo"));
    assert_eq!(session.user(), None);
}

#[tokio::test]
async fn test_check_token_without_token() {
    let (service, _) = service_with_test_user();

    assert_eq!(service.check_token().await, false);

    assert_eq!(service.session(), Session::not_authenticated(None));
    assert!(service.transport().requests().is_empty());
}

#[tokio::test]
async fn test_check_token_with_valid_token() {
    let (service, user) = service_with_test_user();
    let token = service.transport().issue_token(&user);
    service.tokens().save(&token);

    assert!(service.check_token().await);

    assert_eq!(service.session(), Session::authenticated(user));
    let renewed = service.tokens().read().unwrap();
    assert_ne!(renewed, token);
}

#[tokio::test]
async fn test_check_token_with_expired_token() {
    let (service, user) = service_with_test_user();
    let token = service.transport().issue_token(&user);
    service.tokens().save(&token);
    service.transport().expire_token(&token);

    assert_eq!(service.check_token().await, false);

    assert_eq!(service.session(), Session::not_authenticated(None));
    assert_eq!(service.tokens().read(), None);
    assert_eq!(service.tokens().issued_at(), None);
}

#[tokio::test]
async fn test_logout() {
    let (service, user) = service_with_test_user();
    assert!(service.login(&Credentials::new(EMAIL, PASSWORD)).await);
    let start = Utc.with_ymd_and_hms(2022, 10, 21, 13, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2022, 10, 21, 15, 0, 0).unwrap();
    assert!(service.save_event(CalendarEvent::new("Party", "", start, end), &user).await);
    {
        let store = service.event_store();
        let mut store = store.lock().unwrap();
        let first = store.events()[0].clone();
        store.set_active(first);
    }

    service.logout();

    assert_eq!(service.session(), Session::not_authenticated(None));
    assert!(service.events().is_empty());
    let store = service.event_store();
    let store = store.lock().unwrap();
    assert_eq!(store.active_event(), None);
    assert!(store.is_loading());
    assert_eq!(service.tokens().read(), None);
}

#[tokio::test]
async fn test_logout_from_any_state() {
    let (service, _) = service_with_test_user();
    service.logout();
    assert_eq!(service.session(), Session::not_authenticated(None));
    assert_eq!(service.tokens().read(), None);

    assert_eq!(service.login(&Credentials::new(EMAIL, "nope")).await, false);
    service.logout();
    assert_eq!(service.session(), Session::not_authenticated(None));
}

#[tokio::test]
async fn test_logout_during_token_check() {
    let (service, user) = service_with_test_user();
    let token = service.transport().issue_token(&user);
    service.tokens().save(&token);

    // The logout happens while the validation request is in flight
    let (validated, _) = tokio::join!(
        service.check_token(),
        async { service.logout() },
    );

    assert_eq!(validated, false);
    assert_eq!(service.session(), Session::not_authenticated(None));
    assert_eq!(service.tokens().read(), None);
}
