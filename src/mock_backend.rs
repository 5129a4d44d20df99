//! An in-memory backend, that can be used instead of a real server in tests
//!
//! It implements the same endpoints as the real backend: accounts, session tokens and event CRUD.
#![cfg(feature = "mocks")]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};

use crate::config::{EVENTS_PATH, LOGIN_PATH, REGISTER_PATH, RENEW_PATH};
use crate::error::TransportError;
use crate::event::{EventId, User};
use crate::mock_behaviour::MockBehaviour;
use crate::traits::{Request, Transport};
use crate::utils::lock;

pub const INVALID_CREDENTIALS_MSG: &str = "Invalid credentials";
pub const DUPLICATE_ACCOUNT_MSG: &str = "A user already exists with this email";
pub const MISSING_TOKEN_MSG: &str = "There is no token in the request";
pub const INVALID_TOKEN_MSG: &str = "Invalid token";
pub const EVENT_NOT_FOUND_MSG: &str = "No event has this id";
pub const NOT_OWNER_MSG: &str = "You are not allowed to change this event";


/// The endpoints the backend exposes
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login,
    Register,
    Renew,
    ListEvents,
    CreateEvent,
    UpdateEvent(EventId),
    DeleteEvent(EventId),
}

impl Endpoint {
    /// Find which endpoint a request targets
    pub fn route(method: &Method, path: &str) -> Option<Self> {
        let path = path.trim_end_matches('/');
        let event_id = path.strip_prefix(EVENTS_PATH)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|id| !id.is_empty() && !id.contains('/'))
            .map(EventId::from);

        if let Some(id) = event_id {
            return match method {
                m if *m == Method::PUT => Some(Endpoint::UpdateEvent(id)),
                m if *m == Method::DELETE => Some(Endpoint::DeleteEvent(id)),
                _ => None,
            };
        }

        match path {
            LOGIN_PATH if *method == Method::POST => Some(Endpoint::Login),
            REGISTER_PATH if *method == Method::POST => Some(Endpoint::Register),
            RENEW_PATH if *method == Method::GET => Some(Endpoint::Renew),
            EVENTS_PATH if *method == Method::GET => Some(Endpoint::ListEvents),
            EVENTS_PATH if *method == Method::POST => Some(Endpoint::CreateEvent),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Login => "login",
            Endpoint::Register => "register",
            Endpoint::Renew => "token renewal",
            Endpoint::ListEvents => "event listing",
            Endpoint::CreateEvent => "event creation",
            Endpoint::UpdateEvent(_) => "event update",
            Endpoint::DeleteEvent(_) => "event deletion",
        }
    }
}


struct Account {
    user: User,
    email: String,
    password: String,
}

struct StoredEvent {
    id: EventId,
    body: Value,
    owner: User,
}

impl StoredEvent {
    fn to_json(&self) -> Value {
        let mut value = self.body.clone();
        value["id"] = json!(self.id.as_str());
        value["user"] = json!({ "_id": self.owner.uid, "name": self.owner.name });
        value
    }
}

#[derive(Default)]
struct BackendState {
    accounts: Vec<Account>,
    /// Valid tokens, and the uid they have been issued to
    tokens: HashMap<String, String>,
    events: Vec<StoredEvent>,
    n_users: u32,
    n_events: u32,
}

/// What the backend answers to a request
pub type Reply = Result<Value, TransportError>;


/// A [`Transport`] that serves requests from memory
#[derive(Default)]
pub struct MockBackend {
    state: Mutex<BackendState>,
    behaviour: Mutex<MockBehaviour>,
    scripted: Mutex<HashMap<&'static str, VecDeque<Reply>>>,
    requests: Mutex<Vec<Request>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behaviour(behaviour: MockBehaviour) -> Self {
        let backend = Self::default();
        backend.set_behaviour(behaviour);
        backend
    }

    pub fn set_behaviour(&self, behaviour: MockBehaviour) {
        *lock(&self.behaviour) = behaviour;
    }

    /// The next request to `endpoint` (whatever the event id) will get this reply, instead of being served normally
    pub fn script(&self, endpoint: Endpoint, reply: Reply) {
        lock(&self.scripted)
            .entry(endpoint.name())
            .or_insert_with(VecDeque::new)
            .push_back(reply);
    }

    /// Create an account
    pub fn add_user(&self, name: &str, email: &str, password: &str) -> User {
        create_account(&mut lock(&self.state), name, email, password)
    }

    /// Issue a token, as if `user` had just logged in elsewhere
    pub fn issue_token(&self, user: &User) -> String {
        issue_token(&mut lock(&self.state), user)
    }

    /// Make a token invalid, as if it had expired
    pub fn expire_token(&self, token: &str) {
        lock(&self.state).tokens.remove(token);
    }

    pub fn event_count(&self) -> usize {
        lock(&self.state).events.len()
    }

    /// The requests this backend has received so far
    pub fn requests(&self) -> Vec<Request> {
        lock(&self.requests).clone()
    }

    fn serve(&self, endpoint: &Endpoint, request: &Request) -> Reply {
        let mut state = lock(&self.state);
        match endpoint {
            Endpoint::Login => login(&mut state, request),
            Endpoint::Register => register(&mut state, request),
            Endpoint::Renew => {
                let user = authorize(&state, request)?;
                let token = issue_token(&mut state, &user);
                Ok(json!({ "ok": true, "uid": user.uid, "name": user.name, "token": token }))
            },
            Endpoint::ListEvents => {
                authorize(&state, request)?;
                let events: Vec<Value> = state.events.iter().map(StoredEvent::to_json).collect();
                Ok(json!({ "ok": true, "eventos": events }))
            },
            Endpoint::CreateEvent => {
                let owner = authorize(&state, request)?;
                let body = event_body(request)?;
                state.n_events += 1;
                let stored = StoredEvent { id: EventId::from(state.n_events.to_string()), body, owner };
                let reply = json!({ "ok": true, "evento": stored.to_json() });
                state.events.push(stored);
                Ok(reply)
            },
            Endpoint::UpdateEvent(id) => {
                let user = authorize(&state, request)?;
                let body = event_body(request)?;
                let stored = owned_event(&mut state, id, &user)?;
                stored.body = body;
                Ok(json!({ "ok": true, "evento": stored.to_json() }))
            },
            Endpoint::DeleteEvent(id) => {
                let user = authorize(&state, request)?;
                owned_event(&mut state, id, &user)?;
                state.events.retain(|e| &e.id != id);
                Ok(json!({ "ok": true }))
            },
        }
    }
}

#[async_trait]
impl Transport for MockBackend {
    async fn send(&self, request: Request) -> Result<Value, TransportError> {
        log::debug!("Mock backend: {} {}", request.method, request.path);
        lock(&self.requests).push(request.clone());

        // Suspend like a network round-trip would, so that concurrent callers can interleave
        tokio::task::yield_now().await;

        let endpoint = match Endpoint::route(&request.method, &request.path) {
            None => return Err(status(404, "Unknown endpoint")),
            Some(endpoint) => endpoint,
        };

        lock(&self.behaviour).can_request(endpoint.clone())?;

        let scripted = lock(&self.scripted)
            .get_mut(endpoint.name())
            .and_then(|replies| replies.pop_front());
        if let Some(reply) = scripted {
            return reply;
        }

        self.serve(&endpoint, &request)
    }
}


fn status(code: u16, msg: &str) -> TransportError {
    TransportError::Status { status: code, body: Some(json!({ "ok": false, "msg": msg })) }
}

fn field_error(field: &str, msg: &str) -> TransportError {
    TransportError::Status { status: 400, body: Some(json!({
        "ok": false,
        "errors": { field: { "msg": msg, "param": field } },
    })) }
}

fn field<'a>(request: &'a Request, name: &str) -> Result<&'a str, TransportError> {
    request.body.as_ref()
        .and_then(|body| body.get(name))
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| field_error(name, &format!("The {} is mandatory", name)))
}

fn issue_token(state: &mut BackendState, user: &User) -> String {
    let token = uuid::Uuid::new_v4().to_hyphenated().to_string();
    state.tokens.insert(token.clone(), user.uid.clone());
    token
}

fn create_account(state: &mut BackendState, name: &str, email: &str, password: &str) -> User {
    state.n_users += 1;
    let user = User::new(format!("user-{}", state.n_users), name);
    state.accounts.push(Account {
        user: user.clone(),
        email: email.to_string(),
        password: password.to_string(),
    });
    user
}

fn login(state: &mut BackendState, request: &Request) -> Reply {
    let email = field(request, "email")?;
    let password = field(request, "password")?;

    let user = state.accounts.iter()
        .find(|account| account.email == email && account.password == password)
        .map(|account| account.user.clone())
        .ok_or_else(|| status(400, INVALID_CREDENTIALS_MSG))?;

    let token = issue_token(state, &user);
    Ok(json!({ "ok": true, "uid": user.uid, "name": user.name, "token": token }))
}

fn register(state: &mut BackendState, request: &Request) -> Reply {
    let name = field(request, "name")?;
    let email = field(request, "email")?;
    let password = field(request, "password")?;

    if state.accounts.iter().any(|account| account.email == email) {
        return Err(status(400, DUPLICATE_ACCOUNT_MSG));
    }

    let user = create_account(state, name, email, password);
    let token = issue_token(state, &user);
    Ok(json!({ "ok": true, "uid": user.uid, "name": user.name, "token": token }))
}

/// The user the token of this request has been issued to
fn authorize(state: &BackendState, request: &Request) -> Result<User, TransportError> {
    let token = request.token.as_ref().ok_or_else(|| status(401, MISSING_TOKEN_MSG))?;
    let uid = state.tokens.get(token).ok_or_else(|| status(401, INVALID_TOKEN_MSG))?;
    state.accounts.iter()
        .find(|account| &account.user.uid == uid)
        .map(|account| account.user.clone())
        .ok_or_else(|| status(401, INVALID_TOKEN_MSG))
}

fn event_body(request: &Request) -> Result<Value, TransportError> {
    let title = field(request, "title")?;
    let start = field(request, "start")?;
    let end = field(request, "end")?;
    let notes = request.body.as_ref()
        .and_then(|body| body.get("notes"))
        .and_then(Value::as_str)
        .unwrap_or("");
    Ok(json!({ "title": title, "notes": notes, "start": start, "end": end }))
}

fn owned_event<'a>(state: &'a mut BackendState, id: &EventId, user: &User) -> Result<&'a mut StoredEvent, TransportError> {
    let stored = state.events.iter_mut()
        .find(|e| &e.id == id)
        .ok_or_else(|| status(404, EVENT_NOT_FOUND_MSG))?;
    if stored.owner.uid != user.uid {
        return Err(status(401, NOT_OWNER_MSG));
    }
    Ok(stored)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing() {
        assert_eq!(Endpoint::route(&Method::POST, "/auth"), Some(Endpoint::Login));
        assert_eq!(Endpoint::route(&Method::POST, "/users"), Some(Endpoint::Register));
        assert_eq!(Endpoint::route(&Method::GET, "/auth/renew"), Some(Endpoint::Renew));
        assert_eq!(Endpoint::route(&Method::GET, "/events"), Some(Endpoint::ListEvents));
        assert_eq!(Endpoint::route(&Method::POST, "/events/"), Some(Endpoint::CreateEvent));
        assert_eq!(Endpoint::route(&Method::PUT, "/events/12"), Some(Endpoint::UpdateEvent("12".into())));
        assert_eq!(Endpoint::route(&Method::DELETE, "/events/12"), Some(Endpoint::DeleteEvent("12".into())));
        assert_eq!(Endpoint::route(&Method::DELETE, "/events"), None);
        assert_eq!(Endpoint::route(&Method::GET, "/users"), None);
    }

    #[tokio::test]
    async fn tokens() {
        let backend = MockBackend::new();
        let user = backend.add_user("Test", "test@example.com", "123456");

        let token = backend.issue_token(&user);
        let renewed = backend.get(RENEW_PATH, Some(token.clone())).await.unwrap();
        assert_eq!(renewed["uid"], json!(user.uid));

        backend.expire_token(&token);
        let err = backend.get(RENEW_PATH, Some(token)).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.server_message().as_deref(), Some(INVALID_TOKEN_MSG));

        assert_eq!(backend.requests().len(), 2);
    }

    #[tokio::test]
    async fn only_owners_edit_their_events() {
        let backend = MockBackend::new();
        let alice = backend.add_user("Alice", "alice@example.com", "123456");
        let bob = backend.add_user("Bob", "bob@example.com", "123456");
        let alice_token = Some(backend.issue_token(&alice));
        let bob_token = Some(backend.issue_token(&bob));

        let body = json!({ "title": "Party", "start": "2022-10-21T13:00:00.000Z", "end": "2022-10-21T15:00:00.000Z" });
        let created = backend.post(EVENTS_PATH, body.clone(), alice_token.clone()).await.unwrap();
        assert_eq!(created["evento"]["id"], json!("1"));

        let err = backend.put("/events/1", body.clone(), bob_token.clone()).await.unwrap_err();
        assert_eq!(err.server_message().as_deref(), Some(NOT_OWNER_MSG));
        let err = backend.delete("/events/2", alice_token.clone()).await.unwrap_err();
        assert_eq!(err.server_message().as_deref(), Some(EVENT_NOT_FOUND_MSG));

        let listed = backend.get(EVENTS_PATH, bob_token).await.unwrap();
        assert_eq!(listed["eventos"][0]["user"]["_id"], json!(alice.uid));

        backend.delete("/events/1", alice_token).await.unwrap();
        assert_eq!(backend.event_count(), 0);
    }

    #[tokio::test]
    async fn scripted_replies_come_first() {
        let backend = MockBackend::new();
        backend.script(Endpoint::CreateEvent, Ok(json!({ "ok": true, "evento": { "id": "9" } })));

        let reply = backend.post(EVENTS_PATH, json!({}), None).await.unwrap();
        assert_eq!(reply["evento"]["id"], json!("9"));

        // Not scripted anymore: this one has no token
        let err = backend.post(EVENTS_PATH, json!({}), None).await.unwrap_err();
        assert_eq!(err.server_message().as_deref(), Some(MISSING_TOKEN_MSG));
    }

    #[tokio::test]
    async fn missing_fields() {
        let backend = MockBackend::new();
        let err = backend.post(REGISTER_PATH, json!({ "name": "Test", "password": "123456" }), None).await.unwrap_err();
        assert_eq!(err.server_message().as_deref(), Some("The email is mandatory"));
    }
}
