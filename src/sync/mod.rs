//! This module drives the local stores from the outcome of the requests made to the backend
//!
//! Stores are only updated once the server has confirmed an operation: a failed request never leaves partial data behind.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{EVENTS_PATH, LOGIN_PATH, REGISTER_PATH, RENEW_PATH};
use crate::error::{SyncError, TransportError, ValidationError};
use crate::event::{CalendarEvent, EventId, User};
use crate::events::EventStore;
use crate::session::{Session, SessionStore};
use crate::token::TokenPersistence;
use crate::traits::{KeyValueStore, Transport};
use crate::utils::lock;
use crate::wire::{self, AuthResponse, Credentials, EventListResponse, NewUser, SavedEventResponse};

pub mod feedback;
use feedback::{Feedback, FeedbackSender, Notification};

/// The message shown when an authentication request failed without the server saying why
pub const GENERIC_AUTH_ERROR: &str = "Authentication failed";


/// Keeps the session and event stores in line with the backend.
///
/// Every method can be called concurrently with the others. Each call owns its own request, and commits its outcome
/// to the stores in a single transition, computed from the current store content once the response has arrived. \
/// Errors never escape from this type: they are logged, then turned into a session error message or a [`Notification`],
/// and the methods return whether they succeeded.
///
/// Event operations only commit their outcome if the session they started in is still the current one:
/// a response that arrives after a logout (or after another login) is discarded.
pub struct SyncService<T, S>
where
    T: Transport,
    S: KeyValueStore,
{
    transport: T,
    tokens: TokenPersistence<S>,
    session: Arc<Mutex<SessionStore>>,
    events: Arc<Mutex<EventStore>>,
    feedback_sender: Option<FeedbackSender>,
    /// Bumped every time the logged-in user may change
    session_epoch: AtomicU64,
}

impl<T, S> SyncService<T, S>
where
    T: Transport,
    S: KeyValueStore,
{
    /// Create a service with fresh stores (the session is still being checked, and no event is loaded)
    pub fn new(transport: T, storage: S) -> Self {
        Self::with_stores(
            transport,
            TokenPersistence::new(storage),
            Arc::new(Mutex::new(SessionStore::new())),
            Arc::new(Mutex::new(EventStore::new())),
        )
    }

    /// Create a service that drives existing stores
    pub fn with_stores(transport: T, tokens: TokenPersistence<S>, session: Arc<Mutex<SessionStore>>, events: Arc<Mutex<EventStore>>) -> Self {
        Self { transport, tokens, session, events, feedback_sender: None, session_epoch: AtomicU64::new(0) }
    }

    /// Send the notifications to this channel. See [`feedback::feedback_channel`]
    pub fn set_feedback_channel(&mut self, sender: FeedbackSender) {
        self.feedback_sender = Some(sender);
    }

    pub fn transport(&self) -> &T { &self.transport }
    pub fn tokens(&self) -> &TokenPersistence<S> { &self.tokens }
    pub fn session_store(&self) -> Arc<Mutex<SessionStore>> { Arc::clone(&self.session) }
    pub fn event_store(&self) -> Arc<Mutex<EventStore>> { Arc::clone(&self.events) }

    /// A snapshot of the current session
    pub fn session(&self) -> Session {
        lock(&self.session).session().clone()
    }

    /// The current user, if someone is logged in
    pub fn current_user(&self) -> Option<User> {
        lock(&self.session).user().cloned()
    }

    /// A snapshot of the current events
    pub fn events(&self) -> Vec<CalendarEvent> {
        lock(&self.events).events().to_vec()
    }

    fn feedback(&self) -> Feedback<'_> {
        Feedback::new_with_feedback_channel(self.feedback_sender.as_ref())
    }

    fn current_epoch(&self) -> u64 {
        self.session_epoch.load(Ordering::SeqCst)
    }

    fn new_epoch(&self) {
        self.session_epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Whether the session an operation started in has ended while its request was in flight
    fn session_ended(&self, epoch: u64) -> bool {
        self.current_epoch() != epoch
    }


    /// Validate the stored token against the backend.
    ///
    /// Without a stored token, the session is immediately marked as not authenticated. \
    /// A response is discarded in case the stored token has changed while it was in flight (e.g. a logout happened meanwhile).
    pub async fn check_token(&self) -> bool {
        let token = match self.tokens.read() {
            None => {
                log::debug!("No stored token");
                lock(&self.session).set_not_authenticated(None);
                return false;
            },
            Some(token) => token,
        };

        let result = self.renew(&token).await;

        if self.tokens.read().as_deref() != Some(token.as_str()) {
            log::info!("The stored token has changed during its validation. Ignoring the validation result");
            return false;
        }

        match result {
            Ok(auth) => {
                self.tokens.save(&auth.token);
                lock(&self.session).set_authenticated(auth.user());
                true
            },
            Err(err) => {
                log::warn!("The stored token is not valid anymore: {}", err);
                self.tokens.clear();
                lock(&self.session).set_not_authenticated(None);
                false
            },
        }
    }

    async fn renew(&self, token: &str) -> Result<AuthResponse, TransportError> {
        let value = self.transport.get(RENEW_PATH, Some(token.to_string())).await?;
        decode(value)
    }

    /// Log in. On success, the session token is stored
    pub async fn login(&self, credentials: &Credentials) -> bool {
        self.authenticate("log in", LOGIN_PATH, serde_json::to_value(credentials)).await
    }

    /// Create an account, and log in with it
    pub async fn register(&self, new_user: &NewUser) -> bool {
        self.authenticate("register", REGISTER_PATH, serde_json::to_value(new_user)).await
    }

    async fn authenticate(&self, action: &str, path: &str, body: serde_json::Result<Value>) -> bool {
        self.new_epoch();
        lock(&self.session).set_checking();

        match self.request_token(path, body).await {
            Ok(auth) => {
                log::info!("Logged in as {}", auth.name);
                self.tokens.save(&auth.token);
                lock(&self.session).set_authenticated(auth.user());
                true
            },
            Err(err) => {
                log::warn!("Unable to {}: {}", action, err);
                let message = err.server_message().unwrap_or_else(|| GENERIC_AUTH_ERROR.to_string());
                lock(&self.session).set_not_authenticated(Some(message.clone()));
                self.feedback().notify(Notification::AuthFailed { message });
                false
            },
        }
    }

    async fn request_token(&self, path: &str, body: serde_json::Result<Value>) -> Result<AuthResponse, TransportError> {
        let value = self.transport.post(path, body?, None).await?;
        decode(value)
    }

    /// Log out.
    ///
    /// The token is wiped before the stores are reset, so that a token validation that is still in flight cannot authenticate again
    pub fn logout(&self) {
        self.new_epoch();
        self.tokens.clear();
        lock(&self.session).logout(None);
        lock(&self.events).clear();
        log::info!("Logged out");
    }


    /// Replace the local events with the ones of the server.
    ///
    /// In case of failure, the local events are left as they were
    pub async fn load_events(&self) -> bool {
        let epoch = self.current_epoch();
        let mut feedback = self.feedback();
        match self.fetch_events().await {
            Ok(_) if self.session_ended(epoch) => {
                feedback.info("The session has ended while the events were loading. Discarding them");
                return false;
            },
            Ok(events) => {
                feedback.debug(&format!("Loaded {} events", events.len()));
                lock(&self.events).load(events);
            },
            Err(err) => {
                feedback.error(
                    Notification::LoadFailed { details: err.server_message() },
                    &format!("Unable to load events: {}", err));
            },
        }
        feedback.is_success()
    }

    async fn fetch_events(&self) -> Result<Vec<CalendarEvent>, SyncError> {
        let value = self.transport.get(EVENTS_PATH, self.tokens.read()).await?;
        let list: EventListResponse = decode(value)?;
        Ok(wire::parse(list.events)?)
    }

    /// Update an event that has an id, or create one that has none.
    ///
    /// `owner` is stamped on the saved event. It is the user that was logged in when the edition started,
    /// so that a logout in the meantime cannot assign the event to someone else. \
    /// The local events are only changed once the server has confirmed the change.
    pub async fn save_event(&self, event: CalendarEvent, owner: &User) -> bool {
        let epoch = self.current_epoch();
        let mut feedback = self.feedback();
        match self.push_event(event, owner, epoch, &mut feedback).await {
            Ok(None) => {
                feedback.info("The session has ended while the event was being saved. The local events are left as they are");
                return false;
            },
            Ok(Some(saved)) => feedback.debug(&format!("Event {:?} saved", saved.title)),
            Err(err) => {
                feedback.error(
                    Notification::SaveFailed { details: err.server_message() },
                    &format!("Unable to save event: {}", err));
            },
        }
        feedback.is_success()
    }

    /// Send the event, and commit it locally. Returns `None` in case the session ended in the meantime
    async fn push_event(&self, event: CalendarEvent, owner: &User, epoch: u64, feedback: &mut Feedback<'_>) -> Result<Option<CalendarEvent>, SyncError> {
        validate(&event)?;
        let body = serde_json::to_value(wire::build_from(&event)).map_err(TransportError::from)?;
        let token = self.tokens.read();

        match event.id.clone() {
            Some(id) => {
                self.transport.put(&event_path(&id), body, token).await?;
                if self.session_ended(epoch) {
                    return Ok(None);
                }
                let saved = CalendarEvent { owner: Some(owner.clone()), ..event };
                if let Err(err) = lock(&self.events).update(saved.clone()) {
                    feedback.warn(&format!("Event {} has been updated on the server but not locally ({}). The next load will fix it", id, err));
                }
                Ok(Some(saved))
            },
            None => {
                let value = self.transport.post(EVENTS_PATH, body, token).await?;
                let response: SavedEventResponse = decode(value)?;
                if self.session_ended(epoch) {
                    return Ok(None);
                }
                let saved = CalendarEvent {
                    id: Some(EventId::from(response.event.id)),
                    owner: Some(owner.clone()),
                    ..event
                };
                if let Err(err) = lock(&self.events).add_new(saved.clone()) {
                    feedback.warn(&format!("Event has been created on the server but not locally ({}). The next load will fix it", err));
                }
                Ok(Some(saved))
            },
        }
    }

    /// Delete the active event.
    ///
    /// Does nothing (and returns `false`) in case no stored event is selected
    pub async fn delete_event(&self) -> bool {
        let epoch = self.current_epoch();
        let id = match lock(&self.events).active_event().and_then(|event| event.id.clone()) {
            None => {
                log::debug!("No saved event is selected, there is nothing to delete");
                return false;
            },
            Some(id) => id,
        };

        let mut feedback = self.feedback();
        match self.transport.delete(&event_path(&id), self.tokens.read()).await {
            Ok(_) if self.session_ended(epoch) => {
                feedback.info(&format!("The session has ended while event {} was being deleted. The local events are left as they are", id));
                return false;
            },
            Ok(_) => {
                let mut events = lock(&self.events);
                let still_active = events.active_event().and_then(|event| event.id.as_ref()) == Some(&id);
                let removed = if still_active { events.delete() } else { events.remove(&id) };
                if removed.is_none() {
                    feedback.warn(&format!("Event {} has been deleted on the server, but was not in the local events", id));
                }
            },
            Err(err) => {
                feedback.error(
                    Notification::DeleteFailed { details: err.server_message() },
                    &format!("Unable to delete event {}: {}", id, err));
            },
        }
        feedback.is_success()
    }
}


fn event_path(id: &EventId) -> String {
    format!("{}/{}", EVENTS_PATH, id)
}

fn decode<D: DeserializeOwned>(value: Value) -> Result<D, TransportError> {
    Ok(serde_json::from_value(value)?)
}

/// Checks what the server would refuse anyway, before sending anything
fn validate(event: &CalendarEvent) -> Result<(), ValidationError> {
    if event.title.trim().is_empty() {
        return Err(ValidationError::MissingField("title"));
    }
    if event.end < event.start {
        return Err(ValidationError::EndBeforeStart);
    }
    Ok(())
}
