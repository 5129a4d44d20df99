//! Calendar events

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// The identifier the server assigned to an event
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EventId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Display for EventId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}


/// A user of the backend, as seen by this client
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The server-side identifier of this user.
    /// Events sent by the server spell it `_id`
    #[serde(alias = "_id")]
    pub uid: String,
    pub name: String,
}

impl User {
    pub fn new<S: ToString, T: ToString>(uid: S, name: T) -> Self {
        Self { uid: uid.to_string(), name: name.to_string() }
    }
}


/// A calendar event
#[derive(Clone, Debug, PartialEq)]
pub struct CalendarEvent {
    /// `None` until the server has stored this event
    pub id: Option<EventId>,
    pub title: String,
    pub notes: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// The user this event belongs to.
    /// This is only a back-reference, used to tell whose event this is
    pub owner: Option<User>,
}

impl CalendarEvent {
    /// Create an event that is not on the server yet
    pub fn new<S: ToString, T: ToString>(title: S, notes: T, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            notes: notes.to_string(),
            start,
            end,
            owner: None,
        }
    }

    pub fn with_id<I: Into<EventId>>(mut self, id: I) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_owner(mut self, owner: User) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Whether this event has already been stored by the server
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Whether `user` owns this event (used to tell the user's own events apart from the others)
    pub fn is_owned_by(&self, user: &User) -> bool {
        self.owner.as_ref().map(|owner| owner.uid == user.uid).unwrap_or(false)
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}
