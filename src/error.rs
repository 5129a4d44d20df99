//! Error types of this crate

use serde_json::Value;
use thiserror::Error;

use crate::event::EventId;

/// Malformed data, fatal to the single operation that met it
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("field `{field}` is not a valid ISO-8601 date ({value:?}): {source}")]
    InvalidDate {
        field: &'static str,
        value: String,
        source: chrono::ParseError,
    },

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("the event ends before it starts")]
    EndBeforeStart,
}

/// A failed exchange with the backend
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected HTTP status code {status}")]
    Status {
        status: u16,
        body: Option<Value>,
    },

    #[error("unable to decode the response: {0}")]
    Decode(String),

    #[error("no session token is available for this request")]
    MissingToken,
}

impl TransportError {
    /// The human-readable message the server put in its response body, if any.
    ///
    /// This is the `msg` field, or the first `errors.<field>.msg` entry that field validation produces.
    pub fn server_message(&self) -> Option<String> {
        let body = match self {
            TransportError::Status { body: Some(body), .. } => body,
            _ => return None,
        };

        if let Some(msg) = body.get("msg").and_then(Value::as_str) {
            return Some(msg.to_string());
        }

        body.get("errors")
            .and_then(Value::as_object)
            .and_then(|errors| errors.values().find_map(|e| e.get("msg").and_then(Value::as_str)))
            .map(str::to_string)
    }

    /// Whether the backend rejected the request because of the session token
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, TransportError::Status { status: 401, .. } | TransportError::MissingToken)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Decode(err.to_string())
    }
}

/// A store transition that would break an invariant of the event collection.
///
/// The store is left unchanged when this is returned.
#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("the event has no identifier yet")]
    MissingId,

    #[error("an event with id {0} already exists")]
    DuplicateId(EventId),

    #[error("no event with id {0}")]
    NotFound(EventId),
}

/// Any error an event operation of the [`SyncService`](crate::sync::SyncService) can meet
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SyncError {
    /// See [`TransportError::server_message`]
    pub fn server_message(&self) -> Option<String> {
        match self {
            SyncError::Transport(err) => err.server_message(),
            _ => None,
        }
    }
}
