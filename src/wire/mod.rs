//! This module handles conversion between the JSON bodies the backend exchanges and internal representations
//!
//! Dates are ISO-8601 strings on the wire, and [`chrono::DateTime`]s in memory.

mod parser;
pub use parser::{parse, parse_event, parse_instant};
mod builder;
pub use builder::{build_from, format_instant};

use serde::{Deserialize, Serialize};

use crate::event::User;


/// An event, as the server sends it
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RawEvent {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub start: String,
    pub end: String,
    #[serde(default, rename = "user")]
    pub owner: Option<User>,
}

/// An event, as the server expects it in create and update requests
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RawEventBody {
    pub title: String,
    pub notes: String,
    pub start: String,
    pub end: String,
}

/// Body of `GET /events`
#[derive(Debug, Deserialize)]
pub struct EventListResponse {
    #[serde(rename = "eventos")]
    pub events: Vec<RawEvent>,
}

/// Body of `POST /events` and `PUT /events/:id`
#[derive(Debug, Deserialize)]
pub struct SavedEventResponse {
    #[serde(rename = "evento")]
    pub event: SavedEvent,
}

#[derive(Debug, Deserialize)]
pub struct SavedEvent {
    #[serde(alias = "_id")]
    pub id: String,
}


/// What a user types in to log in
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new<S: ToString, T: ToString>(email: S, password: T) -> Self {
        Self { email: email.to_string(), password: password.to_string() }
    }
}

/// What a user types in to create an account
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    pub fn new<S: ToString, T: ToString, U: ToString>(name: S, email: T, password: U) -> Self {
        Self { name: name.to_string(), email: email.to_string(), password: password.to_string() }
    }
}

/// Body of `POST /auth`, `POST /users` and `GET /auth/renew`
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AuthResponse {
    pub uid: String,
    pub name: String,
    pub token: String,
}

impl AuthResponse {
    pub fn user(&self) -> User {
        User::new(&self.uid, &self.name)
    }
}
