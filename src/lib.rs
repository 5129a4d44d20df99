//! This crate keeps the client-side view of a calendar backend consistent with the server.
//!
//! It tracks "who is logged in" in a [`SessionStore`](session::SessionStore), and "what events exist" in an [`EventStore`](events::EventStore).
//! Both stores only change through their transitions, and the transitions are driven by a [`SyncService`](sync::SyncService),
//! which talks to the backend through a [`Transport`](traits::Transport) (usually an [`HttpTransport`](client::HttpTransport)).
//!
//! The session token is kept in a durable key/value [`storage`], through [`TokenPersistence`](token::TokenPersistence). \
//! Dates travel as ISO-8601 strings on the wire, and are converted at the boundary by the [`wire`] module.

pub mod traits;
pub mod error;
pub mod config;

mod event;
pub use event::{CalendarEvent, EventId, User};
pub mod wire;
pub use wire::{Credentials, NewUser};

pub mod session;
pub use session::{AuthStatus, Session, SessionStore};
pub mod events;
pub use events::EventStore;
pub mod ui;
pub use ui::UiFlagStore;

pub mod storage;
pub mod token;
pub use token::TokenPersistence;
pub mod preferences;

pub mod client;
pub use client::HttpTransport;
pub mod sync;
pub use sync::SyncService;

pub mod mock_behaviour;
pub mod mock_backend;
pub mod utils;
