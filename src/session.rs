//! The authentication state of the current user

use std::fmt::{Display, Formatter};

use crate::event::User;

/// Where the session stands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthStatus {
    /// The stored credentials have not been checked yet
    Checking,
    Authenticated,
    NotAuthenticated,
}

impl Display for AuthStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            AuthStatus::Checking => write!(f, "checking"),
            AuthStatus::Authenticated => write!(f, "authenticated"),
            AuthStatus::NotAuthenticated => write!(f, "not-authenticated"),
        }
    }
}

impl Default for AuthStatus {
    fn default() -> Self {
        AuthStatus::Checking
    }
}


/// A snapshot of the session.
///
/// The constructors make sure a user is present if and only if the status is [`AuthStatus::Authenticated`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    status: AuthStatus,
    user: Option<User>,
    error_message: Option<String>,
}

impl Session {
    pub fn checking() -> Self {
        Self::default()
    }

    pub fn authenticated(user: User) -> Self {
        Self { status: AuthStatus::Authenticated, user: Some(user), error_message: None }
    }

    pub fn not_authenticated(error_message: Option<String>) -> Self {
        Self { status: AuthStatus::NotAuthenticated, user: None, error_message }
    }

    pub fn status(&self) -> AuthStatus { self.status }
    pub fn user(&self) -> Option<&User> { self.user.as_ref() }
    pub fn error_message(&self) -> Option<&str> { self.error_message.as_deref() }

    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated
    }
}


/// Holds the current [`Session`].
///
/// Every transition replaces the whole session value. This store performs no I/O, its transitions are driven by the [`SyncService`](crate::sync::SyncService)
#[derive(Debug, Default)]
pub struct SessionStore {
    session: Session,
}

impl SessionStore {
    /// A store in the initial, [`AuthStatus::Checking`] state
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts from a given session (useful for tests)
    pub fn with_session(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> AuthStatus { self.session.status() }
    pub fn user(&self) -> Option<&User> { self.session.user() }
    pub fn error_message(&self) -> Option<&str> { self.session.error_message() }

    pub fn set_checking(&mut self) {
        self.replace(Session::checking());
    }

    pub fn set_authenticated(&mut self, user: User) {
        self.replace(Session::authenticated(user));
    }

    pub fn set_not_authenticated(&mut self, error_message: Option<String>) {
        self.replace(Session::not_authenticated(error_message));
    }

    /// Same effect as [`Self::set_not_authenticated`], for an explicit logout
    pub fn logout(&mut self, error_message: Option<String>) {
        self.replace(Session::not_authenticated(error_message));
    }

    /// Forget the error message, and keep the rest of the session as is.
    ///
    /// Transitions never expire their message on their own: the UI calls this once it has shown it
    pub fn clear_error_message(&mut self) {
        let cleared = Session { error_message: None, ..self.session.clone() };
        self.replace(cleared);
    }

    fn replace(&mut self, session: Session) {
        log::debug!("Session: {} -> {}", self.session.status, session.status);
        self.session = session;
    }
}
