//! Durable storage of the session token

use chrono::{DateTime, TimeZone, Utc};

use crate::config::{TOKEN_INIT_DATE_KEY, TOKEN_KEY};
use crate::traits::KeyValueStore;

/// Reads and writes the session token, and the instant it was issued.
///
/// Whether a token is still valid is never judged here: only the backend decides that.
#[derive(Debug)]
pub struct TokenPersistence<S: KeyValueStore> {
    storage: S,
}

impl<S: KeyValueStore> TokenPersistence<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Store a token, issued now. This overwrites any previous token
    pub fn save(&self, token: &str) {
        self.save_issued_at(token, Utc::now());
    }

    pub fn save_issued_at(&self, token: &str, issued_at: DateTime<Utc>) {
        self.storage.set(TOKEN_KEY, token);
        self.storage.set(TOKEN_INIT_DATE_KEY, &issued_at.timestamp_millis().to_string());
        log::debug!("Session token stored");
    }

    pub fn read(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY)
    }

    /// When the stored token was issued, if that is known
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.storage.get(TOKEN_INIT_DATE_KEY)?;
        match raw.parse::<i64>() {
            Ok(millis) => Utc.timestamp_millis_opt(millis).single(),
            Err(err) => {
                log::warn!("Invalid token issuance date {:?}: {}", raw, err);
                None
            },
        }
    }

    /// Remove the token. This is a no-op in case there is no token
    pub fn clear(&self) {
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(TOKEN_INIT_DATE_KEY);
        log::debug!("Session token cleared");
    }
}
