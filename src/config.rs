//! Support for library configuration options

use once_cell::sync::Lazy;
use url::Url;

/// Storage key of the session token
pub const TOKEN_KEY: &str = "token";
/// Storage key of the instant the session token was issued (milliseconds since the Unix epoch)
pub const TOKEN_INIT_DATE_KEY: &str = "token-init-date";
/// Storage key of the last calendar view the user picked
pub const LAST_VIEW_KEY: &str = "lastView";

/// Endpoint that exchanges credentials for a session token
pub const LOGIN_PATH: &str = "/auth";
/// Endpoint that creates an account
pub const REGISTER_PATH: &str = "/users";
/// Endpoint that validates a session token, and issues a fresh one
pub const RENEW_PATH: &str = "/auth/renew";
/// Collection of the calendar events. A single event is at `/events/:id`
pub const EVENTS_PATH: &str = "/events";

/// The header the backend reads the session token from
pub const DEFAULT_TOKEN_HEADER: &str = "x-token";

/// The backend used when `CALENDAR_API_URL` is not set
pub static DEFAULT_API_URL: Lazy<Url> = Lazy::new(|| {
    Url::parse("http://localhost:4000/api").unwrap(/* this is a valid URL */)
});


/// Where and how to reach the backend
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub base_url: Url,
    pub token_header: String,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
        }
    }

    /// Read the configuration from `CALENDAR_API_URL` and `CALENDAR_TOKEN_HEADER`.
    ///
    /// Unset or invalid values fall back to the defaults.
    pub fn from_env() -> Self {
        let base_url = match std::env::var("CALENDAR_API_URL") {
            Err(_) => DEFAULT_API_URL.clone(),
            Ok(raw) => match Url::parse(&raw) {
                Ok(url) => url,
                Err(err) => {
                    log::warn!("Invalid CALENDAR_API_URL {:?} ({}). Using {}", raw, err, *DEFAULT_API_URL);
                    DEFAULT_API_URL.clone()
                },
            },
        };
        let token_header = std::env::var("CALENDAR_TOKEN_HEADER")
            .unwrap_or_else(|_| DEFAULT_TOKEN_HEADER.to_string());

        Self { base_url, token_header }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL.clone())
    }
}
