use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::error::TransportError;

/// A request to the backend
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub method: Method,
    /// The path of the endpoint, relative to the API root (e.g. `/events/42`)
    pub path: String,
    pub body: Option<Value>,
    /// The session token, when the endpoint requires one
    pub token: Option<String>,
}

impl Request {
    pub fn new<S: ToString>(method: Method, path: S) -> Self {
        Self { method, path: path.to_string(), body: None, token: None }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }
}


/// Something that performs requests against the backend, and returns the JSON body of its responses
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request.
    /// Non-successful responses are returned as a [`TransportError::Status`] that carries the body the server replied
    async fn send(&self, request: Request) -> Result<Value, TransportError>;

    async fn get(&self, path: &str, token: Option<String>) -> Result<Value, TransportError> {
        self.send(Request::new(Method::GET, path).with_token(token)).await
    }

    async fn post(&self, path: &str, body: Value, token: Option<String>) -> Result<Value, TransportError> {
        self.send(Request::new(Method::POST, path).with_body(body).with_token(token)).await
    }

    async fn put(&self, path: &str, body: Value, token: Option<String>) -> Result<Value, TransportError> {
        self.send(Request::new(Method::PUT, path).with_body(body).with_token(token)).await
    }

    async fn delete(&self, path: &str, token: Option<String>) -> Result<Value, TransportError> {
        self.send(Request::new(Method::DELETE, path).with_token(token)).await
    }
}


/// A durable key/value storage.
///
/// A missing key is not an error. Implementors are expected to log (rather than return) the errors of their backing medium
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}
