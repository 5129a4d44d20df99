//! This module provides a client to connect to the calendar backend

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::traits::{Request, Transport};


/// A [`Transport`] that sends JSON over HTTP
#[derive(Clone, Debug)]
pub struct HttpTransport {
    base_url: Url,
    token_header: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport. This does not start a connection
    pub fn new<S: AsRef<str>>(base_url: S) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self::from_config(ClientConfig::new(base_url)))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            base_url: config.base_url,
            token_header: config.token_header,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The full URL of an endpoint. The path is appended to the base URL, rather than replacing its path
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Value, TransportError> {
        let url = self.endpoint(&request.path);
        log::debug!("{} {}", request.method, url);

        let mut builder = self.client.request(request.method.clone(), url.as_str());
        if let Some(token) = &request.token {
            builder = builder.header(self.token_header.as_str(), token.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(serde_json::to_string(body)?);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() == false {
            log::warn!("{} {} replied with HTTP status code {}", request.method, url, status);
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: serde_json::from_str(&text).ok(),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}
