//! Sending JSON requests to the backend API.

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::Error;

/// The HTTP methods used by the backend API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Read data.
    Get,
    /// Change data.
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// A request to the backend API.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    /// The HTTP method.
    pub method: Method,
    /// The path and query string, e.g. "/send_report".
    pub path: String,
    /// The JSON body, if any.
    pub body: Option<Value>,
}

/// The status code and raw body of a backend response.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendResponse {
    /// The HTTP status code.
    pub status: u16,
    /// The response body as text.
    pub body: String,
}

impl BackendResponse {
    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON.
    ///
    /// # Errors
    /// Returns [Error::InvalidBackendResponse] if the body is not valid JSON
    /// for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_str(&self.body)
            .map_err(|error| Error::InvalidBackendResponse(error.to_string()))
    }

    /// Turn a non-2xx response into [Error::BackendRejected].
    pub fn error_for_status(self) -> Result<Self, Error> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::BackendRejected {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// Submits JSON to the backend and hands back whatever it answered.
///
/// Implementations only fail when no response was received at all. Non-2xx
/// responses are returned as-is so that callers can show the backend's
/// message.
#[async_trait]
pub trait Transport: fmt::Debug + Send + Sync {
    /// Send `request` and wait for the response.
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, Error>;
}

/// The production transport, talking HTTP to the backend at a base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the backend at `base_url`, e.g. "http://localhost:5000".
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, Error> {
        let url = format!("{}{}", self.base_url, request.path);

        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };

        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        tracing::debug!("{} {url}", request.method);

        let response = builder.send().await.map_err(|error| {
            tracing::error!("could not reach backend at {url}: {error}");
            Error::BackendUnavailable(error.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|error| Error::BackendUnavailable(error.to_string()))?;

        if !(200..300).contains(&status) {
            tracing::warn!("backend answered {} {url} with {status}: {body}", request.method);
        }

        Ok(BackendResponse { status, body })
    }
}
