use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{
    Error,
    backend::{BackendClient, BackendRequest, BackendResponse, Transport},
};

/// A transport that records every request and answers with canned responses.
#[derive(Debug, Clone)]
pub(crate) struct RecordingTransport {
    requests: Arc<Mutex<Vec<BackendRequest>>>,
    routes: Vec<(String, BackendResponse)>,
    fallback: Option<BackendResponse>,
}

impl RecordingTransport {
    /// Answer every request with `status` and `body`.
    pub(crate) fn answering(status: u16, body: &str) -> Self {
        Self {
            requests: Arc::default(),
            routes: Vec::new(),
            fallback: Some(BackendResponse {
                status,
                body: body.to_owned(),
            }),
        }
    }

    /// Fail every request as if the backend was down.
    pub(crate) fn unreachable() -> Self {
        Self {
            requests: Arc::default(),
            routes: Vec::new(),
            fallback: None,
        }
    }

    /// Answer requests whose path starts with `path_prefix` with `status` and `body`.
    pub(crate) fn with_route(mut self, path_prefix: &str, status: u16, body: &str) -> Self {
        self.routes.push((
            path_prefix.to_owned(),
            BackendResponse {
                status,
                body: body.to_owned(),
            },
        ));
        self
    }

    pub(crate) fn client(&self) -> BackendClient {
        BackendClient::new(Arc::new(self.clone()))
    }

    /// The requests sent so far, oldest first.
    pub(crate) fn requests(&self) -> Vec<BackendRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, Error> {
        let response = self
            .routes
            .iter()
            .find(|(prefix, _)| request.path.starts_with(prefix.as_str()))
            .map(|(_, response)| response.clone())
            .or_else(|| self.fallback.clone());

        self.requests.lock().unwrap().push(request);

        response.ok_or_else(|| Error::BackendUnavailable("connection refused".to_owned()))
    }
}
