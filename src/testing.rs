//! In-process transport double for unit tests.

use crate::error::{AdminError, Result};
use crate::transport::{AdminRequest, AdminResponse, AdminTransport};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Records every request and answers from a scripted queue.
///
/// Once the queue is drained every request gets an empty `200`.
#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<AdminRequest>>,
    responses: Mutex<VecDeque<Result<AdminResponse>>>,
    delay: Option<Duration>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every answer, for exercising the bounded wait.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(AdminResponse {
            status,
            body: body.as_bytes().to_vec(),
        }));
        self
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(AdminError::invalid_response(message)));
        self
    }

    pub fn requests(&self) -> Vec<AdminRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// `(method, path)` of every recorded request.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.requests()
            .into_iter()
            .map(|r| (r.method.to_string(), r.path))
            .collect()
    }

    /// Body of the `index`th request, parsed as JSON.
    pub fn json_body(&self, index: usize) -> serde_json::Value {
        let requests = self.requests();
        let body = requests[index].body.as_deref().unwrap_or_default();
        serde_json::from_slice(body).unwrap()
    }
}

#[async_trait]
impl AdminTransport for RecordingTransport {
    async fn execute(&self, request: AdminRequest) -> Result<AdminResponse> {
        self.requests.lock().unwrap().push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(AdminResponse {
                status: 200,
                body: Vec::new(),
            }))
    }
}
