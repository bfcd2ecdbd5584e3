//! Scripted transport used by the unit tests of this crate.

use async_trait::async_trait;
use serde_json::Value;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use crate::{
    error::{ShelfError, ShelfResult},
    transport::{HttpRequest, HttpResponse, Transport},
};

#[derive(Debug, Default)]
struct Script {
    requests: Vec<HttpRequest>,
    replies: VecDeque<ShelfResult<HttpResponse>>,
}

/// Records every request and answers with queued replies in order.
///
/// When the queue runs dry every request is answered with `200 {}`.
#[derive(Debug, Default, Clone)]
pub(crate) struct RecordingTransport {
    script: Arc<Mutex<Script>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(&self) -> Arc<dyn Transport> {
        Arc::new(self.clone())
    }

    pub fn respond(&self, status: u16, body: &str) {
        self.push(Ok(HttpResponse::new(status, body)));
    }

    pub fn respond_json(&self, status: u16, body: Value) {
        self.push(Ok(HttpResponse::json(status, &body)));
    }

    pub fn fail(&self, message: &str) {
        self.push(Err(ShelfError::Transport(message.to_string())));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.script.lock().unwrap().requests.clone()
    }

    /// Returns `"METHOD path"` for every recorded request.
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    fn push(&self, reply: ShelfResult<HttpResponse>) {
        self.script.lock().unwrap().replies.push_back(reply);
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> ShelfResult<HttpResponse> {
        let mut script = self.script.lock().unwrap();
        script.requests.push(request);
        script
            .replies
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse::new(200, "{}")))
    }
}
