//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

/// Replies with queued responses in order and records every request.
/// An empty queue answers 500.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedTransport {
    replies: Arc<Mutex<VecDeque<Result<HttpResponse, TransportError>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, status: u16, body: &str) {
        self.replies.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }));
    }

    pub(crate) fn push_error(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(TransportError(message.to_string())));
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(HttpResponse {
                    status: 500,
                    headers: Vec::new(),
                    body: "no scripted reply".to_string(),
                })
            })
    }
}
