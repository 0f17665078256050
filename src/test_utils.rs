//! Deterministic transport for tests.

use crate::error::ConnectorError;
use crate::transport::{HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Records every request and answers from a queue of scripted replies.
///
/// When the queue holds a single reply it is repeated forever, which makes
/// repeated invocations observe identical transport behaviour.
pub struct MockTransport {
    replies: Mutex<VecDeque<Result<HttpResponse, ConnectorError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new(replies: Vec<Result<HttpResponse, ConnectorError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with the given status and JSON body.
    pub fn json(status: u16, body: Value) -> Self {
        Self::new(vec![Ok(HttpResponse::json(status, &body))])
    }

    /// Always fails as if the network were down.
    pub fn failing(message: &str) -> Self {
        Self::new(vec![Err(ConnectorError::Transport(message.to_string()))])
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ConnectorError> {
        self.requests.lock().unwrap().push(request);
        let mut replies = self.replies.lock().unwrap();
        let reply = if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        };
        reply.unwrap_or_else(|| {
            Err(ConnectorError::Transport(
                "MockTransport has no scripted reply".to_string(),
            ))
        })
    }
}
