//! Scripted transport for driver tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::transport::{Request, Response, Transport};
use crate::{ClientError, Result};

/// Replays canned responses in order and records every request it was
/// handed, so tests can assert on verbs, paths, params and bodies.
pub(crate) struct MockTransport {
    responses: Mutex<VecDeque<Result<Response>>>,
    requests: Mutex<Vec<Request>>,
}

impl MockTransport {
    pub(crate) fn new(responses: Vec<Result<Response>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Transport whose every response is a 200 with the given JSON body.
    pub(crate) fn replying(bodies: Vec<Value>) -> Arc<Self> {
        Self::new(bodies.into_iter().map(|body| Ok(response(body))).collect())
    }

    pub(crate) fn sent(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

/// A 200 response with the given JSON body.
pub(crate) fn response(body: Value) -> Response {
    Response {
        status: 200,
        body: Bytes::from(serde_json::to_vec(&body).unwrap()),
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: Request, cancel: &CancellationToken) -> Result<Response> {
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Protocol("mock transport exhausted".into())))
    }
}
