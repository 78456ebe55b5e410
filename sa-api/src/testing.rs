//! In-memory transport for tests.
//!
//! `RecordingTransport` answers requests from a queue of canned responses
//! and records every request it receives, so tests can assert on headers,
//! URLs and the number of network attempts without a server.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::Value;

use sa_core::error::{NetworkErrorKind, SaError, SaResult};

use crate::http::{HttpRequest, ResponseEnvelope};
use crate::transport::Transport;

#[derive(Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<SaResult<ResponseEnvelope>>>,
    requests: Mutex<Vec<HttpRequest>>,
    closes: AtomicUsize,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next unanswered request.
    pub fn push_response(&self, envelope: ResponseEnvelope) -> &Self {
        self.lock_responses().push_back(Ok(envelope));
        self
    }

    /// Queue a 200 JSON response.
    pub fn push_json(&self, body: Value) -> &Self {
        self.push_response(ResponseEnvelope::json(200, &body))
    }

    /// Queue a transport failure.
    pub fn push_error(&self, err: SaError) -> &Self {
        self.lock_responses().push_back(Err(err));
        self
    }

    /// Every request executed so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of `execute` calls.
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    /// Number of `close` calls.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, VecDeque<SaResult<ResponseEnvelope>>> {
        self.responses.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Transport for RecordingTransport {
    fn execute(&self, request: &HttpRequest) -> SaResult<ResponseEnvelope> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        match self.lock_responses().pop_front() {
            Some(Ok(envelope)) if envelope.url.is_empty() => Ok(envelope.with_url(&request.url)),
            Some(result) => result,
            None => Err(SaError::network(
                NetworkErrorKind::Other,
                "no canned response queued",
            )),
        }
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
