//! Test Utilities
//!
//! Scripted API transport for exercising controllers without a server.
//!
//! # Usage
//!
//! ```ignore
//! use nightlab_core::test_utils::MockTransport;
//!
//! let transport = MockTransport::new();
//! transport.respond("/api/countries", serde_json::json!([{"id": 1, "name": "Ukraine"}]));
//! transport.fail_once("/api/stats", ApiError::Status { code: 500 });
//!
//! let client = ApiClient::new(transport.shared());
//!
//! // After the test, verify what was called
//! assert_eq!(transport.call_count("/api/countries"), 1);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::api::ApiTransport;
use crate::error::ApiError;

/// HTTP method of a recorded call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

/// A call captured for verification
#[derive(Clone, Debug)]
pub struct RecordedCall {
    /// Method used
    pub method: Method,
    /// Path including query string
    pub path: String,
    /// JSON body for `POST`
    pub body: Option<serde_json::Value>,
}

type Reply = Result<serde_json::Value, ApiError>;

#[derive(Default)]
struct Script {
    /// Replies used once, in order, before falling back to `standing`
    queued: HashMap<String, VecDeque<Reply>>,
    /// Replies used for every call to a path
    standing: HashMap<String, Reply>,
    /// Call history
    calls: Vec<RecordedCall>,
}

/// Scripted [`ApiTransport`]
///
/// Unscripted paths answer `404`. While [`hold`](Self::hold) is in effect
/// calls are recorded immediately but do not answer until
/// [`release`](Self::release).
#[derive(Clone)]
pub struct MockTransport {
    script: Arc<Mutex<Script>>,
    gate: Arc<watch::Sender<bool>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Create a transport with nothing scripted
    #[must_use]
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            script: Arc::new(Mutex::new(Script::default())),
            gate: Arc::new(gate),
        }
    }

    /// Share as a trait object
    #[must_use]
    pub fn shared(&self) -> Arc<dyn ApiTransport> {
        Arc::new(self.clone())
    }

    /// Answer every call to `path` with `body`
    pub fn respond(&self, path: &str, body: serde_json::Value) {
        self.script.lock().standing.insert(path.to_string(), Ok(body));
    }

    /// Fail every call to `path`
    pub fn fail(&self, path: &str, error: ApiError) {
        self.script.lock().standing.insert(path.to_string(), Err(error));
    }

    /// Answer the next call to `path` with `body`
    pub fn respond_once(&self, path: &str, body: serde_json::Value) {
        self.queue(path, Ok(body));
    }

    /// Fail the next call to `path`
    pub fn fail_once(&self, path: &str, error: ApiError) {
        self.queue(path, Err(error));
    }

    fn queue(&self, path: &str, reply: Reply) {
        self.script
            .lock()
            .queued
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Stop answering until [`release`](Self::release)
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    /// Answer held and future calls
    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    /// All calls so far
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.script.lock().calls.clone()
    }

    /// Number of calls to exactly `path`
    #[must_use]
    pub fn call_count(&self, path: &str) -> usize {
        self.script
            .lock()
            .calls
            .iter()
            .filter(|c| c.path == path)
            .count()
    }

    /// Number of calls whose path starts with `prefix`
    #[must_use]
    pub fn call_count_prefix(&self, prefix: &str) -> usize {
        self.script
            .lock()
            .calls
            .iter()
            .filter(|c| c.path.starts_with(prefix))
            .count()
    }

    async fn answer(&self, method: Method, path: &str, body: Option<serde_json::Value>) -> Reply {
        self.script.lock().calls.push(RecordedCall {
            method,
            path: path.to_string(),
            body,
        });

        let mut gate = self.gate.subscribe();
        // Sender lives in self, so the channel cannot close while we wait
        let _ = gate.wait_for(|open| *open).await;

        let mut script = self.script.lock();
        if let Some(reply) = script.queued.get_mut(path).and_then(VecDeque::pop_front) {
            return reply;
        }
        script
            .standing
            .get(path)
            .cloned()
            .unwrap_or(Err(ApiError::Status { code: 404 }))
    }
}

#[async_trait]
impl ApiTransport for MockTransport {
    async fn get(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        self.answer(Method::Get, path, None).await
    }

    async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        self.answer(Method::Post, path, Some(body)).await
    }
}

/// `count` application records as JSON, ids starting at `first_id`
#[must_use]
pub fn application_page(first_id: i64, count: usize) -> serde_json::Value {
    let records: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            let id = first_id + i64::try_from(i).unwrap_or(i64::MAX);
            serde_json::json!({
                "id": id,
                "bank_name": "BankX",
                "amount_uah": 100.0,
                "payment_code": format!("PC{id}"),
                "status": "WAITING_MERCHANT",
                "status_label": "Waiting for merchant",
                "created_at": "2024-05-01T10:00:00"
            })
        })
        .collect();
    serde_json::Value::Array(records)
}
