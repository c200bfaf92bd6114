//! API Transport Trait
//!
//! The seam between typed endpoint calls and the wire. [`HttpTransport`]
//! talks to the real server; tests script responses with
//! [`MockTransport`](crate::test_utils::MockTransport).
//!
//! Transports never retry. A failed POST stays failed so the caller decides
//! whether repeating a side-effecting request is safe.
//!
//! [`HttpTransport`]: super::HttpTransport

use async_trait::async_trait;

use crate::error::ApiError;

/// JSON request/response exchange with the remote API
///
/// Implementations attach the session identity to every request and map
/// failures into the [`ApiError`] taxonomy.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// `GET` a path (including any query string) and return the JSON body
    async fn get(&self, path: &str) -> Result<serde_json::Value, ApiError>;

    /// `POST` a JSON body to a path and return the JSON body
    async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError>;
}
