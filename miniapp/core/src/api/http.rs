//! Reqwest Transport
//!
//! [`ApiTransport`] over HTTPS. The session identity token travels in the
//! identity header (`X-Init-Data` by default) on every request.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder};

use super::traits::ApiTransport;
use crate::config::MiniAppConfig;
use crate::error::ApiError;
use crate::session::Session;

/// HTTP transport to the remote API
#[derive(Clone)]
pub struct HttpTransport {
    /// API origin without trailing slash
    base_url: String,
    /// Header carrying the identity token
    identity_header: String,
    /// Identity token captured at startup
    token: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for the configured origin and session
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the HTTP client cannot be built.
    pub fn new(config: &MiniAppConfig, session: &Session) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            identity_header: config.identity_header.clone(),
            token: session.identity_token().to_string(),
            http_client,
        })
    }

    /// Absolute URL for an API path
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Start a request with identity and content-type headers attached
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http_client
            .request(method, self.url(path))
            .header(self.identity_header.as_str(), self.token.as_str())
            .header(CONTENT_TYPE, "application/json")
    }

    /// Send a request and decode the JSON body of a 2xx response
    async fn execute(&self, request: RequestBuilder) -> Result<serde_json::Value, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                code: status.as_u16(),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn get(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        tracing::debug!(path, "GET");
        self.execute(self.request(Method::GET, path)).await
    }

    async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        tracing::debug!(path, "POST");
        self.execute(self.request(Method::POST, path).json(&body))
            .await
    }
}
