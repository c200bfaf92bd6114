//! Typed API Client
//!
//! One method per remote endpoint. Paths and query strings are built here so
//! controllers only deal in records.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::models::{
    Application, ApplicationId, Choice, CreateApplication, CreateApplicationResponse,
    Notification, PlatformStats, StatusFilter, UnreadCount, UserProfile, UserStats,
};
use super::traits::ApiTransport;
use crate::error::ApiError;
use crate::pagination::ListQuery;

/// Typed client over an [`ApiTransport`]
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn ApiTransport>,
}

impl ApiClient {
    /// Wrap a transport
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.transport.get(path).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// `GET /api/stats`
    pub async fn stats(&self) -> Result<PlatformStats, ApiError> {
        self.get("/api/stats").await
    }

    /// `GET /api/user/profile`
    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.get("/api/user/profile").await
    }

    /// `GET /api/user/stats`
    pub async fn user_stats(&self) -> Result<UserStats, ApiError> {
        self.get("/api/user/stats").await
    }

    /// `GET /api/applications?limit&offset[&status]`
    pub async fn applications(
        &self,
        query: &ListQuery<StatusFilter>,
    ) -> Result<Vec<Application>, ApiError> {
        self.get(&applications_path(query)).await
    }

    /// `GET /api/application/{id}`
    pub async fn application(&self, id: ApplicationId) -> Result<Application, ApiError> {
        self.get(&format!("/api/application/{id}")).await
    }

    /// `GET /api/countries`
    pub async fn countries(&self) -> Result<Vec<Choice>, ApiError> {
        self.get("/api/countries").await
    }

    /// `GET /api/banks?country_id=`
    pub async fn banks(&self, country_id: i64) -> Result<Vec<Choice>, ApiError> {
        self.get(&format!("/api/banks?country_id={country_id}"))
            .await
    }

    /// `POST /api/applications/create`
    pub async fn create_application(
        &self,
        request: &CreateApplication,
    ) -> Result<CreateApplicationResponse, ApiError> {
        let body = serde_json::to_value(request)?;
        let response = self
            .transport
            .post("/api/applications/create", body)
            .await?;
        Ok(serde_json::from_value(response)?)
    }

    /// `GET /api/notifications?limit`
    pub async fn notifications(&self, limit: usize) -> Result<Vec<Notification>, ApiError> {
        self.get(&format!("/api/notifications?limit={limit}"))
            .await
    }

    /// `POST /api/notifications/{id}/read`
    pub async fn mark_notification_read(&self, id: i64) -> Result<(), ApiError> {
        self.transport
            .post(
                &format!("/api/notifications/{id}/read"),
                serde_json::json!({}),
            )
            .await?;
        Ok(())
    }

    /// `GET /api/notifications/unread-count`
    pub async fn unread_count(&self) -> Result<u64, ApiError> {
        let count: UnreadCount = self.get("/api/notifications/unread-count").await?;
        Ok(count.count)
    }
}

/// Path and query string for one applications page
fn applications_path(query: &ListQuery<StatusFilter>) -> String {
    let mut path = format!(
        "/api/applications?limit={}&offset={}",
        query.page_size, query.offset
    );
    if let Some(status) = query.filter.status_code() {
        path.push_str("&status=");
        path.push_str(status);
    }
    path
}
