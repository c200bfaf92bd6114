//! Applications view
//!
//! The user's applications as a filtered paginated list, plus the detail
//! modal for one record.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::api::{ApiClient, Application, StatusFilter};
use crate::error::ApiError;
use crate::pagination::{ListQuery, LoadOutcome, PageSource, PaginatedList};

/// Pages of `GET /api/applications`
pub struct ApplicationPages {
    api: ApiClient,
}

impl ApplicationPages {
    /// Page source over `api`
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PageSource<StatusFilter, Application> for ApplicationPages {
    async fn fetch(&self, query: &ListQuery<StatusFilter>) -> Result<Vec<Application>, ApiError> {
        self.api.applications(query).await
    }
}

/// Applications view state
pub struct ApplicationsView {
    list: PaginatedList<StatusFilter, Application>,
    details: Mutex<Option<Application>>,
}

impl ApplicationsView {
    /// Create with the `all` filter and nothing loaded
    pub fn new(api: ApiClient, page_size: usize) -> Self {
        Self {
            list: PaginatedList::new(
                Arc::new(ApplicationPages::new(api)),
                StatusFilter::All,
                page_size,
            ),
            details: Mutex::new(None),
        }
    }

    /// The underlying list
    #[must_use]
    pub fn list(&self) -> &PaginatedList<StatusFilter, Application> {
        &self.list
    }

    /// Active filter
    #[must_use]
    pub fn filter(&self) -> StatusFilter {
        self.list.query().filter
    }

    /// Reload from the first page with the current filter
    ///
    /// # Errors
    ///
    /// Returns the API error of the first page.
    pub async fn reload(&self) -> Result<LoadOutcome, ApiError> {
        self.list.reset(self.filter()).await
    }

    /// Switch filter and reload from the first page
    ///
    /// # Errors
    ///
    /// Returns the API error of the first page.
    pub async fn select_filter(&self, filter: StatusFilter) -> Result<LoadOutcome, ApiError> {
        tracing::debug!(?filter, "Filter selected");
        self.list.reset(filter).await
    }

    /// Append the next page
    ///
    /// # Errors
    ///
    /// Returns the API error; loaded records are kept.
    pub async fn load_more(&self) -> Result<LoadOutcome, ApiError> {
        self.list.load_next().await
    }

    /// Open the detail modal
    pub fn show_details(&self, application: Application) {
        *self.details.lock() = Some(application);
    }

    /// Close the detail modal
    pub fn close_details(&self) {
        *self.details.lock() = None;
    }

    /// Record shown in the detail modal
    #[must_use]
    pub fn details(&self) -> Option<Application> {
        self.details.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApplicationStatus;
    use crate::test_utils::{application_page, MockTransport};

    #[tokio::test]
    async fn test_filter_goes_to_query_string() {
        let transport = MockTransport::new();
        transport.respond(
            "/api/applications?limit=20&offset=0&status=EXPIRED",
            application_page(1, 2),
        );
        let view = ApplicationsView::new(ApiClient::new(transport.shared()), 20);

        view.select_filter(StatusFilter::Only(ApplicationStatus::Expired))
            .await
            .unwrap();

        assert_eq!(view.list().len(), 2);
        assert_eq!(
            view.filter(),
            StatusFilter::Only(ApplicationStatus::Expired)
        );
    }

    #[tokio::test]
    async fn test_reload_keeps_filter() {
        let transport = MockTransport::new();
        transport.respond(
            "/api/applications?limit=20&offset=0&status=CONFIRMED",
            application_page(1, 1),
        );
        let view = ApplicationsView::new(ApiClient::new(transport.shared()), 20);
        view.select_filter(StatusFilter::Only(ApplicationStatus::Confirmed))
            .await
            .unwrap();

        view.reload().await.unwrap();

        assert_eq!(
            transport.call_count("/api/applications?limit=20&offset=0&status=CONFIRMED"),
            2
        );
    }
}
