//! Profile view: user profile and stats, fetched together.

use parking_lot::Mutex;

use super::Loaded;
use crate::api::{ApiClient, UserProfile, UserStats};
use crate::error::ApiError;

/// Everything the profile view shows
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileData {
    /// Profile record
    pub profile: UserProfile,
    /// Per-user counters
    pub stats: UserStats,
}

/// Profile view state
#[derive(Default)]
pub struct ProfileView {
    data: Mutex<Loaded<ProfileData>>,
}

impl ProfileView {
    /// Create with nothing loaded
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch profile and stats concurrently
    ///
    /// # Errors
    ///
    /// Returns the first API error; neither half is kept on failure.
    pub async fn fetch(api: &ApiClient) -> Result<ProfileData, ApiError> {
        let (profile, stats) = futures::try_join!(api.profile(), api.user_stats())?;
        Ok(ProfileData { profile, stats })
    }

    /// Store a fetch result
    pub fn apply(&self, result: &Result<ProfileData, ApiError>) {
        *self.data.lock() = match result {
            Ok(data) => Loaded::Ready(data.clone()),
            Err(e) => Loaded::Failed(e.to_string()),
        };
    }

    /// Last loaded profile
    #[must_use]
    pub fn data(&self) -> Loaded<ProfileData> {
        self.data.lock().clone()
    }

    /// Referral link, once the profile is loaded and has one
    #[must_use]
    pub fn referral_link(&self) -> Option<String> {
        self.data
            .lock()
            .data()
            .map(|d| d.profile.referral_link.clone())
            .filter(|link| !link.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockTransport;
    use serde_json::json;

    #[tokio::test]
    async fn test_fetch_joins_both_calls() {
        let transport = MockTransport::new();
        transport.respond(
            "/api/user/profile",
            json!({"username": "ann", "role": "user", "balance_uah": 10.0,
                   "referral_count": 2, "referral_link": "https://t.me/bot?start=ref1"}),
        );
        transport.respond(
            "/api/user/stats",
            json!({"total_applications": 3, "confirmed_applications": 2, "total_spent": 900.0}),
        );
        let api = ApiClient::new(transport.shared());

        let view = ProfileView::new();
        view.apply(&ProfileView::fetch(&api).await);

        assert_eq!(
            view.referral_link().as_deref(),
            Some("https://t.me/bot?start=ref1")
        );
        assert_eq!(view.data().data().unwrap().stats.confirmed_applications, 2);
    }

    #[tokio::test]
    async fn test_half_failure_fails_whole_view() {
        let transport = MockTransport::new();
        transport.respond("/api/user/profile", json!({"username": "ann"}));
        let api = ApiClient::new(transport.shared());

        let result = ProfileView::fetch(&api).await;

        assert_eq!(result.clone().unwrap_err(), ApiError::Status { code: 404 });
        let view = ProfileView::new();
        view.apply(&result);
        assert!(view.data().is_failed());
        assert_eq!(view.referral_link(), None);
    }
}
