//! Notification Sync
//!
//! Keeps the notification list and the unread badge in step with the server.
//! The badge is fetched on its own endpoint and never derived from the list.
//! Local state only changes after a server round-trip: `mark_read` posts
//! first and re-fetches on success.

use parking_lot::Mutex;

use crate::api::{ApiClient, Notification};
use crate::error::ApiError;
use crate::messages::{Notifier, SurfaceMessage};
use crate::pagination::ListStatus;

#[derive(Debug)]
struct NotificationState {
    records: Vec<Notification>,
    unread: u64,
    status: ListStatus,
}

/// Notification list and unread badge
pub struct NotificationSync {
    api: ApiClient,
    notifier: Notifier,
    limit: usize,
    state: Mutex<NotificationState>,
}

impl NotificationSync {
    /// Create with nothing loaded
    pub fn new(api: ApiClient, notifier: Notifier, limit: usize) -> Self {
        Self {
            api,
            notifier,
            limit,
            state: Mutex::new(NotificationState {
                records: Vec::new(),
                unread: 0,
                status: ListStatus::Idle,
            }),
        }
    }

    /// Fetch the unread count and publish the badge
    ///
    /// # Errors
    ///
    /// Returns the API error; the previous count is kept.
    pub async fn refresh_unread_count(&self) -> Result<u64, ApiError> {
        let count = self.api.unread_count().await.inspect_err(|e| {
            tracing::warn!("Failed to fetch unread count: {}", e);
        })?;
        self.state.lock().unread = count;
        self.notifier
            .send(SurfaceMessage::UnreadBadge { count })
            .await;
        Ok(count)
    }

    /// Fetch the latest notifications
    ///
    /// A record already known as read stays read even if the server briefly
    /// reports it unread.
    ///
    /// # Errors
    ///
    /// Returns the API error; known records are kept and the status becomes
    /// [`ListStatus::Failed`].
    pub async fn refresh_list(&self) -> Result<(), ApiError> {
        self.state.lock().status = ListStatus::Loading;

        match self.api.notifications(self.limit).await {
            Ok(mut fresh) => {
                let mut state = self.state.lock();
                for record in &mut fresh {
                    let known_read = state
                        .records
                        .iter()
                        .find(|known| known.id == record.id && known.is_read);
                    if let Some(known) = known_read {
                        if !record.is_read {
                            record.is_read = true;
                            record.read_at.clone_from(&known.read_at);
                        }
                    }
                }
                state.status = if fresh.is_empty() {
                    ListStatus::Empty
                } else {
                    ListStatus::Ready
                };
                state.records = fresh;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to load notifications: {}", e);
                self.state.lock().status = ListStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Mark one notification read
    ///
    /// On success the list and the count are re-fetched together.
    ///
    /// # Errors
    ///
    /// Returns the API error of the mark-read call; list and count are left
    /// untouched.
    pub async fn mark_read(&self, id: i64) -> Result<(), ApiError> {
        self.api
            .mark_notification_read(id)
            .await
            .inspect_err(|e| tracing::warn!(id, "Failed to mark notification read: {}", e))?;
        tracing::debug!(id, "Notification marked read");

        // Refresh failures are logged inside; the mark itself succeeded
        let _ = tokio::join!(self.refresh_list(), self.refresh_unread_count());
        Ok(())
    }

    /// Known notifications, newest first as served
    #[must_use]
    pub fn records(&self) -> Vec<Notification> {
        self.state.lock().records.clone()
    }

    /// Last known unread count
    #[must_use]
    pub fn unread(&self) -> u64 {
        self.state.lock().unread
    }

    /// List status
    #[must_use]
    pub fn status(&self) -> ListStatus {
        self.state.lock().status.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::AbsentHost;
    use crate::test_utils::MockTransport;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    const LIST: &str = "/api/notifications?limit=50";
    const COUNT: &str = "/api/notifications/unread-count";

    fn notification(id: i64, is_read: bool) -> serde_json::Value {
        json!({
            "id": id,
            "type": "confirmed",
            "title": "Payment confirmed",
            "message": "Done",
            "is_read": is_read,
            "created_at": "2024-05-01T10:00:00"
        })
    }

    fn setup() -> (
        MockTransport,
        NotificationSync,
        mpsc::Receiver<SurfaceMessage>,
    ) {
        let transport = MockTransport::new();
        let (tx, rx) = mpsc::channel(16);
        let notifier = Notifier::new(tx, Arc::new(AbsentHost::new()));
        let sync = NotificationSync::new(ApiClient::new(transport.shared()), notifier, 50);
        (transport, sync, rx)
    }

    #[tokio::test]
    async fn test_unread_count_publishes_badge() {
        let (transport, sync, mut rx) = setup();
        transport.respond(COUNT, json!({"count": 3}));

        assert_eq!(sync.refresh_unread_count().await.unwrap(), 3);
        assert_eq!(rx.recv().await, Some(SurfaceMessage::UnreadBadge { count: 3 }));
    }

    #[tokio::test]
    async fn test_mark_read_refetches_list_and_count() {
        let (transport, sync, _rx) = setup();
        transport.respond_once(LIST, json!([notification(1, false)]));
        transport.respond_once(COUNT, json!({"count": 1}));
        sync.refresh_list().await.unwrap();
        sync.refresh_unread_count().await.unwrap();

        transport.respond("/api/notifications/1/read", json!({"success": true}));
        transport.respond(LIST, json!([notification(1, true)]));
        transport.respond(COUNT, json!({"count": 0}));

        sync.mark_read(1).await.unwrap();

        assert!(sync.records()[0].is_read);
        assert_eq!(sync.unread(), 0);
        assert_eq!(transport.call_count(LIST), 2);
    }

    #[tokio::test]
    async fn test_rejected_mark_read_leaves_state() {
        let (transport, sync, _rx) = setup();
        transport.respond(LIST, json!([notification(1, false)]));
        transport.respond(COUNT, json!({"count": 1}));
        sync.refresh_list().await.unwrap();
        sync.refresh_unread_count().await.unwrap();

        let err = sync.mark_read(99).await.unwrap_err();

        assert_eq!(err, ApiError::Status { code: 404 });
        assert_eq!(sync.unread(), 1);
        assert!(!sync.records()[0].is_read);
        assert_eq!(transport.call_count(LIST), 1);
        assert_eq!(transport.call_count(COUNT), 1);
    }

    #[tokio::test]
    async fn test_read_flag_never_reverts() {
        let (transport, sync, _rx) = setup();
        transport.respond_once(LIST, json!([notification(1, true)]));
        transport.respond_once(LIST, json!([notification(1, false), notification(2, false)]));

        sync.refresh_list().await.unwrap();
        sync.refresh_list().await.unwrap();

        let records = sync.records();
        assert!(records[0].is_read);
        assert!(!records[1].is_read);
    }

    #[tokio::test]
    async fn test_empty_and_failed_status() {
        let (transport, sync, _rx) = setup();
        transport.respond_once(LIST, json!([]));
        sync.refresh_list().await.unwrap();
        assert_eq!(sync.status(), ListStatus::Empty);

        transport.fail_once(LIST, ApiError::Network("offline".into()));
        assert!(sync.refresh_list().await.is_err());
        assert!(matches!(sync.status(), ListStatus::Failed(_)));
    }
}
