//! Surface Messages
//!
//! What the core tells the rendering surface. The surface owns no business
//! logic: it re-reads controller state when told a view changed and shows
//! toasts and badges as instructed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::api::ApplicationId;
use crate::bridge::{Haptic, HostBridge};
use crate::router::ViewId;

/// Messages from the core to the surface
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SurfaceMessage {
    /// A view became active; render its loading state
    ViewActivated {
        /// Active view
        view: ViewId,
    },

    /// Data behind a view changed; re-render it
    ViewUpdated {
        /// View to re-render
        view: ViewId,
    },

    /// Transient notice
    Toast {
        /// Severity
        level: NotifyLevel,
        /// Text to show
        message: String,
    },

    /// Unread notification count
    UnreadBadge {
        /// Unread notifications
        count: u64,
    },

    /// The create wizard finished with a new application
    ApplicationCreated {
        /// New application
        app_id: ApplicationId,
    },
}

/// Notification levels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyLevel {
    /// Informational
    Info,
    /// Warning
    Warning,
    /// Error
    Error,
    /// Success
    Success,
}

impl NotifyLevel {
    /// Haptic played with a toast of this level
    #[must_use]
    pub fn haptic(self) -> Haptic {
        match self {
            Self::Error => Haptic::Error,
            Self::Success => Haptic::Success,
            Self::Info | Self::Warning => Haptic::Warning,
        }
    }
}

/// Sending half of the surface channel
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<SurfaceMessage>,
    host: Arc<dyn HostBridge>,
}

impl Notifier {
    /// Wrap a channel sender
    pub fn new(tx: mpsc::Sender<SurfaceMessage>, host: Arc<dyn HostBridge>) -> Self {
        Self { tx, host }
    }

    /// Send a message to the surface
    pub async fn send(&self, msg: SurfaceMessage) {
        if let Err(e) = self.tx.send(msg).await {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }

    /// Show a toast and play the matching haptic
    pub async fn toast(&self, level: NotifyLevel, message: impl Into<String>) {
        self.host.pulse(level.haptic());
        self.send(SurfaceMessage::Toast {
            level,
            message: message.into(),
        })
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::AbsentHost;

    #[test]
    fn test_toast_haptics() {
        assert_eq!(NotifyLevel::Error.haptic(), Haptic::Error);
        assert_eq!(NotifyLevel::Success.haptic(), Haptic::Success);
        assert_eq!(NotifyLevel::Info.haptic(), Haptic::Warning);
    }

    #[tokio::test]
    async fn test_toast_pulses_and_sends() {
        let host = Arc::new(AbsentHost::new());
        let (tx, mut rx) = mpsc::channel(4);
        let notifier = Notifier::new(tx, host.clone());

        notifier.toast(NotifyLevel::Error, "Offline").await;

        assert_eq!(host.pulses(), vec![Haptic::Error]);
        assert_eq!(
            rx.recv().await,
            Some(SurfaceMessage::Toast {
                level: NotifyLevel::Error,
                message: "Offline".into()
            })
        );
    }

    #[tokio::test]
    async fn test_send_after_surface_dropped_does_not_panic() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let notifier = Notifier::new(tx, Arc::new(AbsentHost::new()));
        notifier
            .send(SurfaceMessage::UnreadBadge { count: 1 })
            .await;
    }
}
