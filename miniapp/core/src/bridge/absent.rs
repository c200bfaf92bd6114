//! Absent Host
//!
//! Fallback bridge used when the mini-app runs outside a chat host (local
//! development, tests, the headless shell without init data). It answers with
//! a fixed identity and records everything it was asked to do.

use parking_lot::Mutex;

use super::traits::{Haptic, HostBridge, OutboundMessage};
use crate::session::UserSummary;

/// Identity token used when no host is attached
pub const FALLBACK_TOKEN: &str = "test_mode";

/// User reported when no host is attached
pub const FALLBACK_USER_ID: i64 = 123_456;

/// Bridge for running without a host
#[derive(Debug, Default)]
pub struct AbsentHost {
    pulses: Mutex<Vec<Haptic>>,
    emitted: Mutex<Vec<OutboundMessage>>,
}

impl AbsentHost {
    /// Create an absent host with empty records
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pulses requested so far
    #[must_use]
    pub fn pulses(&self) -> Vec<Haptic> {
        self.pulses.lock().clone()
    }

    /// Messages emitted so far
    #[must_use]
    pub fn emitted(&self) -> Vec<OutboundMessage> {
        self.emitted.lock().clone()
    }
}

impl HostBridge for AbsentHost {
    fn is_present(&self) -> bool {
        false
    }

    fn identity_token(&self) -> String {
        FALLBACK_TOKEN.to_string()
    }

    fn user(&self) -> Option<UserSummary> {
        Some(UserSummary {
            id: FALLBACK_USER_ID,
            username: Some("test_user".to_string()),
        })
    }

    fn pulse(&self, kind: Haptic) {
        self.pulses.lock().push(kind);
    }

    fn emit(&self, message: &OutboundMessage) {
        tracing::debug!(action = message.action(), "No host attached, recording message");
        self.emitted.lock().push(message.clone());
    }

    fn open_external(&self, url: &str) -> bool {
        tracing::debug!(url, "No host attached, cannot open link");
        false
    }
}
