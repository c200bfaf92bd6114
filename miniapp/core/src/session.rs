//! Session
//!
//! Identity context captured once when the mini-app boots. The token is what
//! authenticates every API request; it is never regenerated mid-session, so
//! the type exposes no way to change it.

use serde::{Deserialize, Serialize};

use crate::bridge::HostBridge;

/// Signed-in user as reported by the host
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// Platform user id
    pub id: i64,
    /// Platform username, if the user has one
    pub username: Option<String>,
}

impl UserSummary {
    /// Name to show: `@username`, or the numeric id
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.username {
            Some(name) if !name.is_empty() => format!("@{name}"),
            _ => format!("id{}", self.id),
        }
    }
}

/// Read-only identity context
#[derive(Clone, Debug)]
pub struct Session {
    token: String,
    user: Option<UserSummary>,
}

impl Session {
    /// Capture identity from the host bridge
    #[must_use]
    pub fn capture(host: &dyn HostBridge) -> Self {
        let session = Self {
            token: host.identity_token(),
            user: host.user(),
        };
        tracing::debug!(
            present = host.is_present(),
            user = ?session.user.as_ref().map(|u| u.id),
            "Session captured"
        );
        session
    }

    /// Identity token sent with every request
    #[must_use]
    pub fn identity_token(&self) -> &str {
        &self.token
    }

    /// Signed-in user
    #[must_use]
    pub fn user(&self) -> Option<&UserSummary> {
        self.user.as_ref()
    }
}
