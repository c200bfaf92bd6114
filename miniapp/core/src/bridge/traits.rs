//! Host Bridge Traits
//!
//! The capability interface the embedding chat host offers the mini-app:
//! identity, haptic feedback, outbound data relay, and link opening.
//!
//! Presence is resolved once at startup into an `Arc<dyn HostBridge>`.
//! Call sites never branch on whether a host exists; the [`AbsentHost`]
//! variant answers every call with a sensible fallback.
//!
//! [`AbsentHost`]: super::AbsentHost

use serde::{Deserialize, Serialize};

use crate::api::ApplicationId;
use crate::session::UserSummary;

/// Haptic feedback kinds the host can play
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Haptic {
    /// Light impact (taps)
    Light,
    /// Medium impact (navigation, opening details)
    Medium,
    /// Selection changed
    Selection,
    /// Success notification
    Success,
    /// Warning notification
    Warning,
    /// Error notification
    Error,
}

/// Structured payload relayed to the host bot
///
/// Serialized as a flat JSON object tagged by `action`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Application created without requisites; merchants must handle it
    NewAppMerchant {
        /// New application
        app_id: ApplicationId,
        /// Bank name
        bank_name: String,
        /// Amount in UAH
        amount: f64,
        /// Country name
        country_name: String,
    },
    /// Application created with requisites issued automatically
    AppCreated {
        /// New application
        app_id: ApplicationId,
    },
}

impl OutboundMessage {
    /// Action tag as it appears on the wire
    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            Self::NewAppMerchant { .. } => "new_app_merchant",
            Self::AppCreated { .. } => "app_created",
        }
    }

    /// JSON text handed to the host
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (non-finite amount).
    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Capability interface over the embedding host
///
/// Every method is fire-and-forget: none blocks and none fails the caller.
pub trait HostBridge: Send + Sync {
    /// Whether a real host is attached
    fn is_present(&self) -> bool;

    /// Opaque identity token (host init data)
    fn identity_token(&self) -> String;

    /// The user the host says is signed in
    fn user(&self) -> Option<UserSummary>;

    /// Play a haptic pulse
    fn pulse(&self, kind: Haptic);

    /// Relay a structured message to the host
    fn emit(&self, message: &OutboundMessage);

    /// Open a link through the host
    ///
    /// Returns `false` when no host can open it; the caller shows an in-app
    /// instruction instead.
    fn open_external(&self, url: &str) -> bool;
}
