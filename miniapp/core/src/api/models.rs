//! API Records
//!
//! Wire shapes of the remote API. Field names follow the server's JSON
//! exactly; optional fields default so older servers still decode.

use serde::{Deserialize, Serialize};

/// Application identifier assigned by the server
pub type ApplicationId = i64;

/// Platform-wide counters shown on the home view
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformStats {
    /// Applications ever created
    #[serde(default)]
    pub total_applications: u64,
    /// Total turnover in UAH
    #[serde(default)]
    pub turnover: f64,
    /// Registered users
    #[serde(default)]
    pub total_users: u64,
    /// Applications created today
    #[serde(default)]
    pub today_applications: u64,
}

/// Profile of the signed-in user
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Platform username (without `@`)
    pub username: String,
    /// Role label
    #[serde(default)]
    pub role: String,
    /// Balance in UAH
    #[serde(default)]
    pub balance_uah: f64,
    /// Number of invited users
    #[serde(default)]
    pub referral_count: u64,
    /// Personal referral link
    #[serde(default)]
    pub referral_link: String,
}

/// Per-user application counters
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    /// Applications created by this user
    #[serde(default)]
    pub total_applications: u64,
    /// Applications confirmed
    #[serde(default)]
    pub confirmed_applications: u64,
    /// Amount spent in UAH across confirmed applications
    #[serde(default)]
    pub total_spent: f64,
}

/// Lifecycle status of an application
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    /// Waiting for a merchant to pick it up
    WaitingMerchant,
    /// A merchant took it
    MerchantTaken,
    /// Requisites issued, waiting for the user to pay
    WaitingPayment,
    /// Waiting for the payment receipt
    WaitingReceipt,
    /// Receipt under review
    WaitingCheck,
    /// Payment confirmed
    Confirmed,
    /// Rejected by an operator
    Rejected,
    /// Payment window elapsed
    Expired,
    /// Status code this client does not know
    #[serde(other)]
    Unknown,
}

impl ApplicationStatus {
    /// Wire code used in query strings
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::WaitingMerchant => "WAITING_MERCHANT",
            Self::MerchantTaken => "MERCHANT_TAKEN",
            Self::WaitingPayment => "WAITING_PAYMENT",
            Self::WaitingReceipt => "WAITING_RECEIPT",
            Self::WaitingCheck => "WAITING_CHECK",
            Self::Confirmed => "CONFIRMED",
            Self::Rejected => "REJECTED",
            Self::Expired => "EXPIRED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Whether the application reached a final state
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Rejected | Self::Expired)
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Filter for the applications list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    /// Every application
    #[default]
    All,
    /// Only applications in the given status
    Only(ApplicationStatus),
}

impl StatusFilter {
    /// Status code to send, `None` for `All`
    #[must_use]
    pub fn status_code(self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Only(status) => Some(status.code()),
        }
    }
}

/// An application as listed or shown in detail
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Application {
    /// Server identifier
    pub id: ApplicationId,
    /// Bank name
    pub bank_name: String,
    /// Amount in UAH
    pub amount_uah: f64,
    /// Payment code the user quotes
    pub payment_code: String,
    /// Status code
    pub status: ApplicationStatus,
    /// Human-readable status label
    #[serde(default)]
    pub status_label: String,
    /// Creation timestamp (ISO-8601)
    pub created_at: String,
    /// Payment requisites, detail view only
    #[serde(default)]
    pub requisites: Option<String>,
    /// Payment deadline (ISO-8601), detail view only
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// A selectable country or bank
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Server identifier
    pub id: i64,
    /// Display name
    pub name: String,
}

/// Body of `POST /api/applications/create`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CreateApplication {
    /// Host identity token, echoed in the body as well as the header
    pub init_data: String,
    /// Selected country
    pub country_id: i64,
    /// Selected bank
    pub bank_id: i64,
    /// Requested amount in UAH
    pub amount_uah: f64,
}

/// Response of `POST /api/applications/create`
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CreateApplicationResponse {
    /// Whether the application was created
    pub success: bool,
    /// Identifier of the new application
    #[serde(default)]
    pub app_id: Option<ApplicationId>,
    /// Message for the user
    #[serde(default)]
    pub message: Option<String>,
    /// Requisites when issued automatically
    #[serde(default)]
    pub requisites: Option<String>,
    /// Bank name as stored by the server
    #[serde(default)]
    pub bank_name: Option<String>,
    /// Amount as stored by the server
    #[serde(default)]
    pub amount: Option<f64>,
    /// Country name as stored by the server
    #[serde(default)]
    pub country_name: Option<String>,
}

/// A notification addressed to the user
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Server identifier
    pub id: i64,
    /// Type tag (`requisites`, `confirmed`, `rejected`, ...)
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Title line
    #[serde(default)]
    pub title: String,
    /// Body text
    #[serde(default)]
    pub message: String,
    /// Whether the user has read it
    #[serde(default)]
    pub is_read: bool,
    /// Creation timestamp (ISO-8601)
    pub created_at: String,
    /// When it was read, if ever
    #[serde(default)]
    pub read_at: Option<String>,
}

/// Response of `GET /api/notifications/unread-count`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct UnreadCount {
    /// Unread notifications
    pub count: u64,
}
