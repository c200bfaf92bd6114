//! NightLab Core - Client Controller for the NightLab Mini-App
//!
//! This crate holds everything the NightLab mini-app does between the user's
//! taps and the remote API, independent of how it is rendered. A surface
//! (web view, terminal shell, test harness) feeds user actions into
//! [`MiniApp`] and renders what [`SurfaceMessage`]s tell it to.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Surface                               │
//! │        user actions (down)        SurfaceMessage (up)         │
//! └───────────────────────────┬──────────────────────────────────┘
//!                             │
//! ┌───────────────────────────┼──────────────────────────────────┐
//! │                        MiniApp                                │
//! │  ┌────────────┐  ┌────────────┐  ┌────────────┐  ┌─────────┐ │
//! │  │ ViewRouter │  │ Paginated  │  │   Wizard   │  │ Notif.  │ │
//! │  │            │  │   Lists    │  │ Controller │  │  Sync   │ │
//! │  └────────────┘  └─────┬──────┘  └──┬─────┬───┘  └────┬────┘ │
//! │                        │            │     │           │      │
//! │                  ┌─────┴────────────┴─┐ ┌─┴─────────┐ │      │
//! │                  │     ApiClient      │ │HostBridge │ │      │
//! │                  └─────────┬──────────┘ └───────────┘ │      │
//! └────────────────────────────┼──────────────────────────┼──────┘
//!                              ▼                          │
//!                      NightLab HTTP API ◀────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`MiniApp`]: composition root, one method per user action
//! - [`ViewRouter`]: the single active view and its render stamp
//! - [`PaginatedList`]: cursor-based fetch-and-append lists
//! - [`WizardController`]: the application creation state machine
//! - [`NotificationSync`]: notification list and unread badge
//! - [`HostBridge`]: the embedding chat host, present or absent
//!
//! # Quick Start
//!
//! ```ignore
//! use nightlab_core::{bridge, load_config, MiniApp, ViewId};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = load_config().unwrap();
//!     let (host, _commands) = bridge::resolve(None);
//!     let (tx, mut rx) = mpsc::channel(100);
//!
//!     let app = MiniApp::connect(config, host, tx).unwrap();
//!     app.start().await;
//!
//!     if let Some(load) = app.navigate(ViewId::Applications) {
//!         load.await.unwrap();
//!     }
//!     while let Ok(msg) = rx.try_recv() {
//!         // Render message
//!     }
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`api`]: transport seam, HTTP transport, typed client, wire records
//! - [`bridge`]: host capabilities with connected and absent variants
//! - [`pagination`]: generic paginated list controller
//! - [`wizard`]: creation wizard
//! - [`router`]: view routing
//! - [`notifications`]: notification sync
//! - [`views`]: per-view render state
//! - [`messages`]: messages to the surface
//! - [`format`]: currency, date and icon helpers
//! - [`animation`]: counter animation
//! - [`config`]: layered configuration
//! - [`test_utils`]: scripted transport for tests

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod api;
pub mod app;
pub mod bridge;
pub mod config;
pub mod error;
pub mod format;
pub mod messages;
pub mod notifications;
pub mod pagination;
pub mod router;
pub mod session;
pub mod test_utils;
pub mod views;
pub mod wizard;

// Re-exports for convenience
pub use api::{
    ApiClient, ApiTransport, Application, ApplicationId, ApplicationStatus, Choice,
    HttpTransport, Notification, StatusFilter,
};
pub use app::{LinkOutcome, MiniApp};
pub use bridge::{
    AbsentHost, ConnectedHost, Haptic, HostBridge, HostCommand, HostInit, OutboundMessage,
};
pub use error::{ApiError, ControllerError};
pub use messages::{Notifier, NotifyLevel, SurfaceMessage};
pub use notifications::NotificationSync;
pub use pagination::{ListQuery, ListStatus, LoadOutcome, PageSource, PaginatedList};
pub use router::{ViewId, ViewLoader, ViewRouter, ViewTicket};
pub use session::{Session, UserSummary};
pub use wizard::{Selection, SubmissionResult, WizardController, WizardSession, WizardStep};

// Animation exports
pub use animation::{CounterAnimation, CounterFrame, EasingFunction};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, MiniAppConfig,
};
