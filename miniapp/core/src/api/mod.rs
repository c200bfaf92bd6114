//! Remote API Integration
//!
//! Communication with the NightLab server: the transport seam, its reqwest
//! implementation, the typed endpoint client, and the wire records.

mod client;
mod http;
pub mod models;
mod traits;

pub use client::ApiClient;
pub use http::HttpTransport;
pub use models::{
    Application, ApplicationId, ApplicationStatus, Choice, CreateApplication,
    CreateApplicationResponse, Notification, PlatformStats, StatusFilter, UserProfile, UserStats,
};
pub use traits::ApiTransport;
