//! View State
//!
//! Render state behind each screen. Views hold what was last loaded; the
//! [`MiniApp`](crate::MiniApp) decides when to load and whether a result is
//! still wanted.

mod applications;
mod home;
mod profile;

pub use applications::{ApplicationPages, ApplicationsView};
pub use home::{HomeView, StatCounter};
pub use profile::{ProfileData, ProfileView};

/// Outcome of the last load of a single-record view
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Loaded<T> {
    /// Nothing loaded yet
    #[default]
    Pending,
    /// Data available
    Ready(T),
    /// Last load failed
    Failed(String),
}

impl<T> Loaded<T> {
    /// Data, if loaded
    #[must_use]
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }

    /// Whether the last load failed
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}
