//! View Router
//!
//! Owns the single active view. `navigate` is the only way to change it; a
//! change bumps the generation and triggers exactly one loader for the
//! target. Loaders receive a [`ViewTicket`] and check
//! [`ViewRouter::is_current`] before applying results, so data for a view the
//! user already left is dropped.

use std::fmt;
use std::str::FromStr;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Screens of the mini-app
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewId {
    /// Platform stats
    #[default]
    Home,
    /// The user's applications
    Applications,
    /// Creation wizard
    Create,
    /// Notification list
    Notifications,
    /// Profile and referral info
    Profile,
}

impl ViewId {
    /// Every view, in tab order
    pub const ALL: [ViewId; 5] = [
        ViewId::Home,
        ViewId::Applications,
        ViewId::Create,
        ViewId::Notifications,
        ViewId::Profile,
    ];

    /// Lowercase name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Applications => "applications",
            Self::Create => "create",
            Self::Notifications => "notifications",
            Self::Profile => "profile",
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|view| view.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown view: {s}"))
    }
}

/// Render stamp handed to a loader
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewTicket {
    /// View being loaded
    pub view: ViewId,
    /// Router generation at navigation time
    pub generation: u64,
}

/// Side effect run when a view becomes active
pub trait ViewLoader {
    /// What the loader hands back (typically a task handle)
    type Handle;

    /// Start loading data for `ticket.view`
    fn load(&self, ticket: ViewTicket) -> Self::Handle;
}

#[derive(Debug)]
struct RouterState {
    active: ViewId,
    generation: u64,
    initial_paint: bool,
}

/// Single-active-view router
#[derive(Debug)]
pub struct ViewRouter {
    state: RwLock<RouterState>,
}

impl Default for ViewRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRouter {
    /// Router on `home`, before the first paint
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RouterState {
                active: ViewId::Home,
                generation: 0,
                initial_paint: true,
            }),
        }
    }

    /// Switch to `target` and run its loader
    ///
    /// Returns `None` without side effects when `target` is already active.
    pub fn navigate<L: ViewLoader>(&self, target: ViewId, loader: &L) -> Option<L::Handle> {
        let ticket = {
            let mut state = self.state.write();
            if state.active == target {
                tracing::debug!(view = %target, "Already active, ignoring navigation");
                return None;
            }
            let from = state.active;
            state.active = target;
            state.generation += 1;
            state.initial_paint = false;
            tracing::debug!(%from, to = %target, generation = state.generation, "Navigated");
            ViewTicket {
                view: target,
                generation: state.generation,
            }
        };
        Some(loader.load(ticket))
    }

    /// Ticket for the view active right now
    #[must_use]
    pub fn current_ticket(&self) -> ViewTicket {
        let state = self.state.read();
        ViewTicket {
            view: state.active,
            generation: state.generation,
        }
    }

    /// Whether results for `ticket` may still be applied
    #[must_use]
    pub fn is_current(&self, ticket: &ViewTicket) -> bool {
        let state = self.state.read();
        state.active == ticket.view && state.generation == ticket.generation
    }

    /// Active view
    #[must_use]
    pub fn active(&self) -> ViewId {
        self.state.read().active
    }

    /// Whether no navigation happened yet
    #[must_use]
    pub fn is_initial_paint(&self) -> bool {
        self.state.read().initial_paint
    }
}
