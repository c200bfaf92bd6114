//! Host Bridge
//!
//! Boundary to the embedding chat host, with a connected and an absent
//! implementation.

mod absent;
mod connected;
mod traits;

use std::sync::Arc;

pub use absent::{AbsentHost, FALLBACK_TOKEN, FALLBACK_USER_ID};
pub use connected::{ConnectedHost, HostCommand, HostInit};
pub use traits::{Haptic, HostBridge, OutboundMessage};

/// Resolve the bridge once at startup
///
/// Returns the connected bridge and its command receiver when the host handed
/// over init data, otherwise the absent fallback.
#[must_use]
pub fn resolve(
    init: Option<HostInit>,
) -> (
    Arc<dyn HostBridge>,
    Option<tokio::sync::mpsc::UnboundedReceiver<HostCommand>>,
) {
    match init {
        Some(init) if !init.init_data.is_empty() => {
            let (host, rx) = ConnectedHost::new(init);
            (Arc::new(host), Some(rx))
        }
        _ => {
            tracing::warn!("Host bridge not available, running in fallback mode");
            (Arc::new(AbsentHost::new()), None)
        }
    }
}
