//! Connected Host
//!
//! Bridge for a real embedding host. The host runtime (a WebView glue layer,
//! a bot-side relay) owns the receiving end of a channel and executes each
//! [`HostCommand`] natively.

use tokio::sync::mpsc;

use super::traits::{Haptic, HostBridge, OutboundMessage};
use crate::session::UserSummary;

/// Command for the host runtime
#[derive(Clone, Debug, PartialEq)]
pub enum HostCommand {
    /// Play a haptic pulse
    Pulse(Haptic),
    /// Relay serialized data to the bot
    SendData(String),
    /// Open a link in the host
    OpenLink(String),
}

/// Identity handed over by the host at startup
#[derive(Clone, Debug)]
pub struct HostInit {
    /// Raw signed init data
    pub init_data: String,
    /// User parsed from the init data, if any
    pub user: Option<UserSummary>,
}

/// Bridge to an attached host
#[derive(Debug)]
pub struct ConnectedHost {
    init: HostInit,
    tx: mpsc::UnboundedSender<HostCommand>,
}

impl ConnectedHost {
    /// Create a bridge and the receiver the host runtime drains
    #[must_use]
    pub fn new(init: HostInit) -> (Self, mpsc::UnboundedReceiver<HostCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { init, tx }, rx)
    }

    fn send(&self, command: HostCommand) -> bool {
        if let Err(e) = self.tx.send(command) {
            tracing::warn!("Host runtime gone, dropping command: {:?}", e.0);
            return false;
        }
        true
    }
}

impl HostBridge for ConnectedHost {
    fn is_present(&self) -> bool {
        true
    }

    fn identity_token(&self) -> String {
        self.init.init_data.clone()
    }

    fn user(&self) -> Option<UserSummary> {
        self.init.user.clone()
    }

    fn pulse(&self, kind: Haptic) {
        self.send(HostCommand::Pulse(kind));
    }

    fn emit(&self, message: &OutboundMessage) {
        match message.to_payload() {
            Ok(payload) => {
                self.send(HostCommand::SendData(payload));
            }
            Err(e) => tracing::warn!(action = message.action(), "Failed to encode host message: {}", e),
        }
    }

    fn open_external(&self, url: &str) -> bool {
        self.send(HostCommand::OpenLink(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> (ConnectedHost, mpsc::UnboundedReceiver<HostCommand>) {
        ConnectedHost::new(HostInit {
            init_data: "query_id=abc&hash=def".into(),
            user: Some(UserSummary {
                id: 77,
                username: Some("alice".into()),
            }),
        })
    }

    #[test]
    fn test_identity_from_init() {
        let (host, _rx) = host();
        assert!(host.is_present());
        assert_eq!(host.identity_token(), "query_id=abc&hash=def");
        assert_eq!(host.user().unwrap().id, 77);
    }

    #[test]
    fn test_commands_forwarded() {
        let (host, mut rx) = host();
        host.pulse(Haptic::Success);
        host.emit(&OutboundMessage::AppCreated { app_id: 3 });
        assert!(host.open_external("https://t.me/nightlab_support"));

        assert_eq!(rx.try_recv().unwrap(), HostCommand::Pulse(Haptic::Success));
        assert_eq!(
            rx.try_recv().unwrap(),
            HostCommand::SendData(r#"{"action":"app_created","app_id":3}"#.into())
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            HostCommand::OpenLink("https://t.me/nightlab_support".into())
        );
    }

    #[test]
    fn test_closed_runtime_cannot_open_links() {
        let (host, rx) = host();
        drop(rx);
        assert!(!host.open_external("https://t.me/x"));
    }
}
