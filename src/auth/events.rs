//! Process-wide session broadcast.
//!
//! The HTTP client emits [`SessionEvent::LoggedOut`] when it gives up on a
//! session and [`SessionEvent::LoginRequired`] a moment later, once
//! notifications have had time to render. The session store listens for the
//! former; the view layer navigates on the latter.

use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedOut,
    LoginRequired,
}

#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: SessionEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!(?event, "session event dropped; no listeners");
        }
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
