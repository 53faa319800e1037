use quiz_core::model::{Action, SessionId};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Session-level requests handed to the host instead of changing screen state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionSignal {
    TryAgain,
    NextStage,
    Close,
}

impl SessionSignal {
    #[must_use]
    pub fn for_action(action: &Action) -> Option<Self> {
        match action {
            Action::TryAgain => Some(SessionSignal::TryAgain),
            Action::NextStage => Some(SessionSignal::NextStage),
            Action::CloseLearnMode => Some(SessionSignal::Close),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_restart(self) -> bool {
        matches!(self, SessionSignal::TryAgain | SessionSignal::NextStage)
    }
}

pub trait SessionListener: Send + Sync {
    fn on_signal(&self, session: SessionId, signal: SessionSignal);
}

/// Drops every signal.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopListener;

impl SessionListener for NoopListener {
    fn on_signal(&self, session: SessionId, signal: SessionSignal) {
        debug!(%session, ?signal, "signal dropped");
    }
}

/// Forwards signals to a channel the host reads from.
#[derive(Clone, Debug)]
pub struct ChannelListener {
    tx: UnboundedSender<(SessionId, SessionSignal)>,
}

impl ChannelListener {
    #[must_use]
    pub fn new(tx: UnboundedSender<(SessionId, SessionSignal)>) -> Self {
        Self { tx }
    }
}

impl SessionListener for ChannelListener {
    fn on_signal(&self, session: SessionId, signal: SessionSignal) {
        if self.tx.send((session, signal)).is_err() {
            debug!(%session, ?signal, "signal receiver is gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn maps_only_session_actions() {
        assert_eq!(
            SessionSignal::for_action(&Action::TryAgain),
            Some(SessionSignal::TryAgain)
        );
        assert_eq!(
            SessionSignal::for_action(&Action::CloseLearnMode),
            Some(SessionSignal::Close)
        );
        assert_eq!(
            SessionSignal::for_action(&Action::Unknown("X".into())),
            None
        );
        assert!(SessionSignal::NextStage.is_restart());
        assert!(!SessionSignal::Close.is_restart());
    }

    #[test]
    fn channel_listener_forwards() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let listener = ChannelListener::new(tx);
        let session = SessionId::random();
        listener.on_signal(session, SessionSignal::NextStage);
        assert_eq!(rx.try_recv().unwrap(), (session, SessionSignal::NextStage));

        drop(rx);
        listener.on_signal(session, SessionSignal::Close);
    }
}
