//! Connection session state machine.
//!
//! A [`Session`] is one attempt, from connect to close, to keep a live
//! connection to the development server. It performs no I/O: the client feeds
//! it [`TransportEvent`]s and carries out the returned [`Directive`].
//!
//! ```text
//! Connecting ──Open──► Open ──Message("reload")──► Open (reloading)
//!      │                 │
//!      └──────Close──────┴──► Closed ──► Finished (reloading) | Retry
//! ```

use crate::transport::TransportEvent;

/// The only payload the client reacts to.
pub const RELOAD_SIGNAL: &str = "reload";

/// Lifecycle state of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the transport to open.
    Connecting,
    /// Connected and receiving messages.
    Open,
    /// Transport closed. Terminal.
    Closed,
}

/// Action the client must take after an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directive {
    /// Nothing to do, keep listening.
    Continue,
    /// Perform a full page reload.
    Reload,
    /// Unexpected disconnect: start a retry session after the retry delay.
    Retry,
    /// Session is over and needs no recovery.
    Finished,
}

/// One connection attempt.
#[derive(Debug)]
pub struct Session {
    id: u64,
    is_retry_attempt: bool,
    state: SessionState,
    reloading: bool,
}

impl Session {
    /// Create a session in the `Connecting` state.
    ///
    /// `is_retry_attempt` marks sessions created to recover from a prior
    /// disconnect; opening such a session reloads the page.
    #[must_use]
    pub fn new(id: u64, is_retry_attempt: bool) -> Self {
        Self {
            id,
            is_retry_attempt,
            state: SessionState::Connecting,
            reloading: false,
        }
    }

    /// Session number, unique within one client.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether this session recovers from a prior disconnect.
    #[must_use]
    pub fn is_retry_attempt(&self) -> bool {
        self.is_retry_attempt
    }

    /// Whether this session has triggered a reload.
    #[must_use]
    pub fn is_reloading(&self) -> bool {
        self.reloading
    }

    /// Apply a transport event and return what the client must do.
    pub fn handle(&mut self, event: TransportEvent) -> Directive {
        match event {
            TransportEvent::Open => self.on_open(),
            TransportEvent::Message(payload) => self.on_message(&payload),
            TransportEvent::Close(_) => self.on_close(),
        }
    }

    fn on_open(&mut self) -> Directive {
        if self.state != SessionState::Connecting {
            return self.ignored();
        }
        self.state = SessionState::Open;

        // The page went stale while disconnected.
        if self.is_retry_attempt {
            return self.begin_reload();
        }
        Directive::Continue
    }

    fn on_message(&mut self, payload: &str) -> Directive {
        if self.state != SessionState::Open {
            return self.ignored();
        }
        if payload == RELOAD_SIGNAL && !self.reloading {
            return self.begin_reload();
        }
        Directive::Continue
    }

    fn on_close(&mut self) -> Directive {
        if self.state == SessionState::Closed {
            return Directive::Finished;
        }
        self.state = SessionState::Closed;

        if self.reloading {
            Directive::Finished
        } else {
            Directive::Retry
        }
    }

    fn begin_reload(&mut self) -> Directive {
        self.reloading = true;
        Directive::Reload
    }

    fn ignored(&self) -> Directive {
        if self.state == SessionState::Closed {
            Directive::Finished
        } else {
            Directive::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::CloseReason;
    use pretty_assertions::assert_eq;

    fn message(payload: &str) -> TransportEvent {
        TransportEvent::Message(payload.to_owned())
    }

    fn close() -> TransportEvent {
        TransportEvent::Close(CloseReason::Normal)
    }

    #[test]
    fn test_new_session_is_connecting() {
        let session = Session::new(0, false);

        assert_eq!(session.id(), 0);
        assert_eq!(session.state(), SessionState::Connecting);
        assert!(!session.is_retry_attempt());
        assert!(!session.is_reloading());
    }

    #[test]
    fn test_initial_open_does_not_reload() {
        let mut session = Session::new(0, false);

        assert_eq!(session.handle(TransportEvent::Open), Directive::Continue);
        assert_eq!(session.state(), SessionState::Open);
    }

    #[test]
    fn test_reload_signal_triggers_reload() {
        let mut session = Session::new(0, false);
        session.handle(TransportEvent::Open);

        assert_eq!(session.handle(message("reload")), Directive::Reload);
        assert!(session.is_reloading());
    }

    #[test]
    fn test_reload_suppresses_retry() {
        let mut session = Session::new(0, false);
        session.handle(TransportEvent::Open);
        session.handle(message("reload"));

        assert_eq!(session.handle(close()), Directive::Finished);
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn test_unexpected_close_after_open_retries() {
        let mut session = Session::new(0, false);
        session.handle(TransportEvent::Open);

        assert_eq!(session.handle(close()), Directive::Retry);
    }

    #[test]
    fn test_close_while_connecting_retries() {
        let mut session = Session::new(3, true);

        let directive = session.handle(TransportEvent::Close(CloseReason::ConnectFailed(
            "connection refused".to_owned(),
        )));

        assert_eq!(directive, Directive::Retry);
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn test_retry_session_reloads_on_open() {
        let mut session = Session::new(1, true);

        assert_eq!(session.handle(TransportEvent::Open), Directive::Reload);
        assert!(session.is_reloading());
    }

    #[test]
    fn test_retry_session_reloads_exactly_once() {
        let mut session = Session::new(1, true);

        let directives: Vec<_> = [
            TransportEvent::Open,
            message("reload"),
            message("reload"),
            close(),
        ]
        .into_iter()
        .map(|event| session.handle(event))
        .collect();

        assert_eq!(
            directives,
            vec![
                Directive::Reload,
                Directive::Continue,
                Directive::Continue,
                Directive::Finished,
            ]
        );
    }

    #[test]
    fn test_unknown_signals_ignored() {
        let mut session = Session::new(0, false);
        session.handle(TransportEvent::Open);

        for payload in ["ping", "", "Reload", "reload ", " reload", "{\"type\":\"reload\"}"] {
            assert_eq!(session.handle(message(payload)), Directive::Continue);
        }

        assert_eq!(session.state(), SessionState::Open);
        assert!(!session.is_reloading());
        assert_eq!(session.handle(close()), Directive::Retry);
    }

    #[test]
    fn test_message_before_open_ignored() {
        let mut session = Session::new(0, false);

        assert_eq!(session.handle(message("reload")), Directive::Continue);
        assert_eq!(session.state(), SessionState::Connecting);
        assert!(!session.is_reloading());
    }

    #[test]
    fn test_events_after_close_ignored() {
        let mut session = Session::new(0, false);
        session.handle(TransportEvent::Open);
        assert_eq!(session.handle(close()), Directive::Retry);

        assert_eq!(session.handle(TransportEvent::Open), Directive::Finished);
        assert_eq!(session.handle(message("reload")), Directive::Finished);
        assert_eq!(session.handle(close()), Directive::Finished);
        assert_eq!(session.state(), SessionState::Closed);
        assert!(!session.is_reloading());
    }

    #[test]
    fn test_duplicate_open_ignored() {
        let mut session = Session::new(1, true);
        assert_eq!(session.handle(TransportEvent::Open), Directive::Reload);

        assert_eq!(session.handle(TransportEvent::Open), Directive::Continue);
    }
}
