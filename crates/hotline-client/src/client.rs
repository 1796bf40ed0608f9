//! Live reload client.
//!
//! Owns the single current [`Session`] and turns transport events into page
//! reloads or reconnect attempts. Sessions are driven by an explicit loop that
//! reassigns the session slot, so a page that reconnects thousands of times
//! never grows the call stack.

use std::time::Duration;

use futures::StreamExt;

use crate::endpoint::Endpoint;
use crate::page::Page;
use crate::session::{Directive, Session, SessionState};
use crate::transport::{CloseReason, EventStream, Transport, TransportEvent};

/// Delay between an unexpected close and the next connection attempt.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(2000);

/// Returned by [`LiveReloadClient::run`] once the page has been reloaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reloaded {
    /// Session that triggered the reload.
    pub session_id: u64,
    /// Retry sessions started before the reload.
    pub retries: u64,
}

/// Session occupying the slot, with its event stream.
struct ActiveSession {
    session: Session,
    events: EventStream,
}

/// How the current session ended.
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    Reloaded,
    Disconnected,
}

impl SessionEnd {
    /// Outcome of a session that has nothing left to handle.
    ///
    /// Only a session that actually reloaded the page counts as reloaded.
    fn finished(session: &Session) -> Self {
        if session.is_reloading() {
            Self::Reloaded
        } else {
            Self::Disconnected
        }
    }
}

/// Keeps a page synchronized with a development server.
///
/// One client corresponds to one page load: [`run`](Self::run) returns after
/// the page has been reloaded, and the caller creates a fresh client for the
/// reloaded page.
pub struct LiveReloadClient<T, P> {
    endpoint: Endpoint,
    transport: T,
    page: P,
    retry_delay: Duration,
    current: Option<ActiveSession>,
    next_session_id: u64,
    /// Consecutive unexpected closes since the last successful open.
    attempt: u64,
    retries: u64,
}

impl<T: Transport, P: Page> LiveReloadClient<T, P> {
    /// Create a client for `endpoint`. No connection is made until
    /// [`start`](Self::start) or [`run`](Self::run) is called.
    #[must_use]
    pub fn new(endpoint: Endpoint, transport: T, page: P) -> Self {
        Self {
            endpoint,
            transport,
            page,
            retry_delay: DEFAULT_RETRY_DELAY,
            current: None,
            next_session_id: 0,
            attempt: 0,
            retries: 0,
        }
    }

    /// Set the delay between an unexpected close and the next attempt.
    #[must_use]
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Endpoint this client connects to.
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Delay between an unexpected close and the next attempt.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Session currently occupying the slot, if any.
    #[must_use]
    pub fn current_session(&self) -> Option<&Session> {
        self.current.as_ref().map(|active| &active.session)
    }

    /// Open a new session, replacing the current one.
    ///
    /// The previous transport is dropped before the new one is opened, so at
    /// most one connection exists at any time.
    pub fn start(&mut self, is_retry_attempt: bool) {
        self.current = None;

        let id = self.next_session_id;
        self.next_session_id += 1;
        if is_retry_attempt {
            self.retries += 1;
        }

        tracing::info!(
            session = id,
            retry = is_retry_attempt,
            endpoint = %self.endpoint,
            "Connecting"
        );

        let events = self.transport.open(&self.endpoint);
        self.current = Some(ActiveSession {
            session: Session::new(id, is_retry_attempt),
            events,
        });
    }

    /// Drive sessions until the page has been reloaded.
    ///
    /// Starts the initial session unless one was already started. Every
    /// unexpected close is followed by a fixed [`retry_delay`](Self::retry_delay)
    /// and a retry session, indefinitely. Never fails.
    pub async fn run(mut self) -> Reloaded {
        if self.current.is_none() {
            self.start(false);
        }

        loop {
            match self.drive_current().await {
                SessionEnd::Reloaded => {
                    let session_id = self.current_session().map_or(0, Session::id);
                    return Reloaded {
                        session_id,
                        retries: self.retries,
                    };
                }
                SessionEnd::Disconnected => {
                    tokio::time::sleep(self.retry_delay).await;
                    tracing::info!(attempt = self.attempt, "Retrying connection");
                    self.start(true);
                }
            }
        }
    }

    /// Feed transport events into the current session until it ends.
    async fn drive_current(&mut self) -> SessionEnd {
        let Some(active) = self.current.as_mut() else {
            return SessionEnd::Disconnected;
        };

        loop {
            let event = active
                .events
                .next()
                .await
                .unwrap_or(TransportEvent::Close(CloseReason::Ended));
            let close_reason = match &event {
                TransportEvent::Close(reason) => Some(reason.clone()),
                _ => None,
            };

            let before = active.session.state();
            let directive = active.session.handle(event);
            let id = active.session.id();

            if before == SessionState::Connecting && active.session.state() == SessionState::Open {
                self.attempt = 0;
                tracing::info!(session = id, endpoint = %self.endpoint, "Connected");
            }

            match directive {
                Directive::Continue => {}
                Directive::Reload => {
                    tracing::info!(session = id, "Reloading");
                    self.page.reload();
                    return SessionEnd::Reloaded;
                }
                Directive::Retry => {
                    self.attempt += 1;
                    tracing::warn!(
                        session = id,
                        attempt = self.attempt,
                        reason = %close_reason.unwrap_or(CloseReason::Ended),
                        retry_delay = ?self.retry_delay,
                        "Connection closed"
                    );
                    return SessionEnd::Disconnected;
                }
                Directive::Finished => {
                    tracing::debug!(session = id, "Session finished");
                    return SessionEnd::finished(&active.session);
                }
            }
        }
    }
}
