//! Mock transport and page for testing.
//!
//! Provides [`MockTransport`] and [`RecordingPage`] for driving the client
//! without a network or a browser.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use futures::stream;
use futures::{Stream, StreamExt};
use tokio::time::Instant;

use crate::endpoint::Endpoint;
use crate::page::Page;
use crate::transport::{EventStream, Transport, TransportEvent};

/// Events replayed by one connection.
#[derive(Debug)]
struct Script {
    events: Vec<TransportEvent>,
    hold_open: bool,
}

/// Open connection counters shared with every live stream.
#[derive(Debug, Default)]
struct Connections {
    live: AtomicUsize,
    peak: AtomicUsize,
}

/// Event stream that counts as a live connection until dropped.
struct Tracked {
    inner: EventStream,
    connections: Arc<Connections>,
}

impl Tracked {
    fn new(inner: EventStream, connections: &Arc<Connections>) -> Self {
        let live = connections.live.fetch_add(1, Ordering::SeqCst) + 1;
        connections.peak.fetch_max(live, Ordering::SeqCst);
        Self {
            inner,
            connections: Arc::clone(connections),
        }
    }
}

impl Stream for Tracked {
    type Item = TransportEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.connections.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Scripted transport.
///
/// Each call to [`Transport::open`] replays the next scripted session. Once
/// the script is exhausted, connections stay in `Connecting` forever, which
/// lets tests observe the client at rest.
///
/// # Example
///
/// ```ignore
/// use hotline_client::{MockTransport, TransportEvent};
///
/// let transport = MockTransport::new()
///     .with_session(vec![TransportEvent::Open, TransportEvent::Message("reload".into())]);
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    sessions: Mutex<VecDeque<Script>>,
    opened: Mutex<Vec<(Endpoint, Instant)>>,
    connections: Arc<Connections>,
}

impl MockTransport {
    /// Create a mock transport with no scripted sessions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a scripted session.
    ///
    /// Events are delivered in order. A script without a trailing `Close`
    /// ends the stream, which the client treats as a close.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_session(self, events: Vec<TransportEvent>) -> Self {
        self.push(events, false)
    }

    /// Append a scripted session that stays connected after its events.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_held_session(self, events: Vec<TransportEvent>) -> Self {
        self.push(events, true)
    }

    fn push(self, events: Vec<TransportEvent>, hold_open: bool) -> Self {
        self.sessions
            .lock()
            .unwrap()
            .push_back(Script { events, hold_open });
        self
    }

    /// Number of connections opened so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.opened.lock().unwrap().len()
    }

    /// Instants at which connections were opened.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn open_times(&self) -> Vec<Instant> {
        self.opened.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }

    /// Endpoints that connections were opened to.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.opened
            .lock()
            .unwrap()
            .iter()
            .map(|(endpoint, _)| endpoint.clone())
            .collect()
    }

    /// Number of connections whose event stream has not been dropped yet.
    #[must_use]
    pub fn live_connections(&self) -> usize {
        self.connections.live.load(Ordering::SeqCst)
    }

    /// Highest number of connections that were live at the same time.
    #[must_use]
    pub fn peak_connections(&self) -> usize {
        self.connections.peak.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    fn open(&self, endpoint: &Endpoint) -> EventStream {
        self.opened
            .lock()
            .unwrap()
            .push((endpoint.clone(), Instant::now()));

        let events: EventStream = match self.sessions.lock().unwrap().pop_front() {
            Some(Script {
                events,
                hold_open: true,
            }) => Box::pin(stream::iter(events).chain(stream::pending())),
            Some(Script { events, .. }) => Box::pin(stream::iter(events)),
            None => Box::pin(stream::pending()),
        };
        Box::pin(Tracked::new(events, &self.connections))
    }
}

/// Page that counts reloads.
///
/// Clones share the same counter, so a clone can be handed to the client
/// while the test keeps another.
#[derive(Clone, Debug, Default)]
pub struct RecordingPage {
    reloads: Arc<AtomicUsize>,
}

impl RecordingPage {
    /// Create a page with no recorded reloads.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reloads performed.
    #[must_use]
    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl Page for RecordingPage {
    fn reload(&mut self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }
}
