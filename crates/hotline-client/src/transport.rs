//! Transport abstraction.
//!
//! A [`Transport`] opens one connection per session and reports its lifecycle
//! as an ordered stream of [`TransportEvent`]s: at most one `Open`, then zero
//! or more `Message`s, then exactly one `Close`. Connection failures surface
//! as a `Close` without a preceding `Open`, never as an error.

use std::fmt;

use futures::stream::BoxStream;

use crate::endpoint::Endpoint;

/// Ordered lifecycle events of one connection.
pub type EventStream = BoxStream<'static, TransportEvent>;

/// Event emitted by a transport connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    /// Connection established.
    Open,
    /// Text payload received from the server.
    Message(String),
    /// Connection closed. Always the last event of a stream.
    Close(CloseReason),
}

/// Why a connection closed. Diagnostic only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CloseReason {
    /// The server closed the connection.
    Normal,
    /// The connection could not be established.
    ConnectFailed(String),
    /// The connection failed after being established.
    Error(String),
    /// The event stream ended without a close event.
    Ended,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => f.write_str("closed by server"),
            Self::ConnectFailed(reason) => write!(f, "connect failed: {reason}"),
            Self::Error(reason) => write!(f, "connection error: {reason}"),
            Self::Ended => f.write_str("stream ended"),
        }
    }
}

/// Connection factory for live reload sessions.
///
/// Implementations must not deliver events after `Close`. Dropping the
/// returned stream tears the connection down.
pub trait Transport: Send + Sync {
    /// Open a new connection to `endpoint`.
    fn open(&self, endpoint: &Endpoint) -> EventStream;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn open(&self, endpoint: &Endpoint) -> EventStream {
        (**self).open(endpoint)
    }
}
