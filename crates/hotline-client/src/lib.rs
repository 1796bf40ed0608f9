//! Live reload client for hotline.
//!
//! Keeps a page synchronized with a running development server: a single
//! WebSocket connection listens for the `reload` signal, the page is reloaded
//! when it arrives, and a dropped connection is transparently re-established.
//!
//! # Architecture
//!
//! ```text
//! LiveReloadClient ──owns──► current Session (Connecting → Open → Closed)
//!        │                          ▲
//!        │ open(endpoint)           │ TransportEvent
//!        ▼                          │
//!    Transport ─────────────────────┘   (WebSocketTransport, MockTransport)
//!        │
//!        └─► Directive::Reload ──► Page::reload()
//! ```
//!
//! The crate provides:
//! - [`Endpoint`] derived from the page URL (`http` → `ws`, `https` → `wss`)
//! - [`Session`], the I/O-free state machine for one connection attempt
//! - [`Transport`] trait with the [`WebSocketTransport`] implementation
//! - [`Page`] trait for the reload action
//! - [`LiveReloadClient`], the driver that owns the current session
//! - [`MockTransport`] and [`RecordingPage`] for testing (behind `mock` feature)
//!
//! # Example
//!
//! ```ignore
//! use hotline_client::{Endpoint, LiveReloadClient, WebSocketTransport};
//!
//! let endpoint = Endpoint::from_page_url("http://127.0.0.1:7979/guide")?;
//! let client = LiveReloadClient::new(endpoint, WebSocketTransport::new(), || {
//!     tracing::info!("page reloaded");
//! });
//! let reloaded = client.run().await;
//! ```

mod client;
mod endpoint;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod page;
mod session;
mod transport;
mod websocket;

pub use client::{DEFAULT_RETRY_DELAY, LiveReloadClient, Reloaded};
pub use endpoint::{Endpoint, EndpointError};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockTransport, RecordingPage};
pub use page::Page;
pub use session::{Directive, RELOAD_SIGNAL, Session, SessionState};
pub use transport::{CloseReason, EventStream, Transport, TransportEvent};
pub use websocket::WebSocketTransport;
