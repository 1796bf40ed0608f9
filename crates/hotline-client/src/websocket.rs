//! WebSocket transport.
//!
//! Thin wrapper over `tokio-tungstenite` that turns one connection into an
//! ordered [`EventStream`].

use std::sync::Once;

use async_stream::stream;
use futures::StreamExt;
use rustls::crypto::CryptoProvider;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::endpoint::Endpoint;
use crate::transport::{CloseReason, EventStream, Transport, TransportEvent};

/// [`Transport`] backed by a real WebSocket connection.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    /// Create a new WebSocket transport.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Install the ring crypto provider for `wss` handshakes.
///
/// rustls panics on the first TLS connection when no process-wide provider
/// is set. A provider installed by the embedding application wins.
fn ensure_crypto_provider() {
    static INSTALL: Once = Once::new();

    INSTALL.call_once(|| {
        if CryptoProvider::get_default().is_some() {
            return;
        }
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            tracing::debug!("TLS crypto provider installed concurrently");
        }
    });
}

impl Transport for WebSocketTransport {
    fn open(&self, endpoint: &Endpoint) -> EventStream {
        if endpoint.is_secure() {
            ensure_crypto_provider();
        }
        let url = endpoint.as_str().to_owned();

        Box::pin(stream! {
            let mut socket = match connect_async(url.as_str()).await {
                Ok((socket, _response)) => socket,
                Err(e) => {
                    tracing::debug!(endpoint = %url, error = %e, "WebSocket handshake failed");
                    yield TransportEvent::Close(CloseReason::ConnectFailed(e.to_string()));
                    return;
                }
            };

            yield TransportEvent::Open;

            // Pings are answered by tungstenite while the stream is polled.
            while let Some(frame) = socket.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        yield TransportEvent::Message(text.as_str().to_owned());
                    }
                    Ok(Message::Close(frame)) => {
                        tracing::debug!(endpoint = %url, ?frame, "Server closed WebSocket");
                        yield TransportEvent::Close(CloseReason::Normal);
                        return;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        yield TransportEvent::Close(CloseReason::Error(e.to_string()));
                        return;
                    }
                }
            }

            yield TransportEvent::Close(CloseReason::Ended);
        })
    }
}
