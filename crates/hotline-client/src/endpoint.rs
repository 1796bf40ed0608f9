//! Live reload endpoint.
//!
//! The development server listens on the same host as the page it serves, so
//! the endpoint is derived from the page URL: the scheme is mapped to its
//! WebSocket counterpart and everything after the authority is dropped.

use std::fmt;

use url::Url;

/// Error deriving an [`Endpoint`] from a page URL.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    /// The page URL could not be parsed.
    #[error("Invalid page URL: {0}")]
    Parse(#[from] url::ParseError),
    /// The page URL uses a scheme with no WebSocket counterpart.
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}

/// WebSocket endpoint of the development server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
}

impl Endpoint {
    /// Derive the endpoint from the URL of the page being kept in sync.
    ///
    /// `http` maps to `ws` and `https` maps to `wss`. WebSocket URLs are
    /// accepted as-is. Host and port are kept; credentials, path, query and
    /// fragment are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::Parse`] if the URL is malformed and
    /// [`EndpointError::UnsupportedScheme`] for non-HTTP(S), non-WS(S) URLs.
    pub fn from_page_url(page_url: &str) -> Result<Self, EndpointError> {
        let page = Url::parse(page_url)?;

        let scheme = match page.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => return Err(EndpointError::UnsupportedScheme(other.to_owned())),
        };

        // Special schemes always carry a host; IPv6 hosts keep their brackets.
        let host = page.host_str().ok_or(url::ParseError::EmptyHost)?;
        let port = page.port().map(|port| format!(":{port}")).unwrap_or_default();
        let url = Url::parse(&format!("{scheme}://{host}{port}/"))?;

        Ok(Self { url })
    }

    /// Whether the endpoint uses the encrypted sub-protocol (`wss`).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.url.scheme() == "wss"
    }

    /// Endpoint URL as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
