//! CLI error types.

use hotline_client::EndpointError;
use hotline_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Endpoint(#[from] EndpointError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
