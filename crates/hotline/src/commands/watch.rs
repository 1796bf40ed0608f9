//! `hotline watch` command implementation.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use hotline_client::{Endpoint, LiveReloadClient, WebSocketTransport};
use hotline_config::{CliSettings, Config};

use crate::error::CliError;
use crate::hook::ReloadHook;
use crate::output::{Output, command_label};

/// Arguments for the watch command.
#[derive(Args)]
pub(crate) struct WatchArgs {
    /// Path to configuration file (default: auto-discover hotline.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// URL of the page served by the development server (overrides config).
    #[arg(short, long, env = "HOTLINE_URL")]
    url: Option<String>,

    /// Delay in milliseconds before reconnecting after a disconnect (overrides config).
    #[arg(long)]
    retry_delay_ms: Option<u64>,

    /// Shell command to run on every reload (overrides config).
    #[arg(short = 'x', long)]
    exec: Option<String>,

    /// Enable verbose output (show connection lifecycle logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl WatchArgs {
    /// Execute the watch command.
    ///
    /// Runs until interrupted with Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the page URL is invalid.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            url: self.url,
            retry_delay_ms: self.retry_delay_ms,
            command: self.exec,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let endpoint = Endpoint::from_page_url(&config.client.url)?;

        output.watching(&config.client.url);
        if let Some(path) = &config.config_path {
            output.setting("Config", &path.display());
        }
        output.setting("Endpoint", &endpoint);
        output.setting("Retry delay", &format!("{} ms", config.client.retry_delay_ms));
        output.setting(
            "Reload command",
            &command_label(config.reload.command.as_deref()),
        );

        let hook = ReloadHook::new(config.reload.command.clone(), config.reload.clear_screen);

        tokio::select! {
            () = watch(endpoint, config.client.retry_delay(), hook) => {}
            result = tokio::signal::ctrl_c() => {
                result?;
                output.stopped();
            }
        }

        Ok(())
    }
}

/// Keep the page in sync forever.
///
/// Each iteration is one page load: a reload ends the current client and
/// the reloaded page connects again with a fresh one.
async fn watch(endpoint: Endpoint, retry_delay: Duration, hook: ReloadHook) {
    let transport = WebSocketTransport::new();
    let mut page_loads: u64 = 0;

    loop {
        let client = LiveReloadClient::new(endpoint.clone(), transport, hook.clone())
            .with_retry_delay(retry_delay);
        let reloaded = client.run().await;

        page_loads += 1;
        tracing::debug!(
            page_loads,
            session = reloaded.session_id,
            retries = reloaded.retries,
            "Page reloaded"
        );
    }
}
