//! Reload hook.
//!
//! The page kept in sync by the CLI: every reload is announced on the terminal
//! and, if configured, runs a shell command in the background.

use hotline_client::Page;
use tokio::process::Command;

use crate::output::Output;

/// [`Page`] implementation that runs a command on every reload.
#[derive(Clone, Debug)]
pub(crate) struct ReloadHook {
    command: Option<String>,
    clear_screen: bool,
}

impl ReloadHook {
    /// Create a hook running `command` (if any) on reload.
    pub(crate) fn new(command: Option<String>, clear_screen: bool) -> Self {
        Self {
            command,
            clear_screen,
        }
    }

    /// Spawn the reload command without waiting for it.
    ///
    /// Must be called from within a tokio runtime.
    fn spawn_command(command: &str) {
        let mut child = match shell_command(command).spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(command, error = %e, "Failed to run reload command");
                return;
            }
        };

        let command = command.to_owned();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => {
                    tracing::debug!(%command, "Reload command finished");
                }
                Ok(status) => {
                    Output::new().warning(&format!("Reload command exited with {status}"));
                }
                Err(e) => {
                    tracing::warn!(%command, error = %e, "Failed to wait for reload command");
                }
            }
        });
    }
}

impl Page for ReloadHook {
    fn reload(&mut self) {
        let output = Output::new();
        if self.clear_screen {
            output.clear();
        }
        output.reloading();

        if let Some(command) = &self.command {
            Self::spawn_command(command);
        }
    }
}

/// Build a command that runs `command` through the platform shell.
fn shell_command(command: &str) -> Command {
    #[cfg(windows)]
    let (shell, flag) = ("cmd", "/C");
    #[cfg(not(windows))]
    let (shell, flag) = ("sh", "-c");

    let mut cmd = Command::new(shell);
    cmd.arg(flag).arg(command);
    cmd
}

#[cfg(test)]
mod tests {
    #[cfg(unix)]
    use std::path::Path;
    #[cfg(unix)]
    use std::time::Duration;

    use super::*;
    use pretty_assertions::assert_eq;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_command_runs_through_shell() {
        let out = shell_command("echo reloaded && echo twice")
            .output()
            .await
            .unwrap();

        assert!(out.status.success());
        assert_eq!(String::from_utf8_lossy(&out.stdout), "reloaded\ntwice\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_command_reports_failure() {
        let status = shell_command("exit 3").status().await.unwrap();

        assert_eq!(status.code(), Some(3));
    }

    /// Poll until `path` holds `expected` or the timeout elapses.
    #[cfg(unix)]
    async fn wait_for_contents(path: &Path, expected: &str) -> String {
        let poll = async {
            loop {
                if let Ok(contents) = std::fs::read_to_string(path)
                    && contents == expected
                {
                    return contents;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(5), poll)
            .await
            .unwrap_or_else(|_| panic!("{} never contained {expected:?}", path.display()))
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_reload_runs_command() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("reloaded");
        let command = format!("echo reloaded > '{}'", marker.display());
        let mut hook = ReloadHook::new(Some(command), false);

        hook.reload();

        assert_eq!(wait_for_contents(&marker, "reloaded\n").await, "reloaded\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_reload_runs_command_every_time() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("reloads.log");
        let command = format!("echo tick >> '{}'", log.display());
        let mut hook = ReloadHook::new(Some(command), false);

        hook.reload();
        wait_for_contents(&log, "tick\n").await;
        hook.reload();

        assert_eq!(wait_for_contents(&log, "tick\ntick\n").await, "tick\ntick\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_command_does_not_stop_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("after-failure");
        let mut failing = ReloadHook::new(Some("exit 7".to_owned()), false);
        let mut next = ReloadHook::new(Some(format!("echo ok > '{}'", marker.display())), false);

        failing.reload();
        next.reload();

        assert_eq!(wait_for_contents(&marker, "ok\n").await, "ok\n");
    }

    // Spawning needs a tokio runtime, so this would panic if a process started.
    #[test]
    fn test_reload_without_command_spawns_nothing() {
        let mut hook = ReloadHook::new(None, false);

        hook.reload();
    }
}
