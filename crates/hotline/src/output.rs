//! Terminal output for `hotline watch`.
//!
//! Everything goes to stderr so a reload command's own stdout stays clean.

use std::fmt::Display;

use console::{Style, Term};

/// Width of the label column in the startup summary.
const LABEL_WIDTH: usize = 14;

/// Terminal reporter for the watch loop.
pub(crate) struct Output {
    term: Term,
    label: Style,
    watching: Style,
    reload: Style,
    warning: Style,
    error: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            label: Style::new().dim(),
            watching: Style::new().cyan().bold(),
            reload: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red(),
        }
    }

    /// Headline naming the watched page.
    pub(crate) fn watching(&self, page_url: &str) {
        self.write(&self.watching.apply_to(format!("Watching {page_url}")));
    }

    /// One aligned `label value` line of the startup summary.
    pub(crate) fn setting(&self, label: &str, value: &dyn Display) {
        let label = self.label.apply_to(format!("{label:<LABEL_WIDTH$}"));
        self.write(&format_args!("  {label} {value}"));
    }

    /// Announce a page reload.
    pub(crate) fn reloading(&self) {
        self.write(&self.reload.apply_to("Reloading..."));
    }

    pub(crate) fn stopped(&self) {
        self.write(&"Stopped");
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.write(&self.warning.apply_to(msg));
    }

    pub(crate) fn error(&self, msg: &str) {
        self.write(&self.error.apply_to(msg));
    }

    pub(crate) fn clear(&self) {
        if let Err(e) = self.term.clear_screen() {
            tracing::debug!(error = %e, "Failed to clear terminal");
        }
    }

    // A closed stderr must not stop the watch loop.
    fn write(&self, line: &dyn Display) {
        if let Err(e) = self.term.write_line(&line.to_string()) {
            tracing::debug!(error = %e, "Failed to write to terminal");
        }
    }
}

/// Display text of a reload command setting.
pub(crate) fn command_label(command: Option<&str>) -> &str {
    command.unwrap_or("none")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_command_label() {
        assert_eq!(command_label(Some("make html")), "make html");
        assert_eq!(command_label(None), "none");
    }
}
