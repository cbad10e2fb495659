use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Spinner shown while a catalog request is in flight. Falls back to
/// structured log lines when stdout is not a terminal.
pub struct FetchUI {
    spinner: ProgressBar,
    interactive: bool,
}

impl FetchUI {
    pub fn new() -> Self {
        let interactive = is_interactive();
        let spinner = if interactive {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
        {
            spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }

        Self { spinner, interactive }
    }

    pub fn start(&self, msg: impl Into<String>) {
        let msg = msg.into();
        if self.interactive {
            self.spinner.set_message(msg);
            self.spinner.enable_steady_tick(Duration::from_millis(80));
        } else {
            tracing::info!(operation = "fetch", message = %msg, "Fetch started");
        }
    }

    pub fn finish(&self) {
        if self.interactive {
            self.spinner.finish_and_clear();
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
