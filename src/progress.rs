use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::time::Duration;

use crate::api::DatasetKind;

/// Progress indicator manager
pub struct ProgressManager {
    multi: Arc<MultiProgress>,
    enabled: bool,
    verbose: bool,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(quiet: bool, verbose: bool) -> Self {
        // Spinners go to stderr; skip them when nobody is watching
        let enabled = !quiet && io::stderr().is_terminal();

        Self {
            multi: Arc::new(MultiProgress::new()),
            enabled,
            verbose,
        }
    }

    /// Create a spinner for a download
    pub fn create_fetch_spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.enabled {
            return None;
        }

        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"]);

        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(style);
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Some(pb)
    }

    /// Show a simple message (for verbose mode)
    pub fn show_message(&self, message: &str) {
        if self.verbose {
            eprintln!("🔍 {}", message);
        }
    }

    /// Check if progress is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Spinner shown while one dataset is fetched and parsed
pub struct FetchProgress {
    spinner: Option<ProgressBar>,
    manager: Arc<ProgressManager>,
}

impl FetchProgress {
    pub fn new(manager: Arc<ProgressManager>, kind: DatasetKind) -> Self {
        let message = messages::fetching(kind);
        let spinner = manager.create_fetch_spinner(&message);
        manager.show_message(&message);

        Self { spinner, manager }
    }

    /// Finish with a success message
    pub fn finish_with_message(&self, message: &str) {
        if let Some(ref pb) = self.spinner {
            pb.finish_with_message(format!("✅ {}", message));
        }
        self.manager.show_message(message);
    }

    /// Finish with a failure message
    pub fn fail_with_message(&self, message: &str) {
        if let Some(ref pb) = self.spinner {
            pb.abandon_with_message(format!("❌ {}", message));
        }
        self.manager.show_message(message);
    }
}

impl Drop for FetchProgress {
    fn drop(&mut self) {
        if let Some(ref pb) = self.spinner {
            if !pb.is_finished() {
                pb.finish_and_clear();
            }
        }
    }
}

/// Progress messages for different operations
pub mod messages {
    use crate::api::DatasetKind;

    pub fn fetching(kind: DatasetKind) -> String {
        format!("Fetching {} list...", kind.display_name())
    }

    pub fn fetch_complete(kind: DatasetKind, count: usize) -> String {
        format!("{}: {} records", kind.display_name(), count)
    }

    pub fn fetch_failed(kind: DatasetKind) -> String {
        format!("{}: refresh failed", kind.display_name())
    }
}
