//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while waiting on the network.
#[derive(Debug)]
pub struct ProgressReporter {
    spinner: Option<ProgressBar>,
    show_progress: bool,
}

impl ProgressReporter {
    pub fn new(show_progress: bool) -> Self {
        Self {
            spinner: None,
            show_progress,
        }
    }

    /// Create minimal progress reporter (no spinners)
    pub fn new_minimal() -> Self {
        Self::new(false)
    }

    /// Start a new step, finishing any step still running.
    pub fn start(&mut self, message: &str) {
        self.finish();
        if self.show_progress {
            self.spinner = Some(create_spinner(message));
        }
    }

    pub fn finish(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    pub fn is_active(&self) -> bool {
        self.spinner.is_some()
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
