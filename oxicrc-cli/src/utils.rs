//! Utility functions for the CLI.

use indicatif::{ProgressBar, ProgressStyle};
use oxicrc_core::ProgressSink;

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {percent:>3}% {bytes}/{total_bytes} {msg}")
            .expect("progress bar template is valid")
            .progress_chars("█▓▒░ "),
    );
    pb
}

/// Forwards engine progress to an indicatif bar.
pub struct IndicatifProgress {
    bar: ProgressBar,
}

impl IndicatifProgress {
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }

    /// Remove the bar before results are printed.
    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for IndicatifProgress {
    fn report(&mut self, bytes_done: u64, bytes_total: u64) {
        if self.bar.length() != Some(bytes_total) {
            self.bar.set_length(bytes_total);
        }
        self.bar.set_position(bytes_done);
    }
}

/// Human-readable file size: KB below 1 MiB, MB otherwise.
pub fn format_size(bytes: u64) -> String {
    let bytes = bytes as f64;
    if bytes < MIB {
        format!("{:.2} KB", bytes / KIB)
    } else {
        format!("{:.2} MB", bytes / MIB)
    }
}
