//! Download progress bars.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use vswitch::download::{ProgressHandle, ProgressSink};

const TEMPLATE: &str =
    "{msg:40!} [{bar:30.cyan/blue}] {bytes:>10}/{total_bytes:<10} {bytes_per_sec:>12}";

/// Renders one bar per concurrent download.
#[derive(Clone)]
pub struct BarSink {
    multi: MultiProgress,
    style: ProgressStyle,
}

impl BarSink {
    /// Create a sink drawing to stderr.
    pub fn new() -> Self {
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        Self {
            multi: MultiProgress::new(),
            style,
        }
    }
}

impl Default for BarSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for BarSink {
    fn start(&self, label: &str, total: u64) -> Box<dyn ProgressHandle> {
        let bar = self.multi.add(ProgressBar::new(total));
        bar.set_style(self.style.clone());
        bar.set_message(label.to_string());
        Box::new(Bar(bar))
    }
}

struct Bar(ProgressBar);

impl ProgressHandle for Bar {
    fn update(&self, downloaded: u64, total: u64) {
        if total > 0 && self.0.length() != Some(total) {
            self.0.set_length(total);
        }
        self.0.set_position(downloaded);
    }

    fn finish(&self) {
        self.0.finish_and_clear();
    }
}
