//! Terminal progress bars

use alae_cache::{Phase, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{msg:18} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}";

/// One progress bar per run phase
#[derive(Debug, Default)]
pub struct BarProgress {
    bar: Option<ProgressBar>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for BarProgress {
    fn begin(&mut self, phase: Phase, expected: u64) {
        let bar = ProgressBar::new(expected);
        bar.set_style(
            ProgressStyle::with_template(TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        bar.set_message(phase.to_string());

        if let Some(previous) = self.bar.replace(bar) {
            previous.finish_and_clear();
        }
    }

    fn advance(&mut self, steps: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(steps);
        }
    }

    fn finish(&mut self, _phase: Phase) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
    }
}
