use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use panorama_core::pipeline::{PipelineStage, ProgressReporter};

/// Drives an indicatif bar from pipeline progress callbacks.
pub struct BarReporter {
    bar: ProgressBar,
    current_total: AtomicUsize,
}

impl BarReporter {
    pub fn new() -> anyhow::Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner} {msg:20} [{bar:40}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        Ok(Self {
            bar,
            current_total: AtomicUsize::new(0),
        })
    }

    /// Stop drawing, e.g. when stdout carries machine-readable output.
    pub fn hide(&self) {
        self.bar.set_draw_target(ProgressDrawTarget::hidden());
    }

    pub fn finish(&self, message: &'static str) {
        self.bar.finish_with_message(message);
    }

    pub fn abandon(&self) {
        self.bar.abandon_with_message("Failed");
    }
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        let total = total_items.unwrap_or(1);
        self.current_total.store(total, Ordering::Relaxed);
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_message(stage.to_string());
    }

    fn advance(&self, items_done: usize) {
        self.bar.set_position(items_done as u64);
    }

    fn finish_stage(&self) {
        let total = self.current_total.load(Ordering::Relaxed);
        self.bar.set_position(total as u64);
    }
}
