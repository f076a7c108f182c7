// Tue Oct 13 2026 - Alex

use crate::error::ImportError;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const BAR_TEMPLATE: &str = "{spinner:.cyan} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Progress reporting plus a cooperative cancel flag. Clones share both.
#[derive(Clone, Default)]
pub struct TaskMonitor {
    cancelled: Arc<AtomicBool>,
    bar: Option<ProgressBar>,
}

impl TaskMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress_bar(mut self, enabled: bool) -> Self {
        if !enabled {
            self.bar = None;
            return self;
        }

        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("█▓▒░ "));
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(bar);
        self
    }

    /// A flag that cancels the task when set, e.g. from a signal handler.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn check_cancelled(&self) -> Result<(), ImportError> {
        if self.is_cancelled() {
            return Err(ImportError::Cancelled);
        }
        Ok(())
    }

    pub fn initialize(&self, total: u64) {
        if let Some(bar) = &self.bar {
            bar.set_length(total);
            bar.set_position(0);
        }
    }

    pub fn set_progress(&self, position: u64) {
        if let Some(bar) = &self.bar {
            bar.set_position(position);
        }
    }

    /// Starts a new phase of the task.
    pub fn set_message(&self, message: &str) {
        info!("{}", message);
        if let Some(bar) = &self.bar {
            bar.set_message(message.to_string());
        }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
