//! Progress bar for displaying analysis status

use kdam::{Animation, Bar, BarExt};

use crate::ProgressSnapshot;
use crate::engine::tools::format_eta;

/// Configuration for creating a progress bar
pub struct ProgressBarConfig {
    pub total: usize,
    pub desc: &'static str,
    pub animation: Animation,
}

impl ProgressBarConfig {
    /// Create a new progress bar configuration
    pub fn new(total: usize, desc: &'static str, animation: Animation) -> Self {
        Self {
            total,
            desc,
            animation,
        }
    }
}

/// Create a progress bar with the given configuration
pub fn create_progress_bar(config: ProgressBarConfig) -> Bar {
    kdam::tqdm!(
        total = config.total,
        desc = config.desc,
        animation = config.animation,
        unit = " files"
    )
}

/// Terminal observer for [`ProgressSnapshot`]s. Shows our mean-duration ETA as the postfix.
pub struct ProgressDisplay {
    bar: Bar,
}

impl ProgressDisplay {
    pub fn new(total: usize) -> Self {
        Self {
            bar: create_progress_bar(ProgressBarConfig::new(
                total,
                "Analyzing",
                Animation::Classic,
            )),
        }
    }

    pub fn observe(&mut self, snapshot: &ProgressSnapshot) {
        self.bar
            .set_postfix(format!("ETA {}", format_eta(snapshot.eta_millis)));
        let _ = self.bar.update_to(snapshot.processed);
    }

    /// Leave the bar in place and move to the next line.
    pub fn finish(mut self) {
        let _ = self.bar.refresh();
        eprintln!();
    }
}
