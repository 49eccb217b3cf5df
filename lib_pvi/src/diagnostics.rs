use std::time::Instant;

use log::{Level, log};

use crate::config::DiagnosticsConfig;

/// Per-run diagnostic settings that are handed to each pipeline stage.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    progress_interval: usize,
    timing: bool,
}

impl Diagnostics {
    pub fn new(config: &DiagnosticsConfig) -> Self {
        Self {
            progress_interval: config.progress_interval,
            timing: config.timing,
        }
    }

    /// Diagnostics that report neither progress nor timing.
    pub fn quiet() -> Self {
        Self {
            progress_interval: 0,
            timing: false,
        }
    }

    /// Returns true if progress should be reported after the given zero-based round.
    pub fn report_round(&self, round: usize) -> bool {
        self.progress_interval > 0 && round % self.progress_interval == self.progress_interval - 1
    }

    /// Start timing a stage. The duration is logged when the returned guard is dropped.
    pub fn stage(&self, name: &'static str) -> StageTimer {
        StageTimer {
            name,
            start: Instant::now(),
            level: if self.timing {
                Level::Info
            } else {
                Level::Debug
            },
        }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(&Default::default())
    }
}

pub struct StageTimer {
    name: &'static str,
    start: Instant,
    level: Level,
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        log!(
            self.level,
            "Finished {} in {:.3}s",
            self.name,
            self.start.elapsed().as_secs_f64()
        );
    }
}
