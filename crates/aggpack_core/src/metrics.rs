//! Progress metrics for a parameter sweep.
//!
//! Provides structured logging and counters for monitoring a long sweep.
//! Counters are atomic so parallel workers can share one collector.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// How often, in frames, a run logs its current packing fraction.
pub const FRAME_LOG_INTERVAL: u32 = 25;

/// Sweep-wide statistics collector.
pub struct SweepMetrics {
    total_runs: u64,
    runs_finished: AtomicU64,
    runs_completed: AtomicU64,
    runs_skipped: AtomicU64,
    runs_failed: AtomicU64,
    frames_recorded: AtomicU64,
    pub counters: Mutex<HashMap<String, AtomicU64>>,
    start_time: Mutex<Instant>,
}

impl Default for SweepMetrics {
    fn default() -> Self {
        Self::new(0)
    }
}

impl SweepMetrics {
    /// Creates a collector for a sweep of `total_runs` combinations.
    #[must_use]
    pub fn new(total_runs: usize) -> Self {
        Self {
            total_runs: total_runs as u64,
            runs_finished: AtomicU64::new(0),
            runs_completed: AtomicU64::new(0),
            runs_skipped: AtomicU64::new(0),
            runs_failed: AtomicU64::new(0),
            frames_recorded: AtomicU64::new(0),
            counters: Mutex::new(HashMap::new()),
            start_time: Mutex::new(Instant::now()),
        }
    }

    /// Records one frame of a run.
    pub fn record_frame(&self, time: u32, packing_fraction: f64) {
        self.frames_recorded.fetch_add(1, Ordering::Relaxed);
        if time % FRAME_LOG_INTERVAL == 0 {
            tracing::debug!(time, packing_fraction, "Frame recorded");
        }
    }

    /// Records a finished combination and logs sweep progress.
    pub fn record_run(&self, name: &str, duration: Duration, succeeded: bool) {
        if succeeded {
            self.runs_completed.fetch_add(1, Ordering::Relaxed);
        }
        let finished = self.runs_finished.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(
            run = name,
            duration_s = duration.as_secs_f64(),
            "Single run finished"
        );
        tracing::info!(
            iteration = finished,
            total = self.total_runs,
            percent = self.percent_complete(),
            "Sweep progress"
        );
    }

    /// Records a combination abandoned under the skip policy.
    pub fn record_skip(&self) {
        self.runs_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a combination that ended in an error.
    pub fn record_failure(&self) {
        self.runs_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments a named counter.
    pub fn increment_counter(&self, name: &str) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Current value of a named counter, zero if never incremented.
    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .get(name)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn total_runs(&self) -> u64 {
        self.total_runs
    }

    #[must_use]
    pub fn runs_finished(&self) -> u64 {
        self.runs_finished.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn runs_completed(&self) -> u64 {
        self.runs_completed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn runs_skipped(&self) -> u64 {
        self.runs_skipped.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn runs_failed(&self) -> u64 {
        self.runs_failed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn frames_recorded(&self) -> u64 {
        self.frames_recorded.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn percent_complete(&self) -> f64 {
        if self.total_runs == 0 {
            return 100.0;
        }
        self.runs_finished() as f64 / self.total_runs as f64 * 100.0
    }

    /// Restarts the sweep clock.
    pub fn start(&self) {
        *self.start_time.lock().unwrap_or_else(|e| e.into_inner()) = Instant::now();
    }

    /// Time since the collector was created or last started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .elapsed()
    }

    /// Logs the end-of-sweep summary.
    pub fn log_summary(&self) {
        let elapsed = self.elapsed();
        tracing::info!(
            completed = self.runs_completed(),
            skipped = self.runs_skipped(),
            failed = self.runs_failed(),
            frames = self.frames_recorded(),
            total_s = elapsed.as_secs_f64(),
            total_hrs = elapsed.as_secs_f64() / 3600.0,
            "Sweep finished"
        );
    }
}

/// Initialize tracing subscriber for logging.
///
/// Honours `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}
