//! Background Loops
//!
//! Periodic collection and analysis as independent tokio tasks.
//!
//! ```text
//!   t=0        10m        20m        30m        40m
//!   │ collect  │ collect  │ collect  │ collect  │ ...
//!   ·····5m│ analyze ···············30m···│ analyze ...
//! ```
//!
//! Each loop finishes its iteration before awaiting the next tick; missed
//! ticks are delayed rather than fired in a burst. Both loops exit when the
//! shutdown channel flips to `true` or its sender is dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::collector::Collector;
use crate::error::{AdvisorError, Result};
use crate::trend::{AnalysisReport, TrendAnalyzer};

/// Loop timing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub collect_interval: Duration,
    pub analysis_interval: Duration,
    pub analysis_initial_delay: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            collect_interval: Duration::from_secs(10 * 60),
            analysis_interval: Duration::from_secs(30 * 60),
            analysis_initial_delay: Duration::from_secs(5 * 60),
        }
    }
}

impl ScheduleConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secs = |key: &str, fallback: Duration| {
            std::env::var(key)
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|&s| s > 0)
                .map_or(fallback, Duration::from_secs)
        };

        Self {
            collect_interval: secs("COLLECT_INTERVAL_SECS", defaults.collect_interval),
            analysis_interval: secs("ANALYSIS_INTERVAL_SECS", defaults.analysis_interval),
            analysis_initial_delay: secs("ANALYSIS_INITIAL_DELAY_SECS", defaults.analysis_initial_delay),
        }
    }
}

/// Resolves once shutdown is requested
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

/// Run a sweep on the blocking pool. The sweep is synchronous CPU-bound work
/// over stores guarded by std locks.
pub async fn run_analysis(analyzer: Arc<TrendAnalyzer>) -> Result<AnalysisReport> {
    tokio::task::spawn_blocking(move || analyzer.analyze_all())
        .await
        .map_err(|e| AdvisorError::Task(e.to_string()))?
}

/// Collect immediately, then every `every`
pub fn spawn_collection_loop(
    collector: Arc<Collector>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                () = shutdown_requested(&mut shutdown) => break,
            }

            if let Err(e) = collector.collect_once().await {
                tracing::warn!(error = %e, retryable = e.is_retryable(), "price collection failed");
            }
        }

        tracing::info!("collection loop stopped");
    })
}

/// Wait `initial_delay`, then analyze every `every`
pub fn spawn_analysis_loop(
    analyzer: Arc<TrendAnalyzer>,
    initial_delay: Duration,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            () = tokio::time::sleep(initial_delay) => {}
            () = shutdown_requested(&mut shutdown) => {
                tracing::info!("analysis loop stopped before first run");
                return;
            }
        }

        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                () = shutdown_requested(&mut shutdown) => break,
            }

            if let Err(e) = run_analysis(analyzer.clone()).await {
                tracing::error!(error = %e, "trend analysis failed");
            }
        }

        tracing::info!("analysis loop stopped");
    })
}
