//! Fixed-period tick scheduler for Spacehub.
//!
//! The hub broadcasts a world snapshot to every lobby once per tick. The
//! period is fixed for the life of the process (66 ms by default, about
//! 15 snapshots per second); this crate keeps that cadence steady, notices
//! when the hub falls behind, and measures how much of each period the
//! broadcast work used.
//!
//! # Integration
//!
//! The scheduler sits inside the hub's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         cmd = commands.recv() => { /* handle commands */ }
//!         tick = scheduler.wait_for_tick() => {
//!             broadcast_snapshots(tick.tick);
//!             scheduler.record_tick_end();
//!         }
//!     }
//! }
//! ```
//!
//! [`TickScheduler::wait_for_tick`] is cancel-safe: if another branch wins
//! the `select!`, the pending tick is simply awaited again next time.

use std::time::{Duration, Instant};

use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do when a tick fires late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickPolicy {
    /// Forget the missed ticks and schedule the next one a full period
    /// from now. Snapshots are self-correcting, so there is nothing to
    /// catch up on.
    #[default]
    Skip,
    /// Keep the original cadence: the next tick fires at its originally
    /// scheduled time, which may be immediately.
    Drop,
}

impl std::str::FromStr for TickPolicy {
    type Err = String;

    /// `"skip"` or `"drop"`, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "drop" => Ok(Self::Drop),
            other => Err(format!("unknown tick policy {other:?}, expected skip or drop")),
        }
    }
}

/// Full configuration for the tick scheduler.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Time between ticks.
    pub period: Duration,
    /// Overrun handling policy.
    pub policy: TickPolicy,
    /// Budget warning threshold (0.0–1.0). A warning is logged when the
    /// work done for a tick exceeds this fraction of the period.
    pub budget_warn_threshold: f64,
    /// Budget critical threshold (0.0–1.0).
    pub budget_critical_threshold: f64,
    /// Track average and maximum tick work time.
    pub metrics_enabled: bool,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            period: Self::DEFAULT_PERIOD,
            policy: TickPolicy::default(),
            budget_warn_threshold: 0.80,
            budget_critical_threshold: 1.0,
            metrics_enabled: true,
        }
    }
}

impl TickConfig {
    /// 66 ms, roughly 15 ticks per second.
    pub const DEFAULT_PERIOD: Duration = Duration::from_millis(66);

    /// Shortest period the scheduler will run at.
    pub const MIN_PERIOD: Duration = Duration::from_millis(1);

    /// A config with the given period and default everything else.
    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            ..Default::default()
        }
    }

    /// Clamp and fix any out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`TickScheduler::new`]:
    /// - `period` raised to at least [`Self::MIN_PERIOD`].
    /// - Thresholds clamped to `0.0..=1.0`.
    /// - `budget_warn_threshold` forced ≤ `budget_critical_threshold`.
    pub fn validated(mut self) -> Self {
        if self.period < Self::MIN_PERIOD {
            warn!(
                period_ms = self.period.as_secs_f64() * 1000.0,
                "tick period below minimum, clamping"
            );
            self.period = Self::MIN_PERIOD;
        }
        self.budget_warn_threshold = self.budget_warn_threshold.clamp(0.0, 1.0);
        self.budget_critical_threshold =
            self.budget_critical_threshold.clamp(0.0, 1.0);
        if self.budget_warn_threshold > self.budget_critical_threshold {
            self.budget_warn_threshold = self.budget_critical_threshold;
        }
        self
    }

    /// Ticks per second implied by the period.
    pub fn rate_hz(&self) -> f64 {
        1.0 / self.period.as_secs_f64()
    }
}

// ---------------------------------------------------------------------------
// Tick info
// ---------------------------------------------------------------------------

/// Information about a tick, returned by [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
    /// The fixed period.
    pub dt: Duration,
    /// `true` if this tick fired more than 10% of a period late.
    pub overrun: bool,
    /// How many whole periods were missed (0 in normal operation).
    pub ticks_skipped: u64,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Runtime metrics for the tick scheduler.
///
/// Timing values refer to the work reported through
/// [`TickScheduler::record_tick_end`], not to the sleep between ticks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickMetrics {
    pub total_ticks: u64,
    pub total_overruns: u64,
    pub total_skipped: u64,
    /// Exponential moving average of tick work time (α = 0.1).
    pub avg_tick_time: Duration,
    pub max_tick_time: Duration,
    /// Last tick's work time as a fraction of the period. >1.0 means the
    /// work alone overran.
    pub budget_utilization: f64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-period tick scheduler. One per hub.
pub struct TickScheduler {
    config: TickConfig,
    tick_count: u64,
    /// When the next tick should fire.
    next_tick: TokioInstant,
    /// Wall-clock instant the current tick's work started. Set by
    /// `wait_for_tick`, consumed by `record_tick_end`.
    tick_start: Option<Instant>,
    metrics: TickMetrics,
}

impl TickScheduler {
    /// Create a new scheduler. The first tick fires one period from now.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        debug!(
            period_ms = config.period.as_secs_f64() * 1000.0,
            rate_hz = config.rate_hz(),
            policy = ?config.policy,
            "tick scheduler created"
        );
        Self {
            next_tick: TokioInstant::now() + config.period,
            config,
            tick_count: 0,
            tick_start: None,
            metrics: TickMetrics::default(),
        }
    }

    /// Create a scheduler for a period with default settings.
    pub fn with_period(period: Duration) -> Self {
        Self::new(TickConfig::with_period(period))
    }

    /// Wait until the next tick is due.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let next = self.next_tick;
        let period = self.config.period;

        time::sleep_until(next).await;

        let now = TokioInstant::now();
        self.tick_count += 1;
        self.tick_start = Some(Instant::now());

        let late_by = now.saturating_duration_since(next);
        let overrun = late_by > period / 10;
        let mut ticks_skipped = 0u64;

        self.next_tick = match self.config.policy {
            TickPolicy::Skip => {
                if overrun {
                    ticks_skipped =
                        (late_by.as_nanos() / period.as_nanos()) as u64;
                    if ticks_skipped > 0 {
                        warn!(
                            tick = self.tick_count,
                            skipped = ticks_skipped,
                            late_ms = late_by.as_secs_f64() * 1000.0,
                            "tick overrun, skipping ahead"
                        );
                    }
                }
                now + period
            }
            TickPolicy::Drop => {
                if overrun {
                    warn!(
                        tick = self.tick_count,
                        late_ms = late_by.as_secs_f64() * 1000.0,
                        "tick overrun, keeping original schedule"
                    );
                }
                next + period
            }
        };

        if overrun {
            self.metrics.total_overruns += 1;
        }
        self.metrics.total_skipped += ticks_skipped;
        self.metrics.total_ticks += 1;

        trace!(tick = self.tick_count, overrun, "tick fired");

        TickInfo {
            tick: self.tick_count,
            dt: period,
            overrun,
            ticks_skipped,
        }
    }

    /// Record that the work for the current tick has finished.
    ///
    /// Without this call no budget warnings fire and the timing metrics
    /// stay at zero.
    pub fn record_tick_end(&mut self) {
        let Some(start) = self.tick_start.take() else {
            return;
        };
        let elapsed = start.elapsed();
        let budget = self.config.period;

        let utilization = elapsed.as_secs_f64() / budget.as_secs_f64();
        self.metrics.budget_utilization = utilization;

        if utilization >= self.config.budget_critical_threshold {
            warn!(
                tick = self.tick_count,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                budget_ms = budget.as_secs_f64() * 1000.0,
                "tick work exceeded its budget"
            );
        } else if utilization >= self.config.budget_warn_threshold {
            warn!(
                tick = self.tick_count,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                budget_ms = budget.as_secs_f64() * 1000.0,
                "tick work approaching budget"
            );
        }

        if self.config.metrics_enabled {
            if elapsed > self.metrics.max_tick_time {
                self.metrics.max_tick_time = elapsed;
            }
            let alpha = 0.1;
            let prev = self.metrics.avg_tick_time.as_secs_f64();
            let curr = elapsed.as_secs_f64();
            self.metrics.avg_tick_time =
                Duration::from_secs_f64(prev * (1.0 - alpha) + curr * alpha);
        }
    }

    /// Number of ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }

    pub fn period(&self) -> Duration {
        self.config.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_period_is_about_fifteen_hz() {
        let cfg = TickConfig::default();
        assert_eq!(cfg.period, Duration::from_millis(66));
        assert!((cfg.rate_hz() - 15.15).abs() < 0.01);
    }

    #[test]
    fn test_policy_parses_case_insensitively() {
        assert_eq!("skip".parse::<TickPolicy>(), Ok(TickPolicy::Skip));
        assert_eq!("DROP".parse::<TickPolicy>(), Ok(TickPolicy::Drop));
        assert!("catch-up".parse::<TickPolicy>().is_err());
    }

    #[test]
    fn test_validated_clamps_zero_period() {
        let cfg = TickConfig::with_period(Duration::ZERO).validated();
        assert_eq!(cfg.period, TickConfig::MIN_PERIOD);
    }

    #[test]
    fn test_validated_orders_thresholds() {
        let cfg = TickConfig {
            budget_warn_threshold: 1.5,
            budget_critical_threshold: 0.5,
            ..TickConfig::default()
        }
        .validated();
        assert_eq!(cfg.budget_critical_threshold, 0.5);
        assert_eq!(cfg.budget_warn_threshold, 0.5);
    }
}
