// ⏱️ Runner - fixed-interval scheduling of reconciliation cycles
//
// One cycle fires immediately at startup, then the schedule ticks every
// `interval` from the start instant (monotonic clock). A cycle that
// overruns its slot neither stacks nor double-fires: missed trigger points
// are skipped and the next future one is used. Cycles are strictly
// sequential - a single-flight guard refuses a trigger while one is in
// flight.
//
// Nothing in here is process-fatal. A fetch that fails after retries
// skips reconciliation for that cycle and the loop waits for the next
// scheduled trigger.

use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use log::{error, info, warn};
use rusqlite::Connection;

use crate::config::Config;
use crate::fetch::{self, RetryPolicy};
use crate::parser;
use crate::reconcile::ReconcileEngine;
use crate::report::CycleReport;

pub struct Runner {
    config: Config,
    engine: ReconcileEngine,
    policy: RetryPolicy,
    in_flight: bool,
}

impl Runner {
    pub fn new(config: Config) -> Self {
        let policy = RetryPolicy::new(config.fetch_attempts, config.fetch_delay);

        Runner {
            config,
            engine: ReconcileEngine::new(),
            policy,
            in_flight: false,
        }
    }

    /// Run the service loop forever: one cycle now, then on the schedule.
    pub fn run_forever(&mut self, conn: &mut Connection) -> ! {
        info!(
            "mirror service started: {} every {}s",
            self.config.source_url,
            self.config.interval.as_secs()
        );

        let interval = self.config.interval;
        let mut trigger = Instant::now();

        loop {
            self.run_cycle(conn);

            trigger = next_trigger_after(trigger, Instant::now(), interval);
            let wait = trigger.saturating_duration_since(Instant::now());
            thread::sleep(wait);
        }
    }

    /// Run a single reconciliation cycle, honoring the single-flight guard.
    ///
    /// Returns `None` when the trigger was refused or the cycle was skipped
    /// on fetch failure.
    pub fn run_cycle(&mut self, conn: &mut Connection) -> Option<CycleReport> {
        if !self.try_begin() {
            warn!("reconciliation cycle already in flight; trigger ignored");
            return None;
        }

        let report = self.execute_cycle(conn);
        self.finish();

        report
    }

    fn execute_cycle(&self, conn: &mut Connection) -> Option<CycleReport> {
        info!("starting reconciliation cycle");

        let html = match fetch::fetch_page(&self.config.source_url, &self.policy) {
            Ok(body) => body,
            Err(err) => {
                // No partial batch: a failed fetch skips reconciliation
                // entirely until the next scheduled trigger
                error!("fetch failed, skipping this cycle: {}", err);
                return None;
            }
        };

        let observed_at = Utc::now();
        let batch = parser::extract_listings(&html, observed_at);
        info!("extracted {} listings from source page", batch.len());

        let report = self.engine.reconcile_batch(conn, &batch);
        report.emit();

        Some(report)
    }

    /* ---------------- single-flight guard ---------------- */

    fn try_begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    fn finish(&mut self) {
        self.in_flight = false;
    }
}

/// Next trigger strictly after `now`, stepping from the previous trigger in
/// whole intervals so the cadence stays anchored to the original schedule.
fn next_trigger_after(previous: Instant, now: Instant, interval: Duration) -> Instant {
    if interval.is_zero() {
        return now;
    }

    let mut next = previous + interval;
    while next <= now {
        next += interval;
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_trigger_is_one_interval_out() {
        let start = Instant::now();
        let interval = Duration::from_secs(60);

        // Fast cycle: now is well inside the first interval
        let next = next_trigger_after(start, start + Duration::from_secs(5), interval);
        assert_eq!(next, start + interval);
    }

    #[test]
    fn test_slow_cycle_skips_missed_triggers_without_stacking() {
        let start = Instant::now();
        let interval = Duration::from_secs(60);

        // Cycle ran 2.5 intervals long: the two missed slots are dropped
        // and the next trigger is the third slot, still on the grid
        let now = start + Duration::from_secs(150);
        let next = next_trigger_after(start, now, interval);
        assert_eq!(next, start + Duration::from_secs(180));
    }

    #[test]
    fn test_zero_interval_does_not_spin() {
        let now = Instant::now();
        assert_eq!(next_trigger_after(now, now, Duration::ZERO), now);
    }

    #[test]
    fn test_single_flight_guard_refuses_reentry() {
        let mut runner = Runner::new(Config::default());

        assert!(runner.try_begin());
        assert!(!runner.try_begin());

        runner.finish();
        assert!(runner.try_begin());
    }
}
