//! The periodic visibility task.
//!
//! One tick:
//! 1. If the task ran before, re-apply parent hiding to every item modified
//!    after `last_run - lookback`.
//! 2. Run the schedule runner.
//! 3. Record `now` as the last run.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use gradevis_core::{Clock, Result};
use gradevis_store::{CacheInvalidator, GradebookStore, ScheduleStore};
use serde::Serialize;
use tracing::{info, warn};

use crate::reactor::{sweep_recent_items, SweepReport};
use crate::runner::{RunReport, ScheduleRunner};

/// Default lookback before the previous run for the parent-hiding sweep.
pub const DEFAULT_LOOKBACK_SECS: i64 = 3600;

#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub started_at: DateTime<Utc>,
    /// `None` on the first run, or when the sweep query failed.
    pub sweep: Option<SweepReport>,
    pub run: RunReport,
}

pub struct VisibilityTask {
    clock: Arc<dyn Clock>,
    cache: Arc<dyn CacheInvalidator>,
    runner: ScheduleRunner,
    lookback: Duration,
}

impl VisibilityTask {
    pub fn new(clock: Arc<dyn Clock>, cache: Arc<dyn CacheInvalidator>) -> Self {
        Self {
            clock,
            runner: ScheduleRunner::new(cache.clone()),
            cache,
            lookback: Duration::seconds(DEFAULT_LOOKBACK_SECS),
        }
    }

    pub fn with_lookback(mut self, lookback: Duration) -> Self {
        self.lookback = lookback;
        self
    }

    /// Run one tick against `store`.
    ///
    /// Sweep and runner failures are logged and reported; only failing to
    /// read or record the task state is returned as an error.
    pub fn tick<S>(&self, store: &mut S) -> Result<TickReport>
    where
        S: GradebookStore + ScheduleStore + ?Sized,
    {
        let now = self.clock.now();

        let sweep = match store.last_task_run()? {
            Some(last) => {
                let since = last - self.lookback;
                match sweep_recent_items(store, since, now, self.cache.as_ref()) {
                    Ok(report) => Some(report),
                    Err(e) => {
                        warn!(error = %e, "parent hiding sweep failed");
                        None
                    }
                }
            }
            None => {
                info!("first run, skipping parent hiding sweep");
                None
            }
        };

        let run = self.runner.run(store, now);
        store.record_task_run(now)?;

        Ok(TickReport {
            started_at: now,
            sweep,
            run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{draft, ts, Gradebook};
    use gradevis_core::{FixedClock, RuleAction, RuleStatus};
    use gradevis_store::CountingCache;

    fn task(clock: &FixedClock, cache: &CountingCache) -> VisibilityTask {
        VisibilityTask::new(Arc::new(clock.clone()), Arc::new(cache.clone()))
    }

    #[test]
    fn first_tick_skips_sweep_and_records_run() {
        let mut gb = Gradebook::new();
        let clock = FixedClock::new(ts(10_000));
        let report = task(&clock, &CountingCache::new()).tick(&mut gb.store).unwrap();

        assert!(report.sweep.is_none());
        assert_eq!(report.started_at, ts(10_000));
        assert_eq!(gb.store.last_task_run().unwrap(), Some(ts(10_000)));
    }

    #[test]
    fn sweep_window_reaches_back_before_last_run() {
        let mut gb = Gradebook::new();
        gb.store.record_task_run(ts(10_000)).unwrap();
        gb.store.set_category_hidden(gb.a, true).unwrap();
        // Inside the window: after 10_000 - 3600.
        gb.store.touch_item(gb.quiz_c, ts(7_000)).unwrap();
        // Outside the window.
        gb.store.touch_item(gb.quiz_a, ts(6_000)).unwrap();

        let clock = FixedClock::new(ts(10_060));
        let report = task(&clock, &CountingCache::new()).tick(&mut gb.store).unwrap();

        let sweep = report.sweep.unwrap();
        assert_eq!(sweep.scanned, 1);
        assert!(gb.item_hidden(gb.quiz_c));
        assert!(!gb.item_hidden(gb.quiz_a));
    }

    #[test]
    fn lookback_is_configurable() {
        let mut gb = Gradebook::new();
        gb.store.record_task_run(ts(10_000)).unwrap();
        gb.store.set_category_hidden(gb.a, true).unwrap();
        gb.store.touch_item(gb.quiz_a, ts(6_000)).unwrap();

        let clock = FixedClock::new(ts(10_060));
        task(&clock, &CountingCache::new())
            .with_lookback(Duration::hours(2))
            .tick(&mut gb.store)
            .unwrap();
        assert!(gb.item_hidden(gb.quiz_a));
    }

    #[test]
    fn tick_runs_due_rules() {
        let mut gb = Gradebook::new();
        let id = gb
            .store
            .insert_rule(draft("CS101", "A", RuleAction::Hide, 100), 1)
            .unwrap();
        let clock = FixedClock::new(ts(200));
        let cache = CountingCache::new();

        let report = task(&clock, &cache).tick(&mut gb.store).unwrap();
        assert_eq!(report.run.executed, vec![id]);
        assert_eq!(gb.store.require_rule(id).unwrap().status, RuleStatus::Executed);
        // One cascade plus the end-of-run signal.
        assert_eq!(cache.count(), 2);
    }

    #[test]
    fn consecutive_ticks_advance_last_run() {
        let mut gb = Gradebook::new();
        let clock = FixedClock::new(ts(1_000));
        let cache = CountingCache::new();
        let task = task(&clock, &cache);

        task.tick(&mut gb.store).unwrap();
        clock.advance(Duration::seconds(60));
        let second = task.tick(&mut gb.store).unwrap();

        assert!(second.sweep.is_some());
        assert_eq!(gb.store.last_task_run().unwrap(), Some(ts(1_060)));
    }
}
