//! [`ScheduleRunner`]: one pass over the due schedule rules.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gradevis_core::{Result, RuleId};
use gradevis_store::{CacheInvalidator, GradebookStore, ScheduleStore};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::resolver::resolve_and_apply;
use crate::rule_log::LogLevel;

use super::sync::sync_category_flags;

/// Summary of one runner pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub executed: Vec<RuleId>,
    pub failed: Vec<RuleId>,
    /// Categories changed by the consistency sweep.
    pub categories_synced: usize,
    /// Set when the rule loop stopped early on a store failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
    /// Set when the consistency sweep failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_error: Option<String>,
}

impl RunReport {
    pub fn processed(&self) -> usize {
        self.executed.len() + self.failed.len()
    }
}

/// Executes due rules against a store.
pub struct ScheduleRunner {
    cache: Arc<dyn CacheInvalidator>,
}

impl ScheduleRunner {
    pub fn new(cache: Arc<dyn CacheInvalidator>) -> Self {
        Self { cache }
    }

    /// Process due rules, reconcile category flags, then signal the cache.
    ///
    /// Never fails: a store error in the rule loop is logged and recorded in
    /// [`RunReport::aborted`], and the sweep and cache signal still happen.
    pub fn run<S>(&self, store: &mut S, now: DateTime<Utc>) -> RunReport
    where
        S: GradebookStore + ScheduleStore + ?Sized,
    {
        let mut report = RunReport::default();

        if let Err(e) = self.process_due(store, now, &mut report) {
            error!(error = %e, "schedule run aborted");
            report.aborted = Some(e.to_string());
        }

        match sync_category_flags(store, now) {
            Ok(n) => report.categories_synced = n,
            Err(e) => {
                error!(error = %e, "category flag sweep failed");
                report.sync_error = Some(e.to_string());
            }
        }

        self.cache.structure_changed();

        if report.processed() > 0 {
            info!(
                executed = report.executed.len(),
                failed = report.failed.len(),
                synced = report.categories_synced,
                "schedule run complete"
            );
        }
        report
    }

    fn process_due<S>(&self, store: &mut S, now: DateTime<Utc>, report: &mut RunReport) -> Result<()>
    where
        S: GradebookStore + ScheduleStore + ?Sized,
    {
        let mut due = store.due_rules(now)?;
        due.sort_by_key(|r| (r.scheduled_at, r.id));

        for mut rule in due {
            debug!(rule = rule.id, scheduled_at = %rule.scheduled_at, "executing rule");
            match resolve_and_apply(store, &rule, now, self.cache.as_ref()) {
                Ok(resolution) => {
                    for line in resolution.log.lines() {
                        if line.level == LogLevel::Warning {
                            warn!(rule = rule.id, phase = ?line.phase, "{}", line.message);
                        }
                    }
                    rule.mark_executed(now, resolution.log_text());
                    store.update_rule(&rule)?;
                    report.executed.push(rule.id);
                }
                Err(e) => {
                    warn!(rule = rule.id, error = %e, "rule failed");
                    rule.mark_failed(e.to_string());
                    store.update_rule(&rule)?;
                    report.failed.push(rule.id);
                }
            }
        }
        Ok(())
    }
}
