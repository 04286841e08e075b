use std::sync::Arc;

use gradevis_core::{MatchType, RuleAction, RuleStatus};
use gradevis_store::{CountingCache, GradebookStore, ScheduleStore};

use super::*;
use crate::fixtures::{draft, ts, Gradebook};

fn runner(cache: &CountingCache) -> ScheduleRunner {
    ScheduleRunner::new(Arc::new(cache.clone()))
}

#[test]
fn far_past_rule_runs_once() {
    let mut gb = Gradebook::new();
    let cache = CountingCache::new();
    let id = gb
        .store
        .insert_rule(draft("CS101", "B", RuleAction::Hide, 100), 1)
        .unwrap();

    let first = runner(&cache).run(&mut gb.store, ts(1_000_000));
    assert_eq!(first.executed, vec![id]);
    let rule = gb.store.require_rule(id).unwrap();
    assert_eq!(rule.status, RuleStatus::Executed);
    assert_eq!(rule.executed_at, Some(ts(1_000_000)));
    assert!(rule.log.contains("Category found"));
    assert!(gb.category_hidden(gb.b));

    let second = runner(&cache).run(&mut gb.store, ts(1_000_060));
    assert_eq!(second.processed(), 0);
    assert_eq!(gb.store.require_rule(id).unwrap().executed_at, Some(ts(1_000_000)));
}

#[test]
fn future_rules_wait() {
    let mut gb = Gradebook::new();
    let id = gb
        .store
        .insert_rule(draft("CS101", "B", RuleAction::Hide, 500), 1)
        .unwrap();

    let report = runner(&CountingCache::new()).run(&mut gb.store, ts(499));
    assert_eq!(report.processed(), 0);
    assert_eq!(gb.store.require_rule(id).unwrap().status, RuleStatus::Planned);

    // Scheduled exactly now counts as due.
    let report = runner(&CountingCache::new()).run(&mut gb.store, ts(500));
    assert_eq!(report.executed, vec![id]);
}

#[test]
fn unmatched_course_marks_rule_as_error() {
    let mut gb = Gradebook::new();
    let mut d = draft("BIO", "A", RuleAction::Hide, 10);
    d.course_shortname_matchtype = MatchType::StartsWith;
    let id = gb.store.insert_rule(d, 1).unwrap();

    let report = runner(&CountingCache::new()).run(&mut gb.store, ts(20));
    assert_eq!(report.failed, vec![id]);

    let rule = gb.store.require_rule(id).unwrap();
    assert_eq!(rule.status, RuleStatus::Error);
    assert_eq!(rule.executed_at, None);
    assert_eq!(
        rule.log,
        "No course found for the rule (shortname: BIO, match type: starts with)"
    );
}

#[test]
fn failing_rule_does_not_stop_the_others() {
    let mut gb = Gradebook::new();
    let bad = gb
        .store
        .insert_rule(draft("NOPE", "A", RuleAction::Hide, 10), 1)
        .unwrap();
    let good = gb
        .store
        .insert_rule(draft("CS101", "B", RuleAction::Hide, 20), 1)
        .unwrap();

    let report = runner(&CountingCache::new()).run(&mut gb.store, ts(30));
    assert_eq!(report.failed, vec![bad]);
    assert_eq!(report.executed, vec![good]);
    assert!(gb.category_hidden(gb.b));
}

#[test]
fn rules_run_in_schedule_order() {
    let mut gb = Gradebook::new();
    let show = gb
        .store
        .insert_rule(draft("CS101", "A", RuleAction::Show, 20), 1)
        .unwrap();
    let hide = gb
        .store
        .insert_rule(draft("CS101", "A", RuleAction::Hide, 10), 1)
        .unwrap();

    let report = runner(&CountingCache::new()).run(&mut gb.store, ts(30));
    assert_eq!(report.executed, vec![hide, show]);
    assert!(!gb.category_hidden(gb.a));
}

#[test]
fn sweep_aligns_categories_with_their_totals() {
    let mut gb = Gradebook::new();
    // Drift in both directions.
    gb.store.set_item_hidden(gb.b_total, true).unwrap();
    gb.store.set_category_hidden(gb.c, true).unwrap();

    let report = runner(&CountingCache::new()).run(&mut gb.store, ts(40));
    assert_eq!(report.categories_synced, 2);
    assert!(gb.category_hidden(gb.b));
    assert!(!gb.category_hidden(gb.c));
    assert_eq!(gb.store.require_category(gb.b).unwrap().modified_at, ts(40));

    let again = runner(&CountingCache::new()).run(&mut gb.store, ts(50));
    assert_eq!(again.categories_synced, 0);
}

#[test]
fn sweep_runs_after_rules_in_the_same_pass() {
    let mut gb = Gradebook::new();
    // A category whose total says hidden, but nothing else does.
    gb.store.set_item_hidden(gb.a2_total, true).unwrap();
    gb.store
        .insert_rule(draft("CS101", "B", RuleAction::Hide, 10), 1)
        .unwrap();

    let report = runner(&CountingCache::new()).run(&mut gb.store, ts(20));
    assert_eq!(report.executed.len(), 1);
    assert_eq!(report.categories_synced, 1);
    assert!(gb.category_hidden(gb.a2));
}

#[test]
fn cache_is_signalled_even_without_work() {
    let mut gb = Gradebook::new();
    let cache = CountingCache::new();
    runner(&cache).run(&mut gb.store, ts(1));
    assert_eq!(cache.count(), 1);
}

#[test]
fn executed_rule_records_missing_category_warning() {
    let mut store = gradevis_store::MemoryStore::new();
    store.add_course("EMPTY");
    let id = store
        .insert_rule(draft("EMPTY", "X", RuleAction::Hide, 1), 1)
        .unwrap();

    // No categories, no course total: only the "no category" warning.
    runner(&CountingCache::new()).run(&mut store, ts(2));
    let rule = store.require_rule(id).unwrap();
    assert_eq!(rule.status, RuleStatus::Executed);
    assert!(rule.log.starts_with("No category grade_item with idnumber: X"));
}
