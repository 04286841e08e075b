//! Snapshot persistence against a real temporary directory.

use chrono::{TimeZone, Utc};
use gradevis_core::{ItemType, MatchType, RuleAction, RuleDraft, RuleStatus};
use gradevis_store::{GradebookStore, MemoryStore, ScheduleStore};

#[test]
fn missing_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::load(dir.path().join("absent.json")).unwrap();
    assert_eq!(store.all_courses().count(), 0);
    assert!(store.last_task_run().unwrap().is_none());
}

#[test]
fn save_then_load_keeps_tree_rules_and_task_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/gradebook.json");

    let mut store = MemoryStore::new();
    let course = store.add_course("CS101");
    let (root, _) = store.add_category_with_total(course, None, "ROOT").unwrap();
    let (child, child_total) = store.add_category_with_total(course, Some(root), "MID").unwrap();
    store.add_item(course, Some(child), ItemType::Activity, "quiz-1");
    store.set_category_hidden(child, true).unwrap();
    store.set_item_hidden(child_total, true).unwrap();
    let rule = store
        .insert_rule(
            RuleDraft {
                course_shortname: "CS".into(),
                course_shortname_matchtype: MatchType::StartsWith,
                category_idnumber: "MID".into(),
                category_idnumber_matchtype: MatchType::Equals,
                action: RuleAction::Show,
                scheduled_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            },
            3,
        )
        .unwrap();
    store
        .record_task_run(Utc.timestamp_opt(1_700_000_500, 0).unwrap())
        .unwrap();

    store.save(&path).unwrap();
    let loaded = MemoryStore::load(&path).unwrap();

    let child = loaded.require_category(child).unwrap();
    assert!(child.hidden);
    assert_eq!(child.path, format!("/{}/{}/", root, child.id));
    assert_eq!(loaded.items_by_category(child.id).unwrap().len(), 2);

    let rule = loaded.require_rule(rule).unwrap();
    assert_eq!(rule.status, RuleStatus::Planned);
    assert_eq!(rule.action, RuleAction::Show);
    assert_eq!(rule.adminid, 3);
    assert_eq!(
        loaded.last_task_run().unwrap().map(|t| t.timestamp()),
        Some(1_700_000_500)
    );

    // New ids continue after the loaded ones.
    let mut loaded = loaded;
    let next = loaded.add_course("CS102");
    assert_eq!(next, course + 1);
}
