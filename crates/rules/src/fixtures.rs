//! Shared gradebook fixture for unit tests.
//!
//! ```text
//! course "CS101"                      course total
//! └── root (no idnumber, no total)
//!     ├── A  (total "A")  quiz-a
//!     │   └── C  (total "C")  quiz-c
//!     └── B  (total "B")  quiz-b
//! course "MATH200"
//! └── root2
//!     └── A2 (total "A")
//! ```

use chrono::{DateTime, TimeZone, Utc};
use gradevis_core::{CategoryId, CourseId, ItemId, ItemType, MatchType, RuleAction, RuleDraft};
use gradevis_store::MemoryStore;

pub(crate) fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

#[allow(dead_code)]
pub(crate) struct Gradebook {
    pub store: MemoryStore,
    pub course: CourseId,
    pub course_total: ItemId,
    pub root: CategoryId,
    pub a: CategoryId,
    pub a_total: ItemId,
    pub b: CategoryId,
    pub b_total: ItemId,
    pub c: CategoryId,
    pub c_total: ItemId,
    pub quiz_a: ItemId,
    pub quiz_b: ItemId,
    pub quiz_c: ItemId,
    pub other_course: CourseId,
    pub a2: CategoryId,
    pub a2_total: ItemId,
}

impl Gradebook {
    pub fn new() -> Self {
        let mut store = MemoryStore::new();
        let course = store.add_course("CS101");
        let course_total = store.add_item(course, None, ItemType::CourseTotal, "");
        let root = store.add_category(course, None, "").unwrap();
        let (a, a_total) = store.add_category_with_total(course, Some(root), "A").unwrap();
        let (b, b_total) = store.add_category_with_total(course, Some(root), "B").unwrap();
        let (c, c_total) = store.add_category_with_total(course, Some(a), "C").unwrap();
        let quiz_a = store.add_item(course, Some(a), ItemType::Activity, "quiz-a");
        let quiz_b = store.add_item(course, Some(b), ItemType::Activity, "quiz-b");
        let quiz_c = store.add_item(course, Some(c), ItemType::Manual, "quiz-c");

        let other_course = store.add_course("MATH200");
        let root2 = store.add_category(other_course, None, "").unwrap();
        let (a2, a2_total) = store
            .add_category_with_total(other_course, Some(root2), "A")
            .unwrap();

        Self {
            store,
            course,
            course_total,
            root,
            a,
            a_total,
            b,
            b_total,
            c,
            c_total,
            quiz_a,
            quiz_b,
            quiz_c,
            other_course,
            a2,
            a2_total,
        }
    }

    pub fn category_hidden(&self, id: CategoryId) -> bool {
        self.store
            .all_categories()
            .find(|c| c.id == id)
            .map(|c| c.hidden)
            .unwrap()
    }

    pub fn item_hidden(&self, id: ItemId) -> bool {
        self.store
            .all_items()
            .find(|i| i.id == id)
            .map(|i| i.hidden)
            .unwrap()
    }
}

pub(crate) fn draft(course: &str, category: &str, action: RuleAction, at: i64) -> RuleDraft {
    RuleDraft {
        course_shortname: course.to_string(),
        course_shortname_matchtype: MatchType::Equals,
        category_idnumber: category.to_string(),
        category_idnumber_matchtype: MatchType::Equals,
        action,
        scheduled_at: ts(at),
    }
}
