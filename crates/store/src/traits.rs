//! Store seams consumed by the engine.
//!
//! Reads return unordered collections; callers must not rely on row order.
//! "No rows" is an empty collection or `None`, never an error. Only the
//! `require_*` lookups and writes to missing rows fail with
//! [`StoreError::NotFound`]. Every write touches a single row; there is no
//! multi-row transaction.

use chrono::{DateTime, Utc};
use gradevis_core::{
    Category, CategoryId, Course, CourseId, GradeItem, ItemId, Predicate, RuleDraft, RuleId,
    ScheduleRule, UserId,
};

use crate::error::{StoreError, StoreResult};

/// Access façade over externally owned gradebook records.
pub trait GradebookStore {
    fn category(&self, id: CategoryId) -> StoreResult<Option<Category>>;

    /// Direct subcategories of `parent`.
    fn categories_by_parent(&self, parent: CategoryId) -> StoreResult<Vec<Category>>;

    fn categories_by_course(&self, course: CourseId) -> StoreResult<Vec<Category>>;

    fn item(&self, id: ItemId) -> StoreResult<Option<GradeItem>>;

    /// The category-total item of `category`, if it has been materialized.
    fn category_total_item(&self, category: CategoryId) -> StoreResult<Option<GradeItem>>;

    fn course_total_item(&self, course: CourseId) -> StoreResult<Option<GradeItem>>;

    /// Items owned by `category`, of every type.
    fn items_by_category(&self, category: CategoryId) -> StoreResult<Vec<GradeItem>>;

    /// Category-total items whose id-number satisfies `idnumber`, optionally
    /// scoped to one course.
    fn category_total_items(
        &self,
        course: Option<CourseId>,
        idnumber: &Predicate,
    ) -> StoreResult<Vec<GradeItem>>;

    /// Items modified strictly after `since`.
    fn items_modified_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<GradeItem>>;

    /// Courses whose short name satisfies `shortname`.
    fn courses(&self, shortname: &Predicate) -> StoreResult<Vec<Course>>;

    fn set_category_hidden(&mut self, id: CategoryId, hidden: bool) -> StoreResult<()>;

    fn touch_category(&mut self, id: CategoryId, at: DateTime<Utc>) -> StoreResult<()>;

    fn set_item_hidden(&mut self, id: ItemId, hidden: bool) -> StoreResult<()>;

    fn touch_item(&mut self, id: ItemId, at: DateTime<Utc>) -> StoreResult<()>;

    /// MUST-exist category lookup.
    fn require_category(&self, id: CategoryId) -> StoreResult<Category> {
        self.category(id)?
            .ok_or(StoreError::NotFound { kind: "category", id })
    }
}

/// Persisted schedule rules plus the periodic task's run bookkeeping.
pub trait ScheduleStore {
    fn rules(&self) -> StoreResult<Vec<ScheduleRule>>;

    fn rule(&self, id: RuleId) -> StoreResult<Option<ScheduleRule>>;

    /// Store a new planned rule and return its id.
    fn insert_rule(&mut self, draft: RuleDraft, adminid: UserId) -> StoreResult<RuleId>;

    /// Replace the stored row with `rule`; fails if the id is unknown.
    fn update_rule(&mut self, rule: &ScheduleRule) -> StoreResult<()>;

    fn delete_rule(&mut self, id: RuleId) -> StoreResult<()>;

    /// Time of the previous successful periodic run, if any.
    fn last_task_run(&self) -> StoreResult<Option<DateTime<Utc>>>;

    fn record_task_run(&mut self, at: DateTime<Utc>) -> StoreResult<()>;

    /// Planned rules scheduled at or before `now`, however old.
    fn due_rules(&self, now: DateTime<Utc>) -> StoreResult<Vec<ScheduleRule>> {
        Ok(self
            .rules()?
            .into_iter()
            .filter(|r| r.is_due(now))
            .collect())
    }

    /// MUST-exist rule lookup.
    fn require_rule(&self, id: RuleId) -> StoreResult<ScheduleRule> {
        self.rule(id)?.ok_or(StoreError::NotFound { kind: "rule", id })
    }
}
