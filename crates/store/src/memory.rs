use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use gradevis_core::{
    child_path, Category, CategoryId, Course, CourseId, GradeItem, ItemId, ItemType, Predicate,
    RuleDraft, RuleId, ScheduleRule, UserId,
};

use crate::error::{StoreError, StoreResult};
use crate::traits::{GradebookStore, ScheduleStore};

/// In-memory record store implementing both store seams.
///
/// Seeding helpers (`add_*`, `put_*`) build fixtures and snapshot files;
/// records they create carry the Unix epoch as modification time.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub(crate) courses: BTreeMap<CourseId, Course>,
    pub(crate) categories: BTreeMap<CategoryId, Category>,
    pub(crate) items: BTreeMap<ItemId, GradeItem>,
    pub(crate) rules: BTreeMap<RuleId, ScheduleRule>,
    pub(crate) last_task_run: Option<DateTime<Utc>>,
}

fn next_id<V>(map: &BTreeMap<i64, V>) -> i64 {
    map.keys().next_back().map_or(1, |id| id + 1)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Seeding ─────────────────────────────────────────────────

    pub fn add_course(&mut self, shortname: &str) -> CourseId {
        let id = next_id(&self.courses);
        self.courses.insert(
            id,
            Course {
                id,
                shortname: shortname.to_string(),
            },
        );
        id
    }

    /// Add a visible category under `parent`, deriving its materialized path.
    pub fn add_category(
        &mut self,
        course: CourseId,
        parent: Option<CategoryId>,
        idnumber: &str,
    ) -> StoreResult<CategoryId> {
        let parent_path = match parent {
            Some(pid) => Some(self.require_category(pid)?.path),
            None => None,
        };
        let id = next_id(&self.categories);
        self.put_category(Category {
            id,
            course_id: course,
            parent_id: parent,
            idnumber: idnumber.to_string(),
            hidden: false,
            path: child_path(parent_path.as_deref(), id),
            modified_at: DateTime::<Utc>::UNIX_EPOCH,
        });
        Ok(id)
    }

    /// Add a category together with its category-total item (same id-number).
    pub fn add_category_with_total(
        &mut self,
        course: CourseId,
        parent: Option<CategoryId>,
        idnumber: &str,
    ) -> StoreResult<(CategoryId, ItemId)> {
        let category = self.add_category(course, parent, idnumber)?;
        let item = self.add_item(course, Some(category), ItemType::CategoryTotal, idnumber);
        Ok((category, item))
    }

    pub fn add_item(
        &mut self,
        course: CourseId,
        category: Option<CategoryId>,
        item_type: ItemType,
        idnumber: &str,
    ) -> ItemId {
        let id = next_id(&self.items);
        self.put_item(GradeItem {
            id,
            course_id: course,
            category_id: category,
            item_type,
            idnumber: idnumber.to_string(),
            hidden: false,
            modified_at: DateTime::<Utc>::UNIX_EPOCH,
        });
        id
    }

    /// Insert or replace a category verbatim, without any consistency checks.
    pub fn put_category(&mut self, category: Category) {
        self.categories.insert(category.id, category);
    }

    /// Insert or replace an item verbatim.
    pub fn put_item(&mut self, item: GradeItem) {
        self.items.insert(item.id, item);
    }

    pub fn remove_category(&mut self, id: CategoryId) -> Option<Category> {
        self.categories.remove(&id)
    }

    // ── Inspection ──────────────────────────────────────────────

    pub fn all_courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }

    pub fn all_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    pub fn all_items(&self) -> impl Iterator<Item = &GradeItem> {
        self.items.values()
    }

    fn category_mut(&mut self, id: CategoryId) -> StoreResult<&mut Category> {
        self.categories
            .get_mut(&id)
            .ok_or(StoreError::NotFound { kind: "category", id })
    }

    fn item_mut(&mut self, id: ItemId) -> StoreResult<&mut GradeItem> {
        self.items
            .get_mut(&id)
            .ok_or(StoreError::NotFound { kind: "grade item", id })
    }
}

impl GradebookStore for MemoryStore {
    fn category(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        Ok(self.categories.get(&id).cloned())
    }

    fn categories_by_parent(&self, parent: CategoryId) -> StoreResult<Vec<Category>> {
        Ok(self
            .categories
            .values()
            .filter(|c| c.parent_id == Some(parent))
            .cloned()
            .collect())
    }

    fn categories_by_course(&self, course: CourseId) -> StoreResult<Vec<Category>> {
        Ok(self
            .categories
            .values()
            .filter(|c| c.course_id == course)
            .cloned()
            .collect())
    }

    fn item(&self, id: ItemId) -> StoreResult<Option<GradeItem>> {
        Ok(self.items.get(&id).cloned())
    }

    fn category_total_item(&self, category: CategoryId) -> StoreResult<Option<GradeItem>> {
        Ok(self
            .items
            .values()
            .find(|i| i.is_category_total() && i.category_id == Some(category))
            .cloned())
    }

    fn course_total_item(&self, course: CourseId) -> StoreResult<Option<GradeItem>> {
        Ok(self
            .items
            .values()
            .find(|i| i.item_type == ItemType::CourseTotal && i.course_id == course)
            .cloned())
    }

    fn items_by_category(&self, category: CategoryId) -> StoreResult<Vec<GradeItem>> {
        Ok(self
            .items
            .values()
            .filter(|i| i.category_id == Some(category))
            .cloned()
            .collect())
    }

    fn category_total_items(
        &self,
        course: Option<CourseId>,
        idnumber: &Predicate,
    ) -> StoreResult<Vec<GradeItem>> {
        Ok(self
            .items
            .values()
            .filter(|i| i.is_category_total())
            .filter(|i| course.map_or(true, |c| i.course_id == c))
            .filter(|i| idnumber.test(&i.idnumber))
            .cloned()
            .collect())
    }

    fn items_modified_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<GradeItem>> {
        Ok(self
            .items
            .values()
            .filter(|i| i.modified_at > since)
            .cloned()
            .collect())
    }

    fn courses(&self, shortname: &Predicate) -> StoreResult<Vec<Course>> {
        Ok(self
            .courses
            .values()
            .filter(|c| shortname.test(&c.shortname))
            .cloned()
            .collect())
    }

    fn set_category_hidden(&mut self, id: CategoryId, hidden: bool) -> StoreResult<()> {
        self.category_mut(id)?.hidden = hidden;
        Ok(())
    }

    fn touch_category(&mut self, id: CategoryId, at: DateTime<Utc>) -> StoreResult<()> {
        self.category_mut(id)?.modified_at = at;
        Ok(())
    }

    fn set_item_hidden(&mut self, id: ItemId, hidden: bool) -> StoreResult<()> {
        self.item_mut(id)?.hidden = hidden;
        Ok(())
    }

    fn touch_item(&mut self, id: ItemId, at: DateTime<Utc>) -> StoreResult<()> {
        self.item_mut(id)?.modified_at = at;
        Ok(())
    }
}

impl ScheduleStore for MemoryStore {
    fn rules(&self) -> StoreResult<Vec<ScheduleRule>> {
        Ok(self.rules.values().cloned().collect())
    }

    fn rule(&self, id: RuleId) -> StoreResult<Option<ScheduleRule>> {
        Ok(self.rules.get(&id).cloned())
    }

    fn insert_rule(&mut self, draft: RuleDraft, adminid: UserId) -> StoreResult<RuleId> {
        let id = next_id(&self.rules);
        self.rules
            .insert(id, ScheduleRule::from_draft(id, draft, adminid));
        Ok(id)
    }

    fn update_rule(&mut self, rule: &ScheduleRule) -> StoreResult<()> {
        match self.rules.get_mut(&rule.id) {
            Some(slot) => {
                *slot = rule.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound {
                kind: "rule",
                id: rule.id,
            }),
        }
    }

    fn delete_rule(&mut self, id: RuleId) -> StoreResult<()> {
        self.rules
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { kind: "rule", id })
    }

    fn last_task_run(&self) -> StoreResult<Option<DateTime<Utc>>> {
        Ok(self.last_task_run)
    }

    fn record_task_run(&mut self, at: DateTime<Utc>) -> StoreResult<()> {
        self.last_task_run = Some(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use gradevis_core::{MatchType, RuleAction, RuleStatus};

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn seeded_categories_get_materialized_paths() {
        let mut store = MemoryStore::new();
        let course = store.add_course("CS101");
        let root = store.add_category(course, None, "").unwrap();
        let mid = store.add_category(course, Some(root), "MID").unwrap();
        let leaf = store.add_category(course, Some(mid), "LEAF").unwrap();

        let leaf = store.require_category(leaf).unwrap();
        assert_eq!(leaf.path, format!("/{}/{}/{}/", root, mid, leaf.id));
        assert_eq!(leaf.ancestor_ids(), vec![mid, root]);
    }

    #[test]
    fn unknown_parent_is_not_found() {
        let mut store = MemoryStore::new();
        let course = store.add_course("CS101");
        let err = store.add_category(course, Some(42), "X").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "category", id: 42 }));
    }

    #[test]
    fn category_total_queries_are_scoped() {
        let mut store = MemoryStore::new();
        let a = store.add_course("CS101");
        let b = store.add_course("CS102");
        let (_, a_total) = store.add_category_with_total(a, None, "EXAM-1").unwrap();
        store.add_category_with_total(b, None, "EXAM-2").unwrap();
        store.add_item(a, None, ItemType::CourseTotal, "");

        let prefix = Predicate::new("EXAM", MatchType::StartsWith);
        assert_eq!(store.category_total_items(None, &prefix).unwrap().len(), 2);
        let scoped = store.category_total_items(Some(a), &prefix).unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].id, a_total);

        assert!(store.course_total_item(a).unwrap().is_some());
        assert!(store.course_total_item(b).unwrap().is_none());
    }

    #[test]
    fn modified_since_is_strict() {
        let mut store = MemoryStore::new();
        let course = store.add_course("CS101");
        let item = store.add_item(course, None, ItemType::Manual, "");
        store.touch_item(item, ts(100)).unwrap();

        assert!(store.items_modified_since(ts(100)).unwrap().is_empty());
        assert_eq!(store.items_modified_since(ts(99)).unwrap().len(), 1);
    }

    #[test]
    fn writes_to_missing_rows_fail() {
        let mut store = MemoryStore::new();
        assert!(store.set_category_hidden(1, true).is_err());
        assert!(store.set_item_hidden(1, true).is_err());
        assert!(store.delete_rule(1).is_err());
    }

    #[test]
    fn rule_lifecycle() {
        let mut store = MemoryStore::new();
        let draft = RuleDraft {
            course_shortname: "CS".into(),
            course_shortname_matchtype: MatchType::StartsWith,
            category_idnumber: String::new(),
            category_idnumber_matchtype: MatchType::Equals,
            action: RuleAction::Hide,
            scheduled_at: ts(1_000),
        };
        let id = store.insert_rule(draft, 5).unwrap();
        let mut rule = store.require_rule(id).unwrap();
        assert_eq!(rule.status, RuleStatus::Planned);
        assert_eq!(rule.adminid, 5);

        assert_eq!(store.due_rules(ts(999)).unwrap().len(), 0);
        assert_eq!(store.due_rules(ts(1_000)).unwrap().len(), 1);

        rule.mark_executed(ts(1_000), "OK");
        store.update_rule(&rule).unwrap();
        assert!(store.due_rules(ts(5_000)).unwrap().is_empty());

        store.delete_rule(id).unwrap();
        assert!(store.rule(id).unwrap().is_none());
    }
}
