//! Rule resolution: turn one schedule rule into concrete visibility changes.
//!
//! Matching policy:
//! - An empty course pattern matches every course.
//! - An empty (after trimming) category pattern selects every category of
//!   each matched course.
//! - Otherwise categories are found through their category-total items,
//!   whose id-number is matched against the pattern.
//!
//! After the categories are cascaded, the course total item of each matched
//! course gets the same visibility.


use chrono::{DateTime, Utc};
use gradevis_core::{
    visibility_label, Category, Course, GradeItem, GradevisError, MatchType, Predicate, Result,
    ScheduleRule,
};
use gradevis_store::{CacheInvalidator, GradebookStore};
use tracing::debug;

use crate::cascade::apply_visibility;
use crate::rule_log::{ExecutionPhase, RuleLog};

/// Outcome of a successful resolution.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub courses: usize,
    pub categories: usize,
    pub log: RuleLog,
}

impl Resolution {
    /// Text stored on the rule row.
    pub fn log_text(&self) -> String {
        self.log.render()
    }
}

/// Categories selected within one course.
#[derive(Debug, Clone)]
pub enum CategoryTargets {
    /// Empty category pattern: every category of the course.
    All(Vec<Category>),
    /// Category-total items whose id-number matched, with their category.
    /// `category` is `None` when the item points at a missing category.
    ByIdNumber(Vec<(GradeItem, Option<Category>)>),
}

/// Courses whose short name satisfies the pattern.
///
/// Fails with [`GradevisError::NoCourseMatched`] when nothing matches.
pub fn match_courses<S: GradebookStore + ?Sized>(
    store: &S,
    pattern: &str,
    match_type: MatchType,
) -> Result<Vec<Course>> {
    let courses = store.courses(&Predicate::or_any(pattern, match_type))?;
    if courses.is_empty() {
        return Err(GradevisError::NoCourseMatched {
            pattern: pattern.to_string(),
            match_type,
        });
    }
    Ok(courses)
}

/// Categories of `course` selected by the category pattern.
pub fn match_categories<S: GradebookStore + ?Sized>(
    store: &S,
    course: &Course,
    pattern: &str,
    match_type: MatchType,
) -> Result<CategoryTargets> {
    if pattern.trim().is_empty() {
        return Ok(CategoryTargets::All(store.categories_by_course(course.id)?));
    }
    let predicate = Predicate::new(pattern, match_type);
    let mut matched = Vec::new();
    for item in store.category_total_items(Some(course.id), &predicate)? {
        let category = match item.category_id {
            Some(id) => store.category(id)?,
            None => None,
        };
        matched.push((item, category));
    }
    Ok(CategoryTargets::ByIdNumber(matched))
}

/// Resolve `rule` against the store and apply its action.
///
/// A category-total item whose category is missing aborts the rule with
/// [`GradevisError::NotFound`]; changes made before that point stay.
pub fn resolve_and_apply<S: GradebookStore + ?Sized>(
    store: &mut S,
    rule: &ScheduleRule,
    now: DateTime<Utc>,
    cache: &dyn CacheInvalidator,
) -> Result<Resolution> {
    let visible = rule.action.visible();
    let courses = match_courses(
        &*store,
        &rule.course_shortname,
        rule.course_shortname_matchtype,
    )?;

    let mut resolution = Resolution {
        courses: courses.len(),
        ..Default::default()
    };

    for course in &courses {
        let targets = match_categories(
            &*store,
            course,
            &rule.category_idnumber,
            rule.category_idnumber_matchtype,
        )?;

        if matches!(&targets, CategoryTargets::ByIdNumber(m) if m.is_empty()) {
            resolution.log.warn(
                ExecutionPhase::CategoryMatch,
                format!(
                    "No category grade_item with idnumber: {} (matchtype: {}) for course: {}",
                    rule.category_idnumber,
                    rule.category_idnumber_matchtype.label(),
                    course.shortname
                ),
            );
        }

        match targets {
            CategoryTargets::All(categories) => {
                for category in &categories {
                    cascade_category(
                        store,
                        category,
                        &category.idnumber,
                        visible,
                        now,
                        cache,
                        &mut resolution,
                    )?;
                }
            }
            CategoryTargets::ByIdNumber(matched) => {
                for (item, category) in matched {
                    let category = category.ok_or_else(|| {
                        GradevisError::not_found("category", item.category_id.unwrap_or(item.id))
                    })?;
                    cascade_category(
                        store,
                        &category,
                        &item.idnumber,
                        visible,
                        now,
                        cache,
                        &mut resolution,
                    )?;
                }
            }
        }

        if let Some(total) = store.course_total_item(course.id)? {
            store.set_item_hidden(total.id, !visible)?;
            resolution.log.info(
                ExecutionPhase::CourseTotal,
                format!(
                    "Course total item (ID: {}) {}",
                    total.id,
                    visibility_label(!visible)
                ),
            );
        }
    }

    debug!(
        rule = rule.id,
        courses = resolution.courses,
        categories = resolution.categories,
        "rule resolved"
    );
    Ok(resolution)
}

fn cascade_category<S: GradebookStore + ?Sized>(
    store: &mut S,
    category: &Category,
    idnumber: &str,
    visible: bool,
    now: DateTime<Utc>,
    cache: &dyn CacheInvalidator,
    resolution: &mut Resolution,
) -> Result<()> {
    resolution.log.info(
        ExecutionPhase::CategoryMatch,
        format!(
            "Category found (ID={}) via grade_items.idnumber {}.",
            category.id, idnumber
        ),
    );
    let mut report = apply_visibility(store, category, visible, now, cache)?;
    resolution.log.append(&mut report.log);
    resolution.categories += 1;
    Ok(())
}
