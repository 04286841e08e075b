//! Dry-run preview of what a rule would affect.
//!
//! Uses the same matching policy as the resolver, but writes nothing and
//! never signals the cache.

use std::fmt;

use gradevis_core::{CategoryId, Course, GradevisError, Result, RuleDraft};
use gradevis_store::GradebookStore;
use serde::Serialize;

use crate::resolver::{match_categories, match_courses, CategoryTargets};

#[derive(Debug, Clone, Serialize)]
pub struct PreviewCategory {
    pub idnumber: String,
    /// `None` when the matched category-total item points at a missing category.
    pub category_id: Option<CategoryId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoursePreview {
    pub course: Course,
    pub categories: Vec<PreviewCategory>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Preview {
    pub courses: Vec<CoursePreview>,
}

impl Preview {
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.courses.is_empty() {
            return writeln!(f, "No course affected by this rule.");
        }
        for cp in &self.courses {
            writeln!(f, "{} (ID: {})", cp.course.shortname, cp.course.id)?;
            if cp.categories.is_empty() {
                writeln!(f, "  no matching category")?;
            }
            for cat in &cp.categories {
                match cat.category_id {
                    Some(id) => writeln!(f, "  {} (category ID: {})", cat.idnumber, id)?,
                    None => writeln!(f, "  {} (category missing)", cat.idnumber)?,
                }
            }
        }
        Ok(())
    }
}

/// Which courses and categories `draft` would touch right now.
pub fn preview<S: GradebookStore + ?Sized>(store: &S, draft: &RuleDraft) -> Result<Preview> {
    let courses = match match_courses(
        store,
        &draft.course_shortname,
        draft.course_shortname_matchtype,
    ) {
        Ok(courses) => courses,
        Err(GradevisError::NoCourseMatched { .. }) => return Ok(Preview::default()),
        Err(e) => return Err(e),
    };

    let mut out = Preview::default();
    for course in courses {
        let targets = match_categories(
            store,
            &course,
            &draft.category_idnumber,
            draft.category_idnumber_matchtype,
        )?;
        let categories = match targets {
            CategoryTargets::All(categories) => categories
                .into_iter()
                .map(|c| PreviewCategory {
                    idnumber: c.idnumber,
                    category_id: Some(c.id),
                })
                .collect(),
            CategoryTargets::ByIdNumber(matched) => matched
                .into_iter()
                .map(|(item, category)| PreviewCategory {
                    idnumber: item.idnumber,
                    category_id: category.map(|c| c.id),
                })
                .collect(),
        };
        out.courses.push(CoursePreview { course, categories });
    }
    Ok(out)
}
