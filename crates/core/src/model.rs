use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type CourseId = i64;
pub type CategoryId = i64;
pub type ItemId = i64;
pub type UserId = i64;

/// Separator used in a category's materialized path (`/1/4/9/`).
pub const PATH_DELIMITER: char = '/';

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub shortname: String,
}

/// A grouping node in a course's grade tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub course_id: CourseId,
    /// `None` for the course's top-level category.
    pub parent_id: Option<CategoryId>,
    /// Free-text label; not unique.
    #[serde(default)]
    pub idnumber: String,
    pub hidden: bool,
    /// Ancestor ids root-to-self, e.g. `/1/4/9/`.
    pub path: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub modified_at: DateTime<Utc>,
}

impl Category {
    /// Ids encoded in the materialized path, root first, self last.
    ///
    /// Segments that are not integers are skipped.
    pub fn path_ids(&self) -> Vec<CategoryId> {
        parse_path(&self.path)
    }

    /// Ids from the nearest ancestor up to the root, excluding self.
    pub fn ancestor_ids(&self) -> Vec<CategoryId> {
        self.path_ids()
            .into_iter()
            .rev()
            .filter(|id| *id != self.id)
            .collect()
    }
}

/// Split a materialized path into its ids.
pub fn parse_path(path: &str) -> Vec<CategoryId> {
    path.split(PATH_DELIMITER)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.trim().parse().ok())
        .collect()
}

/// Build the materialized path of a child given its parent's path.
pub fn child_path(parent_path: Option<&str>, id: CategoryId) -> String {
    match parent_path {
        Some(p) => format!("{}/{}/", p.trim_end_matches(PATH_DELIMITER), id),
        None => format!("/{}/", id),
    }
}

/// Grade item type, stored with the gradebook's own keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemType {
    /// Aggregate of a category (`category`).
    CategoryTotal,
    /// Aggregate of a whole course (`course`).
    CourseTotal,
    /// Linked to an activity module (`mod`).
    Activity,
    Manual,
    Other(String),
}

impl ItemType {
    pub fn as_str(&self) -> &str {
        match self {
            ItemType::CategoryTotal => "category",
            ItemType::CourseTotal => "course",
            ItemType::Activity => "mod",
            ItemType::Manual => "manual",
            ItemType::Other(s) => s.as_str(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, ItemType::Activity | ItemType::Manual)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ItemType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "category" => ItemType::CategoryTotal,
            "course" => ItemType::CourseTotal,
            "mod" => ItemType::Activity,
            "manual" => ItemType::Manual,
            _ => ItemType::Other(s),
        }
    }
}

impl From<ItemType> for String {
    fn from(t: ItemType) -> Self {
        t.as_str().to_string()
    }
}

/// A gradable element or an aggregate total.
///
/// For a category-total item `category_id` is the category it totals; for a
/// course-total item it is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeItem {
    pub id: ItemId,
    pub course_id: CourseId,
    pub category_id: Option<CategoryId>,
    pub item_type: ItemType,
    #[serde(default)]
    pub idnumber: String,
    pub hidden: bool,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub modified_at: DateTime<Utc>,
}

impl GradeItem {
    pub fn is_category_total(&self) -> bool {
        self.item_type == ItemType::CategoryTotal
    }
}

/// Visibility word used in logs.
pub fn visibility_label(hidden: bool) -> &'static str {
    if hidden {
        "hidden"
    } else {
        "shown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: CategoryId, path: &str) -> Category {
        Category {
            id,
            course_id: 1,
            parent_id: None,
            idnumber: String::new(),
            hidden: false,
            path: path.to_string(),
            modified_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[test]
    fn ancestors_are_nearest_first_without_self() {
        let c = category(9, "/1/4/9/");
        assert_eq!(c.path_ids(), vec![1, 4, 9]);
        assert_eq!(c.ancestor_ids(), vec![4, 1]);
    }

    #[test]
    fn malformed_path_segments_are_skipped() {
        let c = category(9, "1//x/9");
        assert_eq!(c.path_ids(), vec![1, 9]);
        assert!(category(3, "").ancestor_ids().is_empty());
    }

    #[test]
    fn child_path_extends_parent() {
        assert_eq!(child_path(None, 1), "/1/");
        assert_eq!(child_path(Some("/1/"), 4), "/1/4/");
        assert_eq!(child_path(Some("/1/4"), 9), "/1/4/9/");
    }

    #[test]
    fn item_type_keys() {
        assert_eq!(ItemType::from("mod".to_string()), ItemType::Activity);
        assert_eq!(String::from(ItemType::CategoryTotal), "category");
        assert_eq!(ItemType::from("outcome".to_string()), ItemType::Other("outcome".into()));
        assert!(ItemType::Manual.is_leaf());
        assert!(!ItemType::CourseTotal.is_leaf());
    }
}
