//! JSON snapshot persistence for [`MemoryStore`].
//!
//! One file holds every table:
//! ```text
//! {
//!   "courses":    [ { "id": 1, "shortname": "CS101" } ],
//!   "categories": [ { "id": 1, "course_id": 1, "parent_id": null, "path": "/1/", ... } ],
//!   "items":      [ { "id": 1, "item_type": "category", "category_id": 1, ... } ],
//!   "rules":      [ { "id": 1, "status": 0, "scheduled_at": 1700000000, ... } ],
//!   "last_task_run": 1700000000
//! }
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use gradevis_core::{Category, Course, GradeItem, ScheduleRule};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::StoreResult;
use crate::memory::MemoryStore;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub items: Vec<GradeItem>,
    #[serde(default)]
    pub rules: Vec<ScheduleRule>,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub last_task_run: Option<DateTime<Utc>>,
}

impl From<Snapshot> for MemoryStore {
    fn from(s: Snapshot) -> Self {
        let mut store = MemoryStore::new();
        store.courses = s.courses.into_iter().map(|c| (c.id, c)).collect();
        store.categories = s.categories.into_iter().map(|c| (c.id, c)).collect();
        store.items = s.items.into_iter().map(|i| (i.id, i)).collect();
        store.rules = s.rules.into_iter().map(|r| (r.id, r)).collect();
        store.last_task_run = s.last_task_run;
        store
    }
}

impl MemoryStore {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            courses: self.courses.values().cloned().collect(),
            categories: self.categories.values().cloned().collect(),
            items: self.items.values().cloned().collect(),
            rules: self.rules.values().cloned().collect(),
            last_task_run: self.last_task_run,
        }
    }

    /// Load a store from a snapshot file. A missing file yields an empty store.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No snapshot at {}, starting empty", path.display());
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&json)?;
        Ok(snapshot.into())
    }

    /// Write the whole store to `path`, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
