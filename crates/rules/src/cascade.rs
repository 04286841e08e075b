//! Recursive visibility cascade over the grade category tree.
//!
//! Starting from one category, the cascade sets the hidden flag of the
//! category, its category-total item, every other item it owns, and then
//! descends into each subcategory. Traversal is depth-first pre-order and
//! each category is visited at most once, so a cyclic parent graph in the
//! store terminates instead of recursing forever.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use gradevis_core::{visibility_label, Category, CategoryId, Result};
use gradevis_store::{CacheInvalidator, GradebookStore};
use tracing::{debug, warn};

use crate::rule_log::{ExecutionPhase, RuleLog};

/// Outcome of one cascade call.
#[derive(Debug, Clone, Default)]
pub struct CascadeReport {
    /// Categories visited (and written).
    pub categories: usize,
    /// Items written, category totals included.
    pub items: usize,
    /// Categories and items whose hidden flag actually changed.
    pub flipped: usize,
    pub log: RuleLog,
}

/// Apply `visible` to `category` and everything below it.
///
/// Category timestamps are touched with `now`; item timestamps are left
/// alone. The cache is signalled once, after the whole subtree is done.
pub fn apply_visibility<S: GradebookStore + ?Sized>(
    store: &mut S,
    category: &Category,
    visible: bool,
    now: DateTime<Utc>,
    cache: &dyn CacheInvalidator,
) -> Result<CascadeReport> {
    let mut report = CascadeReport::default();
    let mut visited = HashSet::new();
    visit(store, category, !visible, now, 0, &mut visited, &mut report)?;
    debug!(
        category = category.id,
        visible,
        categories = report.categories,
        items = report.items,
        flipped = report.flipped,
        "cascade complete"
    );
    cache.structure_changed();
    Ok(report)
}

fn visit<S: GradebookStore + ?Sized>(
    store: &mut S,
    category: &Category,
    hidden: bool,
    now: DateTime<Utc>,
    depth: usize,
    visited: &mut HashSet<CategoryId>,
    report: &mut CascadeReport,
) -> Result<()> {
    if !visited.insert(category.id) {
        warn!(category = category.id, "category reached twice, skipping");
        return Ok(());
    }
    let prefix = "-".repeat(depth);
    let label = visibility_label(hidden);

    store.set_category_hidden(category.id, hidden)?;
    store.touch_category(category.id, now)?;
    report.categories += 1;
    if category.hidden != hidden {
        report.flipped += 1;
    }

    match store.category_total_item(category.id)? {
        Some(total) => {
            store.set_item_hidden(total.id, hidden)?;
            report.items += 1;
            if total.hidden != hidden {
                report.flipped += 1;
            }
            report.log.info(
                ExecutionPhase::Cascade,
                format!("{prefix}Category (grade_item {}) {label}", total.id),
            );
        }
        None => {
            warn!(category = category.id, "category has no category-total item");
            report.log.warn(
                ExecutionPhase::Cascade,
                format!(
                    "{prefix}WARNING: No grade_item of type category found for category {}",
                    category.id
                ),
            );
        }
    }

    for item in store.items_by_category(category.id)? {
        if item.is_category_total() {
            continue;
        }
        store.set_item_hidden(item.id, hidden)?;
        report.items += 1;
        if item.hidden != hidden {
            report.flipped += 1;
        }
        report.log.info(
            ExecutionPhase::Cascade,
            format!("{prefix}Item {} {label}", item.id),
        );
    }

    for child in store.categories_by_parent(category.id)? {
        visit(store, &child, hidden, now, depth + 1, visited, report)?;
    }
    Ok(())
}
