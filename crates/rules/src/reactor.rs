//! Parent-hiding reactor.
//!
//! Keeps newly created or modified grade items from being visible while an
//! enclosing category is hidden. The reactor only ever hides; it never makes
//! anything visible.
//!
//! Two entry points exist with deliberately different reach:
//! - [`on_item_created`] checks the item's own category only.
//! - [`apply_parent_hiding`] walks the whole ancestor path and is run in
//!   batch by [`sweep_recent_items`] from the periodic task.

use chrono::{DateTime, Utc};
use gradevis_core::{CategoryId, GradeItem, ItemId, Result};
use gradevis_store::{CacheInvalidator, GradebookStore};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cascade::apply_visibility;

/// What [`apply_parent_hiding`] did for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentHiding {
    Unchanged,
    /// A leaf item was hidden because `ancestor` is hidden.
    ItemHidden { ancestor: CategoryId },
    /// A category total's whole category was hidden because `ancestor` is hidden.
    SubtreeHidden {
        category: CategoryId,
        ancestor: CategoryId,
    },
}

/// Counters for one batch sweep.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    pub scanned: usize,
    pub items_hidden: usize,
    pub subtrees_hidden: usize,
    pub failures: usize,
}

/// React to a freshly created grade item.
///
/// If the item's category, or that category's total item, is hidden, the
/// new item and the category are hidden and the category is touched.
/// Returns whether anything was written. An unknown item or category is a
/// no-op.
pub fn on_item_created<S: GradebookStore + ?Sized>(
    store: &mut S,
    item_id: ItemId,
    now: DateTime<Utc>,
) -> Result<bool> {
    let Some(item) = store.item(item_id)? else {
        return Ok(false);
    };
    let Some(category_id) = item.category_id else {
        return Ok(false);
    };
    let Some(category) = store.category(category_id)? else {
        return Ok(false);
    };

    let total_hidden = store
        .category_total_item(category.id)?
        .map_or(false, |t| t.hidden);
    if !(total_hidden || category.hidden) {
        return Ok(false);
    }

    store.set_item_hidden(item.id, true)?;
    store.set_category_hidden(category.id, true)?;
    store.touch_category(category.id, now)?;
    debug!(item = item.id, category = category.id, "new item hidden under hidden category");
    Ok(true)
}

/// Hide `item` if any enclosing category is hidden.
///
/// For a category-total item the ancestors of its category are inspected
/// (the category itself is not) and, on a hidden ancestor, the whole
/// category subtree is hidden. For an activity or manual item the path
/// includes the item's own category and only the item is hidden. Other item
/// types are left alone.
pub fn apply_parent_hiding<S: GradebookStore + ?Sized>(
    store: &mut S,
    item: &GradeItem,
    now: DateTime<Utc>,
    cache: &dyn CacheInvalidator,
) -> Result<ParentHiding> {
    let Some(category_id) = item.category_id else {
        return Ok(ParentHiding::Unchanged);
    };
    let Some(category) = store.category(category_id)? else {
        return Ok(ParentHiding::Unchanged);
    };

    if item.is_category_total() {
        let Some(ancestor) = first_hidden(store, category.ancestor_ids())? else {
            return Ok(ParentHiding::Unchanged);
        };
        apply_visibility(store, &category, false, now, cache)?;
        store.touch_category(category.id, now)?;
        store.touch_item(item.id, now)?;
        return Ok(ParentHiding::SubtreeHidden {
            category: category.id,
            ancestor,
        });
    }

    if !item.item_type.is_leaf() {
        return Ok(ParentHiding::Unchanged);
    }

    let path = std::iter::once(category.id).chain(category.ancestor_ids());
    let Some(ancestor) = first_hidden(store, path)? else {
        return Ok(ParentHiding::Unchanged);
    };
    store.set_item_hidden(item.id, true)?;
    store.touch_item(item.id, now)?;
    Ok(ParentHiding::ItemHidden { ancestor })
}

/// Nearest hidden category among `ids`, in iteration order.
fn first_hidden<S: GradebookStore + ?Sized>(
    store: &S,
    ids: impl IntoIterator<Item = CategoryId>,
) -> Result<Option<CategoryId>> {
    for id in ids {
        if let Some(c) = store.category(id)? {
            if c.hidden {
                return Ok(Some(c.id));
            }
        }
    }
    Ok(None)
}

/// Run [`apply_parent_hiding`] over every item modified strictly after `since`.
///
/// A failing item is logged and skipped; only the initial query can fail
/// the sweep.
pub fn sweep_recent_items<S: GradebookStore + ?Sized>(
    store: &mut S,
    since: DateTime<Utc>,
    now: DateTime<Utc>,
    cache: &dyn CacheInvalidator,
) -> Result<SweepReport> {
    let items = store.items_modified_since(since)?;
    let mut report = SweepReport {
        scanned: items.len(),
        ..Default::default()
    };

    for item in &items {
        match apply_parent_hiding(store, item, now, cache) {
            Ok(ParentHiding::Unchanged) => {}
            Ok(ParentHiding::ItemHidden { ancestor }) => {
                debug!(item = item.id, ancestor, "item hidden by hidden ancestor");
                report.items_hidden += 1;
            }
            Ok(ParentHiding::SubtreeHidden { category, ancestor }) => {
                debug!(item = item.id, category, ancestor, "category hidden by hidden ancestor");
                report.subtrees_hidden += 1;
            }
            Err(e) => {
                warn!(item = item.id, error = %e, "parent hiding failed, skipping item");
                report.failures += 1;
            }
        }
    }

    if report.items_hidden + report.subtrees_hidden > 0 {
        info!(
            scanned = report.scanned,
            items_hidden = report.items_hidden,
            subtrees_hidden = report.subtrees_hidden,
            "parent hiding sweep"
        );
    }
    Ok(report)
}
