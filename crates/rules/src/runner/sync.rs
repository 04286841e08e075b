//! Category/total flag reconciliation.

use chrono::{DateTime, Utc};
use gradevis_core::{Predicate, Result};
use gradevis_store::GradebookStore;
use tracing::info;

/// Make every category's hidden flag equal its category-total item's.
///
/// The item is authoritative. Reconciled categories are touched with `now`.
/// Totals without a category, or pointing at a missing one, are skipped.
/// Returns the number of categories changed.
pub fn sync_category_flags<S: GradebookStore + ?Sized>(
    store: &mut S,
    now: DateTime<Utc>,
) -> Result<usize> {
    let mut changed = 0;
    for total in store.category_total_items(None, &Predicate::Any)? {
        let Some(category_id) = total.category_id else {
            continue;
        };
        let Some(category) = store.category(category_id)? else {
            continue;
        };
        if category.hidden == total.hidden {
            continue;
        }
        store.set_category_hidden(category.id, total.hidden)?;
        store.touch_category(category.id, now)?;
        changed += 1;
    }
    if changed > 0 {
        info!(changed, "category flags reconciled with their totals");
    }
    Ok(changed)
}
