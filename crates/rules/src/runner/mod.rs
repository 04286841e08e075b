//! Schedule runner: executes due rules and reconciles category flags.
//!
//! One run processes every planned rule whose scheduled time has passed,
//! however long ago, so missed runs catch up. Each rule is isolated: a
//! failing rule is marked as errored and the run moves on. After the rules,
//! a consistency sweep aligns every category's hidden flag with its
//! category-total item, and the cache is signalled once.

mod core;
mod sync;

#[cfg(test)]
mod tests;

pub use self::core::{RunReport, ScheduleRunner};
pub use self::sync::sync_category_flags;
