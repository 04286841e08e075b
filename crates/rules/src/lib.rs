//! Visibility engine for scheduled gradebook rules.
//!
//! This crate provides:
//! - Recursive visibility cascade over the grade category tree
//! - Parent-hiding reactor (on item creation and as a batch sweep)
//! - Rule resolution: course and category matching, cascade, course total
//! - Schedule runner with per-rule isolation and a consistency sweep
//! - The periodic task tying the reactor sweep and runner together
//! - Rule validation, administration and dry-run preview

pub mod admin;
pub mod cascade;
pub mod preview;
pub mod reactor;
pub mod resolver;
pub mod rule_log;
pub mod runner;
pub mod task;
pub mod validation;

#[cfg(test)]
pub(crate) mod fixtures;

pub use admin::{RuleAdmin, Saved, SortColumn, SortDirection};
pub use cascade::{apply_visibility, CascadeReport};
pub use preview::{preview, CoursePreview, Preview, PreviewCategory};
pub use reactor::{apply_parent_hiding, on_item_created, sweep_recent_items, ParentHiding, SweepReport};
pub use resolver::{match_categories, match_courses, resolve_and_apply, CategoryTargets, Resolution};
pub use rule_log::{ExecutionPhase, LogLevel, LogLine, RuleLog};
pub use runner::{sync_category_flags, RunReport, ScheduleRunner};
pub use task::{TickReport, VisibilityTask};
pub use validation::{validate_draft, ValidationResult};
