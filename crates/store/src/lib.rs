//! Record store access for the gradebook visibility engine.
//!
//! This crate provides:
//! - [`GradebookStore`]: read/write façade over categories, grade items and courses
//! - [`ScheduleStore`]: persisted schedule rules and periodic task state
//! - [`CacheInvalidator`]: the "course structure changed" hook
//! - [`MemoryStore`]: in-memory implementation with JSON snapshot persistence

pub mod cache;
pub mod error;
pub mod memory;
pub mod snapshot;
pub mod traits;

pub use cache::{CacheInvalidator, CountingCache, NoopCache, TracingCache};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use snapshot::Snapshot;
pub use traits::{GradebookStore, ScheduleStore};
