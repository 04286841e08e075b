//! Shared domain types for the gradebook visibility scheduler.
//!
//! This crate provides:
//! - Gradebook records (courses, categories, grade items) with materialized paths
//! - Schedule rule records and their closed enumerations
//! - Pattern matching for course short names and category id-numbers
//! - Clock abstraction, error taxonomy, and environment configuration

pub mod clock;
pub mod config;
pub mod error;
pub mod matcher;
pub mod model;
pub mod schedule;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::*;
pub use matcher::{matches, MatchType, Predicate};
pub use model::*;
pub use schedule::*;
