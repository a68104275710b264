//! # Pitwall Reconciliation Engine
//!
//! This crate turns the loosely-synchronized raw streams fetched from the
//! timing API into one consistent, ranked leaderboard.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no I/O, no side effects, no shared state. Given the
//!   same [`core_types::RaceSnapshot`] twice, [`reconcile`] returns the same
//!   output twice, down to deep equality.
//! - **Degrade, never fail:** missing streams, missing fields and records
//!   for unknown drivers are absorbed with documented defaults. Data-shape
//!   anomalies are not errors.
//!
//! ## Public API
//!
//! - [`reconcile`]: raw streams in, ranked `DriverViewRecord`s out.
//! - [`sort::sort_records`]: stable, sentinel-aware column sorting.
//! - [`classification::build_classification`]: derives a final
//!   classification from the full lap history.

// Declare the modules that constitute this crate.
pub mod classification;
pub mod engine;
pub mod error;
pub mod sort;

// Re-export the key components to create a clean, public-facing API.
pub use classification::build_classification;
pub use engine::reconcile;
pub use error::ReconcileError;
pub use sort::{sort_records, SortDirection, SortField, SortState};
