//! # Pitwall Comparison Engine
//!
//! Head-to-head analysis of two drivers within one session. Metrics are
//! computed from each driver's reconciled record and full lap history, and
//! every metric carries an explicit verdict so the presentation layer never
//! re-derives who was faster.
//!
//! Verdicts require strict superiority: equal values tie, and a metric
//! unavailable on either side yields no verdict at all rather than a
//! misleading win.

pub mod engine;
pub mod error;
pub mod report;

pub use engine::compare_drivers;
pub use error::ComparisonError;
pub use report::{ComparisonReport, Metric, MetricComparison, Verdict};
