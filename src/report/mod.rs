//! Reporting utilities: terminal formatting for narrative runs.
//!
//! We keep formatting code in one place so:
//! - the aggregation/detection code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

pub mod format;

pub use format::*;
