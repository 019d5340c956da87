//! Input/output helpers.
//!
//! - CSV table ingest + validation (`tables`)
//! - report JSON export (`export`)

pub mod export;
pub mod tables;

pub use export::*;
pub use tables::*;
