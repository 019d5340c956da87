//! Data sources: seeded mock dataset generation and the table cache.

pub mod cache;
pub mod mock;

pub use cache::*;
pub use mock::*;
