//! Concurrency primitives.

pub mod signal;
pub mod testonly;
