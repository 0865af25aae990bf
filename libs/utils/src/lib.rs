//! Small utilities shared by the workspace crates.

pub mod enum_util;
