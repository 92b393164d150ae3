//! Point-class handling
//!
//! - **Trim**: drop cells whose LAS class code is not in an allowed set

mod trim;

pub use trim::{trim_classifications, CLASS_MASK};
