//! Morphological noise removal
//!
//! - **Outlier filter**: iterative row-wise removal of cells that stick out
//!   of the line through their nearest data-bearing neighbors

mod outlier;

pub use outlier::{
    morphological_filter, MorphologicalFilter, MorphologicalOutput, MorphologicalParams,
    DEFAULT_MAX_ITERATIONS,
};
