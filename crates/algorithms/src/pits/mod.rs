//! Pit scoring filters
//!
//! Score surfaces that highlight small depressions. Outputs are rankings
//! for visualization, not new elevations.

mod correlation;
mod level_detect;

pub use correlation::{correlation_pit_filter, CorrelationParams, CorrelationPitFilter, PIT_KERNEL};
pub use level_detect::{level_detect, level_detect_with, LevelDetect, LevelDetectParams};
