//! # cavescan algorithms
//!
//! Terrain passes over LIDAR-derived elevation grids.
//!
//! ## Available Algorithm Categories
//!
//! - **hydrology**: Cave detection by bounded flood fill, drainage accumulation
//! - **morphology**: Iterative row-wise outlier removal
//! - **pits**: Correlation pit filter, disc level detection
//! - **terrain**: Geometric mean smoothing, slope angle
//! - **classification**: Trimming cells by point class
//!
//! Row-parallel passes take a [`cavescan_parallel::RowScheduler`] through
//! their `*_with` variants; the plain variants build a default pool.

pub mod classification;
pub mod hydrology;
pub mod line;
pub mod morphology;
pub mod pits;
pub mod terrain;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classification::trim_classifications;
    pub use crate::hydrology::{
        drainage_path, find_caves, find_caves_with, flood_region, map_drainage,
        map_drainage_with, AccumulationGrid, CaveCandidate, CaveParams, DrainageParams,
        FindCaves, FloodOutcome, MapDrainage,
    };
    pub use crate::morphology::{
        morphological_filter, MorphologicalFilter, MorphologicalOutput, MorphologicalParams,
    };
    pub use crate::pits::{
        correlation_pit_filter, level_detect, level_detect_with, CorrelationParams,
        CorrelationPitFilter, LevelDetect, LevelDetectParams, PIT_KERNEL,
    };
    pub use crate::terrain::{
        geometric_mean_filter, slope_angle, GeometricMeanFilter, GeometricMeanParams, SlopeAngle,
    };
    pub use cavescan_core::prelude::*;
    pub use cavescan_parallel::{CancelToken, ProcessingMode, RowScheduler};
}
