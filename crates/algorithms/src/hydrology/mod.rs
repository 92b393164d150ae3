//! Surface-water analysis
//!
//! - Caves: enclosed depressions found by bounded flood fill from every seed
//! - Drainage: steepest-descent walks counted into an accumulation grid

mod caves;
mod drainage;

pub use caves::{
    find_caves, find_caves_with, flood_region, CaveCandidate, CaveParams, FindCaves, FloodOutcome,
    DEFAULT_MAX_REGION, DEFAULT_MIN_CAVE,
};
pub use drainage::{
    drainage_path, map_drainage, map_drainage_with, max_iterations, AccumulationGrid,
    DrainageParams, MapDrainage,
};
