//! Physical and geographic metadata carried alongside a terrain grid

use serde::{Deserialize, Serialize};

/// Physical footprint of a terrain grid.
///
/// The analysis passes treat this as opaque: it is copied from input to
/// output untouched. Only the elevation range is read, by passes that
/// normalize elevations to `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridMetadata {
    /// Western edge in projected units
    pub left: f64,
    /// Northern edge in projected units
    pub top: f64,
    /// Eastern edge in projected units
    pub right: f64,
    /// Southern edge in projected units
    pub bottom: f64,
    /// Lowest elevation in the source point cloud
    pub physical_low: f64,
    /// Highest elevation in the source point cloud
    pub physical_high: f64,
    /// Georeferencing zone, e.g. a UTM zone such as `"12T"`
    pub zone: Option<String>,
}

impl GridMetadata {
    /// Horizontal extent (east-west)
    pub fn physical_width(&self) -> f64 {
        (self.right - self.left).abs()
    }

    /// Horizontal extent (north-south)
    pub fn physical_depth(&self) -> f64 {
        (self.bottom - self.top).abs()
    }

    /// Vertical extent, or `None` when the range is empty or not finite
    pub fn elevation_range(&self) -> Option<f64> {
        let range = self.physical_high - self.physical_low;
        (range.is_finite() && range > 0.0).then_some(range)
    }
}
