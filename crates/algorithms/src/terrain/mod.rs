//! Surface filters and derivatives
//!
//! - Geometric mean: windowed smoothing of the elevation layer
//! - Slope angle: whole-degree slope from the mean neighbor gradient

mod geometric_mean;
mod slope_angle;

pub use geometric_mean::{geometric_mean_filter, GeometricMeanFilter, GeometricMeanParams};
pub use slope_angle::{slope_angle, SlopeAngle};
