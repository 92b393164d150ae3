//! Integer slope angle
//!
//! Averages the distance-weighted elevation differences to the 8 neighbors
//! into a directional gradient and reports its angle in whole degrees.
//! Coarser than a Horn slope, but cheap and stable on noisy LIDAR grids.

use cavescan_core::raster::{queen, Raster, TerrainGrid};
use cavescan_core::{Algorithm, Error, Result};

/// Slope angle algorithm
#[derive(Debug, Clone, Default)]
pub struct SlopeAngle;

impl Algorithm for SlopeAngle {
    type Input = TerrainGrid;
    type Output = Raster<u8>;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Slope Angle"
    }

    fn description(&self) -> &'static str {
        "Whole-degree slope from the mean neighbor gradient"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        slope_angle(&input)
    }
}

/// Slope of every cell in whole degrees, truncated.
///
/// Out-of-grid neighbors are skipped and the mean is taken over those that
/// remain; a grid with a single cell has slope 0.
pub fn slope_angle(grid: &TerrainGrid) -> Result<Raster<u8>> {
    let (width, height) = (grid.width(), grid.height());
    let z = grid.elevation();
    let mut angles = Raster::<u8>::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let here = z.at(x, y);
            let (mut gx, mut gy, mut n) = (0.0, 0.0, 0usize);

            for cell in queen(width, height, x, y) {
                if (cell.x, cell.y) == (x, y) {
                    continue;
                }
                let dx = cell.x as f64 - x as f64;
                let dy = cell.y as f64 - y as f64;
                let diff = (z.at(cell.x, cell.y) - here) / dx.hypot(dy);
                gx += diff * dx;
                gy += diff * dy;
                n += 1;
            }

            if n > 0 {
                let gradient = (gx / n as f64).hypot(gy / n as f64);
                angles.set(x, y, gradient.atan().to_degrees() as u8)?;
            }
        }
    }

    Ok(angles)
}
