//! Geometric mean smoothing

use cavescan_core::raster::{Raster, TerrainGrid, Window};
use cavescan_core::{Algorithm, Error, Result};

/// Parameters for the geometric mean filter
#[derive(Debug, Clone)]
pub struct GeometricMeanParams {
    /// Odd window side length in cells (default 3)
    pub window: usize,
}

impl Default for GeometricMeanParams {
    fn default() -> Self {
        Self { window: 3 }
    }
}

/// Geometric mean filter algorithm
#[derive(Debug, Clone, Default)]
pub struct GeometricMeanFilter;

impl Algorithm for GeometricMeanFilter {
    type Input = TerrainGrid;
    type Output = TerrainGrid;
    type Params = GeometricMeanParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Geometric Mean Filter"
    }

    fn description(&self) -> &'static str {
        "Smooth elevations with a windowed geometric mean"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        geometric_mean_filter(&input, params)
    }
}

/// Replace each elevation with the geometric mean of `e + 1` over its
/// window, minus 1.
///
/// The window is clipped at the edges and the mean taken over the cells
/// that remain. Products are accumulated as sums of logarithms so large
/// windows do not overflow.
pub fn geometric_mean_filter(grid: &TerrainGrid, params: GeometricMeanParams) -> Result<TerrainGrid> {
    if params.window == 0 || params.window % 2 == 0 {
        return Err(Error::invalid_parameter(
            "window",
            params.window,
            "window side must be odd",
        ));
    }

    let (width, height) = (grid.width(), grid.height());
    let z = grid.elevation();
    let half = params.window / 2;

    let mut smoothed = Raster::<f64>::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let mut log_sum = 0.0;
            let mut n = 0usize;
            for cell in Window::new(width, height, x, y, half) {
                log_sum += (z.at(cell.x, cell.y) + 1.0).ln();
                n += 1;
            }
            smoothed.set(x, y, (log_sum / n as f64).exp() - 1.0)?;
        }
    }

    grid.with_elevation(smoothed)
}
