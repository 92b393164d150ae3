//! Correlation pit filter
//!
//! Scores each cell by correlating a fixed pit-shaped kernel along its row
//! and along its column and multiplying the two responses.

use cavescan_core::raster::{Raster, TerrainGrid};
use cavescan_core::{Algorithm, Error, Result};

/// 7-tap pit kernel
pub const PIT_KERNEL: [f64; 7] = [2.0, 0.33, 0.1, -5.0, -0.1, -0.33, -2.0];

/// Parameters for the correlation pit filter
#[derive(Debug, Clone)]
pub struct CorrelationParams {
    /// Odd-length 1-D kernel applied along rows and columns
    pub kernel: Vec<f64>,
}

impl Default for CorrelationParams {
    fn default() -> Self {
        Self {
            kernel: PIT_KERNEL.to_vec(),
        }
    }
}

/// Correlation pit filter algorithm
#[derive(Debug, Clone, Default)]
pub struct CorrelationPitFilter;

impl Algorithm for CorrelationPitFilter {
    type Input = TerrainGrid;
    type Output = TerrainGrid;
    type Params = CorrelationParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Correlation Pit Filter"
    }

    fn description(&self) -> &'static str {
        "Score cells by the product of row and column correlation with a pit kernel"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        correlation_pit_filter(&input, params)
    }
}

/// Low end and extent used to normalize elevations to `[0, 1]`.
///
/// Prefers the physical range from the grid metadata and falls back to the
/// range of cells that carry data.
fn normalization(grid: &TerrainGrid) -> Result<(f64, f64)> {
    let meta = grid.metadata();
    if let Some(range) = meta.elevation_range() {
        return Ok((meta.physical_low, range));
    }

    let stats = grid.elevation().statistics();
    match (stats.min, stats.max) {
        (Some(low), Some(high)) if high > low => Ok((low, high - low)),
        _ => Err(Error::invalid_parameter(
            "elevation_range",
            format!("{:?}..{:?}", stats.min, stats.max),
            "cannot normalize a grid without elevation relief",
        )),
    }
}

/// Score every cell by row and column correlation with the kernel.
///
/// Elevations are normalized with `(e - low) / range` before correlating.
/// Cells closer than half the kernel length to any edge score 0; the
/// kernel is never applied partially.
///
/// # Returns
/// A copy of the grid whose elevation layer holds the scores
pub fn correlation_pit_filter(grid: &TerrainGrid, params: CorrelationParams) -> Result<TerrainGrid> {
    let kernel = &params.kernel;
    if kernel.is_empty() || kernel.len() % 2 == 0 {
        return Err(Error::invalid_parameter(
            "kernel",
            kernel.len(),
            "kernel length must be odd",
        ));
    }

    let (low, range) = normalization(grid)?;
    let half = kernel.len() / 2;
    let (width, height) = (grid.width(), grid.height());
    let z = grid.elevation();
    let norm = |x: usize, y: usize| (z.at(x, y) - low) / range;

    let mut scores = Raster::<f64>::new(width, height);
    if width > 2 * half && height > 2 * half {
        for y in half..height - half {
            for x in half..width - half {
                let mut horizontal = 0.0;
                let mut vertical = 0.0;
                for (i, k) in kernel.iter().enumerate() {
                    horizontal += k * norm(x + i - half, y);
                    vertical += k * norm(x, y + i - half);
                }
                scores.set(x, y, horizontal * vertical)?;
            }
        }
    }

    grid.with_elevation(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cavescan_core::GridMetadata;

    fn meta(low: f64, high: f64) -> GridMetadata {
        GridMetadata {
            physical_low: low,
            physical_high: high,
            ..GridMetadata::default()
        }
    }

    fn pit(size: usize, depth: f64) -> TerrainGrid {
        let c = size / 2;
        TerrainGrid::from_fn(size, size, |x, y| if (x, y) == (c, c) { depth } else { 5.0 })
            .unwrap()
            .with_metadata(meta(0.0, 10.0))
    }

    #[test]
    fn test_only_full_windows_are_scored() {
        let out = correlation_pit_filter(&pit(7, 2.0), CorrelationParams::default()).unwrap();
        let scores = out.elevation();

        // outer taps cancel on the flat surround; each axis responds with -5 * 0.2
        assert_relative_eq!(scores.at(3, 3), 1.0, epsilon = 1e-12);
        for y in 0..7 {
            for x in 0..7 {
                if (x, y) != (3, 3) {
                    assert_eq!(scores.at(x, y), 0.0);
                }
            }
        }
    }

    #[test]
    fn test_flat_surface_response() {
        let grid = TerrainGrid::from_elevation(9, 9, vec![5.0; 81])
            .unwrap()
            .with_metadata(meta(0.0, 10.0));
        let out = correlation_pit_filter(&grid, CorrelationParams::default()).unwrap();

        // the kernel sums to -5, so each axis gives -2.5 on a half-height plane
        assert_relative_eq!(out.elevation().at(4, 4), 6.25, epsilon = 1e-12);
        assert_eq!(out.elevation().at(2, 4), 0.0);
    }

    #[test]
    fn test_falls_back_to_data_range() {
        let grid = TerrainGrid::from_fn(7, 7, |x, y| if (x, y) == (3, 3) { 1.0 } else { 11.0 }).unwrap();
        let out = correlation_pit_filter(&grid, CorrelationParams::default()).unwrap();

        // normalized surround 1, pit 0: each axis sums to 0
        assert_relative_eq!(out.elevation().at(3, 3), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_small_grid_scores_nothing() {
        let grid = pit(5, 0.0);
        let out = correlation_pit_filter(&grid, CorrelationParams::default()).unwrap();
        assert!(out.elevation().iter().all(|&s| s == 0.0));
        assert_eq!(out.classification(), grid.classification());
    }

    #[test]
    fn test_rejects_bad_input() {
        let even = CorrelationParams { kernel: vec![1.0, -1.0] };
        assert!(correlation_pit_filter(&pit(7, 2.0), even).is_err());

        let flat = TerrainGrid::from_elevation(7, 7, vec![3.0; 49]).unwrap();
        assert!(matches!(
            correlation_pit_filter(&flat, CorrelationParams::default()),
            Err(Error::InvalidParameter { name: "elevation_range", .. })
        ));
    }
}
