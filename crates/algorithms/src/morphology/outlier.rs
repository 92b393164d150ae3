//! Iterative row-wise outlier removal
//!
//! Digitization noise in LIDAR-derived grids shows up as single cells that
//! stick out of the line through their row neighbors. Each pass fits that
//! line through the nearest data-bearing cells on either side and pulls
//! cells that miss it by more than a fixed threshold down to the lower
//! neighbor. Passes repeat until nothing changes.

use ndarray::Array2;
use cavescan_core::raster::{Raster, TerrainGrid};
use cavescan_core::{Algorithm, Error, Result};

/// Default cap on filter passes
pub const DEFAULT_MAX_ITERATIONS: usize = 200;

/// Parameters for the morphological outlier filter
#[derive(Debug, Clone)]
pub struct MorphologicalParams {
    /// Maximum number of passes (default 200)
    pub max_iterations: usize,
    /// Percentile of the initial residuals used as the rejection
    /// threshold, in `(0, 1]` (default 0.5, the median)
    pub percentile: f64,
}

impl Default for MorphologicalParams {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            percentile: 0.5,
        }
    }
}

/// Filtered grid plus a record of how the filter converged
#[derive(Debug, Clone)]
pub struct MorphologicalOutput {
    /// Copy of the input with outliers replaced
    pub grid: TerrainGrid,
    /// Residual above which a cell was treated as an outlier
    pub threshold: f64,
    /// Passes performed
    pub iterations: usize,
    /// Cells replaced in each pass
    pub removals: Vec<usize>,
    /// Whether the last pass replaced nothing
    pub converged: bool,
}

impl MorphologicalOutput {
    /// Total cells replaced over all passes
    pub fn total_removals(&self) -> usize {
        self.removals.iter().sum()
    }
}

/// Morphological outlier filter algorithm
#[derive(Debug, Clone, Default)]
pub struct MorphologicalFilter;

impl Algorithm for MorphologicalFilter {
    type Input = TerrainGrid;
    type Output = MorphologicalOutput;
    type Params = MorphologicalParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Morphological Filter"
    }

    fn description(&self) -> &'static str {
        "Iteratively replace cells that deviate from the line through their row neighbors"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        morphological_filter(&input, params)
    }
}

/// Remove row-wise outliers from the elevation layer.
///
/// The threshold is the `percentile` of the distinct residuals
/// `|e - (left + right) / 2|` over all interior columns of the input, and
/// stays fixed for every pass. Each pass reads only the previous pass's
/// elevations, so a replacement never influences its neighbors within the
/// same pass. Cells without data and the first and last column are never
/// modified.
///
/// # Arguments
/// * `grid` - Input terrain grid (not modified)
/// * `params` - Pass cap and threshold percentile
pub fn morphological_filter(
    grid: &TerrainGrid,
    params: MorphologicalParams,
) -> Result<MorphologicalOutput> {
    if !(params.percentile > 0.0 && params.percentile <= 1.0) {
        return Err(Error::invalid_parameter(
            "percentile",
            params.percentile,
            "must be in (0, 1]",
        ));
    }

    let width = grid.width();
    let mut current = grid.elevation().data().clone();

    let threshold = match residual_threshold(&current, params.percentile) {
        Some(t) => t,
        // fewer than three columns: no cell has two row neighbors
        None => {
            return Ok(MorphologicalOutput {
                grid: grid.clone(),
                threshold: 0.0,
                iterations: 0,
                removals: Vec::new(),
                converged: true,
            })
        }
    };

    let mut removals = Vec::new();
    let mut converged = false;

    while removals.len() < params.max_iterations {
        let mut next = current.clone();
        let mut removed = 0;

        for (row, mut out) in current.rows().into_iter().zip(next.rows_mut()) {
            for col in 1..width - 1 {
                let z = row[col];
                if z.is_nan() || z <= 0.0 {
                    continue;
                }

                let (span_before, before) = nearest_data((0..col).rev().map(|c| row[c]), z);
                let (span_after, after) = nearest_data((col + 1..width).map(|c| row[c]), z);

                let expected = before
                    + (after - before) * span_before as f64 / (span_before + span_after) as f64;
                if (z - expected).abs() > threshold {
                    out[col] = before.min(after);
                    removed += 1;
                }
            }
        }

        removals.push(removed);
        current = next;
        if removed == 0 {
            converged = true;
            break;
        }
    }

    let filtered = grid.with_elevation(Raster::from_array(current))?;
    Ok(MorphologicalOutput {
        grid: filtered,
        threshold,
        iterations: removals.len(),
        removals,
        converged,
    })
}

/// Distance to and value of the first cell with data, or `(1, fallback)`
fn nearest_data(cells: impl Iterator<Item = f64>, fallback: f64) -> (usize, f64) {
    cells
        .enumerate()
        .find(|&(_, z)| z > 0.0)
        .map(|(i, z)| (i + 1, z))
        .unwrap_or((1, fallback))
}

fn residual_threshold(elevation: &Array2<f64>, percentile: f64) -> Option<f64> {
    let width = elevation.ncols();
    let mut residuals = Vec::new();
    for row in elevation.rows() {
        for col in 1..width.saturating_sub(1) {
            residuals.push((row[col] - (row[col - 1] + row[col + 1]) / 2.0).abs());
        }
    }
    if residuals.is_empty() {
        return None;
    }

    residuals.sort_by(f64::total_cmp);
    residuals.dedup();

    let index = ((residuals.len() as f64 * percentile) as usize)
        .saturating_sub(1)
        .min(residuals.len() - 1);
    Some(residuals[index])
}
