//! Steepest-descent drainage accumulation
//!
//! Every cell releases one walker that repeatedly moves to the lowest cell
//! of the window around it until it sits on a local sink. Each move is
//! recorded in a shared counter grid, so cells where many walks converge
//! (valley floors, sinkholes) end up with large counts.

use std::sync::atomic::{AtomicU32, Ordering};

use cavescan_core::raster::{Raster, TerrainGrid, Window};
use cavescan_core::{Algorithm, Error, Result};
use cavescan_parallel::{ProcessingMode, RowScheduler};

use crate::line::LineCells;

/// Per-cell count of drainage walks crossing each cell
pub type AccumulationGrid = Raster<u32>;

/// Parameters for drainage tracing
#[derive(Debug, Clone)]
pub struct DrainageParams {
    /// Half-width of the look-window in cells (default 1, i.e. a 3x3 window)
    pub look_distance: usize,
}

impl Default for DrainageParams {
    fn default() -> Self {
        Self { look_distance: 1 }
    }
}

impl DrainageParams {
    fn validate(&self) -> Result<()> {
        if self.look_distance == 0 {
            return Err(Error::invalid_parameter(
                "look_distance",
                self.look_distance,
                "must be at least one cell",
            ));
        }
        Ok(())
    }
}

/// Iteration cap for one walk: enough to cross the grid diagonally twice
pub fn max_iterations(width: usize, height: usize) -> usize {
    let diagonal = ((width * width + height * height) as f64).sqrt();
    ((2.0 * diagonal).round() as usize).max(1)
}

/// Strictly lowest cell of the clipped window around `(x, y)`.
///
/// The current cell is the starting minimum and only a strictly lower
/// value replaces it, so among equal minima the first in row-major order
/// wins and a flat window reports `(x, y)` itself.
fn lowest_in_window(elevation: &Raster<f64>, x: usize, y: usize, look: usize) -> (usize, usize) {
    let mut min = elevation.at(x, y);
    let mut best = (x, y);
    for cell in Window::new(elevation.width(), elevation.height(), x, y, look) {
        let z = elevation.at(cell.x, cell.y);
        if z < min {
            min = z;
            best = (cell.x, cell.y);
        }
    }
    best
}

/// Walk downhill from `(x, y)`, calling `step(from, to)` once per iteration.
///
/// The final iteration of a walk that reaches a sink reports `from == to`.
fn walk<F>(elevation: &Raster<f64>, x: usize, y: usize, look: usize, cap: usize, mut step: F)
where
    F: FnMut((usize, usize), (usize, usize)),
{
    let mut here = (x, y);
    for _ in 0..cap {
        let next = lowest_in_window(elevation, here.0, here.1, look);
        step(here, next);
        if next == here {
            break;
        }
        here = next;
    }
}

/// Drainage tracing algorithm
#[derive(Debug, Clone, Default)]
pub struct MapDrainage;

impl Algorithm for MapDrainage {
    type Input = TerrainGrid;
    type Output = AccumulationGrid;
    type Params = DrainageParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Map Drainage"
    }

    fn description(&self) -> &'static str {
        "Count steepest-descent drainage walks through every cell"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        map_drainage(&input, params)
    }
}

/// Trace drainage from every cell using a default worker pool.
///
/// See [`map_drainage_with`].
pub fn map_drainage(grid: &TerrainGrid, params: DrainageParams) -> Result<AccumulationGrid> {
    let scheduler = RowScheduler::new(ProcessingMode::default())?;
    map_drainage_with(grid, params, &scheduler)
}

/// Trace drainage from every cell, one scheduler task per grid row.
///
/// With `look_distance == 1` each iteration of a walk adds one to the cell
/// it ends on; a walk that starts on a sink adds one to itself. With a
/// wider window each iteration stamps the straight line between its start
/// and end cells, both included, so long jumps leave no gaps.
///
/// Walks are capped at [`max_iterations`] iterations. Counters are shared
/// between rows and updated with atomic increments.
///
/// # Arguments
/// * `grid` - Terrain grid to trace
/// * `params` - Look-window half-width
/// * `scheduler` - Worker pool the rows run on
pub fn map_drainage_with(
    grid: &TerrainGrid,
    params: DrainageParams,
    scheduler: &RowScheduler,
) -> Result<AccumulationGrid> {
    params.validate()?;

    let elevation = grid.elevation();
    let (width, height) = (grid.width(), grid.height());
    let look = params.look_distance;
    let cap = max_iterations(width, height);

    let counts: Vec<AtomicU32> = (0..width * height).map(|_| AtomicU32::new(0)).collect();
    let bump = |x: usize, y: usize| {
        counts[y * width + x].fetch_add(1, Ordering::Relaxed);
    };

    scheduler.for_each_row(0..height, |y| {
        for x in 0..width {
            if look == 1 {
                walk(elevation, x, y, look, cap, |_, to| bump(to.0, to.1));
            } else {
                walk(elevation, x, y, look, cap, |from, to| {
                    for (lx, ly) in LineCells::new(from, to) {
                        bump(lx, ly);
                    }
                });
            }
        }
        Ok(())
    })?;

    let counts = counts.into_iter().map(AtomicU32::into_inner).collect();
    Raster::from_vec(counts, width, height)
}

/// The cells one drainage walk from `(x, y)` ends each iteration on.
///
/// One entry per iteration; a walk that reaches a sink repeats the sink as
/// its last entry, so a cell that is already a sink yields just itself.
pub fn drainage_path(
    grid: &TerrainGrid,
    x: usize,
    y: usize,
    params: &DrainageParams,
) -> Result<Vec<(usize, usize)>> {
    params.validate()?;
    if x >= grid.width() || y >= grid.height() {
        return Err(Error::IndexOutOfBounds {
            x,
            y,
            width: grid.width(),
            height: grid.height(),
        });
    }

    let mut path = Vec::new();
    let cap = max_iterations(grid.width(), grid.height());
    walk(grid.elevation(), x, y, params.look_distance, cap, |_, to| path.push(to));
    Ok(path)
}
