//! Disc-based level detection
//!
//! Scores how far a cell sits below its surroundings by summing the
//! positive elevation differences to every cell within a disc around it.

use cavescan_core::raster::{Raster, TerrainGrid};
use cavescan_core::{Algorithm, Error, Result};
use cavescan_parallel::{ProcessingMode, RowScheduler};

/// Parameters for level detection
#[derive(Debug, Clone)]
pub struct LevelDetectParams {
    /// Disc diameter in cells (default 60)
    pub diameter: usize,
    /// Count higher neighbors instead of summing their height differences
    pub count: bool,
}

impl Default for LevelDetectParams {
    fn default() -> Self {
        Self {
            diameter: 60,
            count: false,
        }
    }
}

/// Level detection algorithm
#[derive(Debug, Clone, Default)]
pub struct LevelDetect;

impl Algorithm for LevelDetect {
    type Input = TerrainGrid;
    type Output = Raster<f64>;
    type Params = LevelDetectParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Level Detect"
    }

    fn description(&self) -> &'static str {
        "Sum or count the higher cells within a disc around each cell"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        level_detect(&input, params)
    }
}

/// Offsets of every cell within `radius` of the origin, origin excluded
fn disc_offsets(radius: isize) -> Vec<(isize, isize)> {
    let r2 = radius * radius;
    (-radius..=radius)
        .flat_map(|dy| (-radius..=radius).map(move |dx| (dx, dy)))
        .filter(|&(dx, dy)| dx * dx + dy * dy <= r2 && (dx, dy) != (0, 0))
        .collect()
}

/// Level detection using a default worker pool
pub fn level_detect(grid: &TerrainGrid, params: LevelDetectParams) -> Result<Raster<f64>> {
    let scheduler = RowScheduler::new(ProcessingMode::default())?;
    level_detect_with(grid, params, &scheduler)
}

/// Level detection, one scheduler task per row.
///
/// Only cells at least `diameter / 2` from every edge are scored, so the
/// disc never leaves the grid; all other cells score 0.
pub fn level_detect_with(
    grid: &TerrainGrid,
    params: LevelDetectParams,
    scheduler: &RowScheduler,
) -> Result<Raster<f64>> {
    let radius = params.diameter / 2;
    if radius == 0 {
        return Err(Error::invalid_parameter(
            "diameter",
            params.diameter,
            "disc must reach at least one neighbor",
        ));
    }

    let (width, height) = (grid.width(), grid.height());
    let mut scores = Raster::<f64>::new(width, height);
    if width <= 2 * radius || height <= 2 * radius {
        return Ok(scores);
    }

    let z = grid.elevation();
    let offsets = disc_offsets(radius as isize);
    let count = params.count;

    let rows = scheduler.map_rows(radius..height - radius, |y| {
        let scored: Vec<f64> = (radius..width - radius)
            .map(|x| {
                let here = z.at(x, y);
                offsets
                    .iter()
                    .map(|&(dx, dy)| {
                        let nx = (x as isize + dx) as usize;
                        let ny = (y as isize + dy) as usize;
                        z.at(nx, ny) - here
                    })
                    .filter(|&diff| diff > 0.0)
                    .map(|diff| if count { 1.0 } else { diff })
                    .sum()
            })
            .collect();
        Ok(scored)
    })?;

    for (y, row) in (radius..height - radius).zip(rows) {
        for (x, value) in (radius..width - radius).zip(row) {
            scores.set(x, y, value)?;
        }
    }
    Ok(scores)
}
