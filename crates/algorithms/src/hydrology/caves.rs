//! Closed-depression ("cave") detection by bounded flood fill
//!
//! Every interior cell is used as a seed: water is poured in up to
//! `flood_depth` above the seed and the flooded 8-connected region is
//! grown with an explicit stack. A seed is reported when the region is
//! larger than `min_size`, stays under `max_size`, and never spills onto
//! the outer ring of the grid. Sinkholes and cave entrances show up as
//! small, bowl-shaped basins; open terrain drains to the edge and broad
//! flats hit the cap.

use std::collections::HashSet;

use cavescan_core::raster::{queen, Raster, TerrainGrid};
use cavescan_core::{Algorithm, Error, Result};
use cavescan_parallel::{ProcessingMode, RowScheduler};

/// Region size at which a flood is abandoned as too large to be a cave
pub const DEFAULT_MAX_REGION: usize = 300;

/// A region must be strictly larger than this to be reported
pub const DEFAULT_MIN_CAVE: usize = 5;

/// A detected depression seed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaveCandidate {
    /// Grid column of the seed
    pub x: f64,
    /// Grid row of the seed
    pub y: f64,
    /// Elevation at the seed
    pub z: f64,
}

/// Parameters for cave detection
#[derive(Debug, Clone)]
pub struct CaveParams {
    /// Depth of water poured above each seed, in elevation units (default 2.0)
    pub flood_depth: f64,
    /// Hard cap on the flooded region size (default 300)
    pub max_size: usize,
    /// Regions of this many cells or fewer are ignored (default 5)
    pub min_size: usize,
}

impl Default for CaveParams {
    fn default() -> Self {
        Self {
            flood_depth: 2.0,
            max_size: DEFAULT_MAX_REGION,
            min_size: DEFAULT_MIN_CAVE,
        }
    }
}

impl CaveParams {
    /// Default caps with the given flood depth
    pub fn with_depth(flood_depth: f64) -> Self {
        Self {
            flood_depth,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        validate_depth(self.flood_depth)?;
        if self.max_size == 0 {
            return Err(Error::invalid_parameter(
                "max_size",
                self.max_size,
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

fn validate_depth(flood_depth: f64) -> Result<()> {
    if !flood_depth.is_finite() || flood_depth < 0.0 {
        return Err(Error::invalid_parameter(
            "flood_depth",
            flood_depth,
            "must be a finite, non-negative depth",
        ));
    }
    Ok(())
}

/// How a single flood from one seed ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloodOutcome {
    /// The region closed off with this many cells
    Enclosed(usize),
    /// The flood would have spilled onto the outer ring of the grid
    ReachedBoundary,
    /// The region grew to the size cap
    ReachedCap,
}

impl FloodOutcome {
    /// Region size when the flood stayed enclosed
    pub fn enclosed_size(&self) -> Option<usize> {
        match *self {
            FloodOutcome::Enclosed(size) => Some(size),
            FloodOutcome::ReachedBoundary | FloodOutcome::ReachedCap => None,
        }
    }
}

/// Scratch state for one flood; reused across the seeds of a row
struct FloodRegion {
    visited: HashSet<usize>,
    stack: Vec<(usize, usize)>,
    size: usize,
}

impl FloodRegion {
    fn new() -> Self {
        Self {
            visited: HashSet::new(),
            stack: Vec::new(),
            size: 0,
        }
    }

    fn grow(
        &mut self,
        elevation: &Raster<f64>,
        x: usize,
        y: usize,
        flood_depth: f64,
        max_size: usize,
    ) -> FloodOutcome {
        self.visited.clear();
        self.stack.clear();
        self.size = 0;

        let (width, height) = (elevation.width(), elevation.height());
        let flood_level = elevation.at(x, y) + flood_depth;
        self.stack.push((x, y));

        while let Some((cx, cy)) = self.stack.pop() {
            for cell in queen(width, height, cx, cy) {
                let z = elevation.at(cell.x, cell.y);
                // NaN never floods
                if z.is_nan() || z > flood_level || self.visited.contains(&cell.index) {
                    continue;
                }
                if elevation.is_border(cell.x, cell.y) {
                    return FloodOutcome::ReachedBoundary;
                }

                self.visited.insert(cell.index);
                self.size += 1;
                if self.size >= max_size {
                    return FloodOutcome::ReachedCap;
                }
                self.stack.push((cell.x, cell.y));
            }
        }

        FloodOutcome::Enclosed(self.size)
    }
}

/// Flood a single seed and report how the flood ended.
///
/// The seed absorbs itself first, so an isolated pit is `Enclosed(1)`.
/// Cells with elevation exactly at the flood level are absorbed.
pub fn flood_region(
    grid: &TerrainGrid,
    x: usize,
    y: usize,
    flood_depth: f64,
    max_size: usize,
) -> Result<FloodOutcome> {
    validate_depth(flood_depth)?;
    if x >= grid.width() || y >= grid.height() {
        return Err(Error::IndexOutOfBounds {
            x,
            y,
            width: grid.width(),
            height: grid.height(),
        });
    }
    if max_size == 0 {
        return Ok(FloodOutcome::ReachedCap);
    }
    Ok(FloodRegion::new().grow(grid.elevation(), x, y, flood_depth, max_size))
}

/// Cave detection algorithm
#[derive(Debug, Clone, Default)]
pub struct FindCaves;

impl Algorithm for FindCaves {
    type Input = TerrainGrid;
    type Output = Vec<CaveCandidate>;
    type Params = CaveParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Find Caves"
    }

    fn description(&self) -> &'static str {
        "Detect small enclosed depressions by bounded flood fill from every interior cell"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        find_caves(&input, params)
    }
}

/// Detect enclosed depressions using a default worker pool.
///
/// See [`find_caves_with`].
pub fn find_caves(grid: &TerrainGrid, params: CaveParams) -> Result<Vec<CaveCandidate>> {
    let scheduler = RowScheduler::new(ProcessingMode::default())?;
    find_caves_with(grid, params, &scheduler)
}

/// Detect enclosed depressions, one scheduler task per grid row.
///
/// Seeds are all cells off the outer ring. Each row collects its own
/// candidates and the lists are concatenated after the join, so the
/// result order carries no meaning.
///
/// # Arguments
/// * `grid` - Terrain grid to scan
/// * `params` - Flood depth and region size limits
/// * `scheduler` - Worker pool the rows run on
///
/// # Returns
/// One candidate per seed whose flood stayed enclosed and exceeded `min_size`
pub fn find_caves_with(
    grid: &TerrainGrid,
    params: CaveParams,
    scheduler: &RowScheduler,
) -> Result<Vec<CaveCandidate>> {
    params.validate()?;

    let (width, height) = (grid.width(), grid.height());
    if width < 3 || height < 3 {
        return Ok(Vec::new());
    }

    let elevation = grid.elevation();
    let params = &params;

    let per_row = scheduler.map_rows(1..height - 1, |y| {
        let mut region = FloodRegion::new();
        let mut found = Vec::new();

        for x in 1..width - 1 {
            let outcome = region.grow(elevation, x, y, params.flood_depth, params.max_size);
            if let FloodOutcome::Enclosed(size) = outcome {
                if size > params.min_size {
                    found.push(CaveCandidate {
                        x: x as f64,
                        y: y as f64,
                        z: elevation.at(x, y),
                    });
                }
            }
        }

        Ok(found)
    })?;

    Ok(per_row.into_iter().flatten().collect())
}
