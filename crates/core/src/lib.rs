//! # cavescan core
//!
//! Core types shared by the cavescan terrain passes.
//!
//! This crate provides:
//! - `TerrainGrid`: elevation, classification and color layers of a LIDAR-derived surface
//! - `Raster<T>`: a dense single layer (scores, counts, filtered elevations)
//! - Neighborhood enumeration used by region-growing and descent passes
//! - The error taxonomy shared by every pass
//! - ASCII grid I/O for moving grids in and out of the tools

pub mod error;
pub mod io;
pub mod raster;

pub use error::{Error, Result, RowFailure};
pub use raster::{GridMetadata, Raster, RasterElement, Rgb, TerrainGrid};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result, RowFailure};
    pub use crate::raster::{GridMetadata, Raster, RasterElement, Rgb, TerrainGrid};
    pub use crate::Algorithm;
}

/// Core trait for all terrain passes.
///
/// Passes are pure functions of their input grid and parameters; none of
/// them mutate the input.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
