//! Raster data structures and neighborhoods

mod element;
mod grid;
mod metadata;
pub mod neighborhood;
mod terrain;

pub use element::RasterElement;
pub use grid::{Raster, RasterStatistics};
pub use metadata::GridMetadata;
pub use neighborhood::{queen, Cell, Window};
pub use terrain::{Rgb, TerrainGrid, GROUND};
