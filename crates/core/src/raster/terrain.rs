//! Terrain grid: elevation plus per-cell classification and color

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::raster::{GridMetadata, Raster};

/// Classification code for ground returns
pub const GROUND: u8 = 2;

/// Per-cell color sampled from the point cloud
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

/// A rasterized elevation surface derived from a LIDAR point cloud.
///
/// All layers share the same `width * height` shape; this is checked
/// when the grid is built and preserved by every constructor. An
/// elevation of `0.0` marks a cell no return landed in, and
/// classification `0` means the same for the land-cover layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainGrid {
    elevation: Raster<f64>,
    classification: Raster<u8>,
    color: Option<Vec<Option<Rgb>>>,
    metadata: GridMetadata,
}

impl TerrainGrid {
    /// Build a grid from row-major elevation and classification layers
    pub fn new(
        width: usize,
        height: usize,
        elevation: Vec<f64>,
        classification: Vec<u8>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        check_len("elevation", width * height, elevation.len())?;
        check_len("classification", width * height, classification.len())?;

        Ok(Self {
            elevation: Raster::from_vec(elevation, width, height)?,
            classification: Raster::from_vec(classification, width, height)?,
            color: None,
            metadata: GridMetadata::default(),
        })
    }

    /// Build a grid from elevations alone; cells with data are classed as ground
    pub fn from_elevation(width: usize, height: usize, elevation: Vec<f64>) -> Result<Self> {
        let classification = elevation
            .iter()
            .map(|&z| if z > 0.0 { GROUND } else { 0 })
            .collect();
        Self::new(width, height, elevation, classification)
    }

    /// Build a grid by evaluating `f(x, y)` for every cell
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut elevation = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                elevation.push(f(x, y));
            }
        }
        Self::from_elevation(width, height, elevation)
    }

    /// Attach a color layer
    pub fn with_colors(mut self, colors: Vec<Option<Rgb>>) -> Result<Self> {
        check_len("color", self.len(), colors.len())?;
        self.color = Some(colors);
        Ok(self)
    }

    /// Attach physical metadata
    pub fn with_metadata(mut self, metadata: GridMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// A copy of this grid with its elevation layer replaced.
    ///
    /// Classification, color and metadata are carried over unchanged.
    pub fn with_elevation(&self, elevation: Raster<f64>) -> Result<Self> {
        if elevation.width() != self.width() || elevation.height() != self.height() {
            return Err(Error::SizeMismatch {
                layer: "elevation",
                expected: self.len(),
                actual: elevation.len(),
            });
        }
        Ok(Self {
            elevation,
            classification: self.classification.clone(),
            color: self.color.clone(),
            metadata: self.metadata.clone(),
        })
    }

    /// Assemble a grid from separate layers, checking that their shapes agree
    pub fn from_layers(
        elevation: Raster<f64>,
        classification: Raster<u8>,
        color: Option<Vec<Option<Rgb>>>,
        metadata: GridMetadata,
    ) -> Result<Self> {
        if elevation.width() != classification.width()
            || elevation.height() != classification.height()
        {
            return Err(Error::SizeMismatch {
                layer: "classification",
                expected: elevation.len(),
                actual: classification.len(),
            });
        }
        if let Some(colors) = &color {
            check_len("color", elevation.len(), colors.len())?;
        }
        Ok(Self {
            elevation,
            classification,
            color,
            metadata,
        })
    }

    /// Split the grid into its layers
    pub fn into_parts(self) -> (Raster<f64>, Raster<u8>, Option<Vec<Option<Rgb>>>, GridMetadata) {
        (self.elevation, self.classification, self.color, self.metadata)
    }

    // Dimensions

    /// Number of columns
    pub fn width(&self) -> usize {
        self.elevation.width()
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.elevation.height()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.elevation.len()
    }

    /// Always false; grids have at least one cell
    pub fn is_empty(&self) -> bool {
        self.elevation.is_empty()
    }

    // Layers

    /// Elevation layer
    pub fn elevation(&self) -> &Raster<f64> {
        &self.elevation
    }

    /// Land-cover classification layer
    pub fn classification(&self) -> &Raster<u8> {
        &self.classification
    }

    /// Color layer, if the source carried one
    pub fn colors(&self) -> Option<&[Option<Rgb>]> {
        self.color.as_deref()
    }

    /// Physical metadata
    pub fn metadata(&self) -> &GridMetadata {
        &self.metadata
    }
}

fn check_len(layer: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::SizeMismatch {
            layer,
            expected,
            actual,
        });
    }
    Ok(())
}
