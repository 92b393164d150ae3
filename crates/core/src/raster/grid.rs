//! Generic dense layer type

use crate::error::{Error, Result};
use crate::raster::RasterElement;
use ndarray::Array2;

/// A dense 2D layer of cell values.
///
/// Cells are stored row-major with row 0 at the top. Index `i` maps to
/// `(x = i % width, y = i / width)`; accessors take `(x, y)` in that order.
///
/// # Example
///
/// ```ignore
/// use cavescan_core::Raster;
///
/// let mut layer: Raster<f64> = Raster::new(100, 50);
/// layer.set(10, 20, 42.0)?;
/// assert_eq!(layer.get(10, 20)?, 42.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T: RasterElement> {
    /// Shape is (height, width)
    data: Array2<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new layer filled with zeros
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: Array2::zeros((height, width)),
        }
    }

    /// Create a new layer filled with a specific value
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            data: Array2::from_elem((height, width), value),
        }
    }

    /// Create a layer from row-major data
    pub fn from_vec(data: Vec<T>, width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        if data.len() != width * height {
            return Err(Error::SizeMismatch {
                layer: "raster",
                expected: width * height,
                actual: data.len(),
            });
        }

        let array = Array2::from_shape_vec((height, width), data)
            .map_err(|e| Error::Format(e.to_string()))?;

        Ok(Self { data: array })
    }

    /// Create a layer from an ndarray shaped (height, width)
    pub fn from_array(data: Array2<T>) -> Self {
        Self { data }
    }

    // Dimensions

    /// Number of columns
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the layer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major index of `(x, y)`
    #[inline]
    pub fn index_of(&self, x: usize, y: usize) -> usize {
        y * self.width() + x
    }

    /// Whether `(x, y)` lies on the outermost ring of cells
    #[inline]
    pub fn is_border(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 == self.width() || y + 1 == self.height()
    }

    // Data access

    /// Get value at (x, y)
    pub fn get(&self, x: usize, y: usize) -> Result<T> {
        self.data
            .get((y, x))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            })
    }

    /// Set value at (x, y)
    pub fn set(&mut self, x: usize, y: usize, value: T) -> Result<()> {
        match self.data.get_mut((y, x)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(Error::IndexOutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            }),
        }
    }

    /// Value at (x, y); panics when out of bounds.
    ///
    /// Algorithms call this only with coordinates produced by the
    /// neighborhood enumerators, which never leave the grid.
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> T {
        self.data[(y, x)]
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Iterate over values in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    // Statistics

    /// Calculate basic statistics over cells that carry data
    pub fn statistics(&self) -> RasterStatistics<T> {
        let mut min: Option<T> = None;
        let mut max: Option<T> = None;
        let mut sum: f64 = 0.0;
        let mut count: usize = 0;

        for &value in self.data.iter() {
            if !value.has_data() {
                continue;
            }

            if min.map_or(true, |m| value < m) {
                min = Some(value);
            }
            if max.map_or(true, |m| value > m) {
                max = Some(value);
            }

            if let Some(v) = value.to_f64() {
                sum += v;
                count += 1;
            }
        }

        let mean = if count > 0 {
            Some(sum / count as f64)
        } else {
            None
        };

        RasterStatistics {
            min,
            max,
            mean,
            valid_count: count,
            nodata_count: self.len() - count,
        }
    }
}

/// Basic statistics for a layer
#[derive(Debug, Clone)]
pub struct RasterStatistics<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub mean: Option<f64>,
    pub valid_count: usize,
    pub nodata_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_creation() {
        let raster: Raster<f64> = Raster::new(200, 100);
        assert_eq!(raster.width(), 200);
        assert_eq!(raster.height(), 100);
        assert_eq!(raster.len(), 20_000);
    }

    #[test]
    fn test_xy_order() {
        let raster = Raster::from_vec((0..6).map(|v| v as f64).collect(), 3, 2).unwrap();
        // index i maps to (i % width, i / width)
        assert_eq!(raster.get(2, 0).unwrap(), 2.0);
        assert_eq!(raster.get(0, 1).unwrap(), 3.0);
        assert_eq!(raster.index_of(1, 1), 4);
        assert!(raster.get(3, 0).is_err());
    }

    #[test]
    fn test_from_vec_rejects_bad_shapes() {
        assert!(matches!(
            Raster::<f64>::from_vec(vec![], 0, 4),
            Err(Error::InvalidDimensions { width: 0, height: 4 })
        ));
        assert!(matches!(
            Raster::<f64>::from_vec(vec![1.0; 5], 2, 3),
            Err(Error::SizeMismatch { expected: 6, actual: 5, .. })
        ));
    }

    #[test]
    fn test_border() {
        let raster: Raster<u8> = Raster::new(4, 3);
        assert!(raster.is_border(0, 1));
        assert!(raster.is_border(3, 1));
        assert!(raster.is_border(1, 2));
        assert!(!raster.is_border(1, 1));
    }

    #[test]
    fn test_raster_statistics_skip_no_data() {
        let mut raster: Raster<f64> = Raster::new(10, 10);
        for y in 0..10 {
            for x in 1..10 {
                raster.set(x, y, (y * 10 + x) as f64).unwrap();
            }
        }

        let stats = raster.statistics();
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.max, Some(99.0));
        assert_eq!(stats.valid_count, 90);
        assert_eq!(stats.nodata_count, 10);
    }
}
