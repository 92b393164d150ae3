//! Neighborhood enumeration for raster analysis
//!
//! Region-growing and steepest-descent passes all need "the cells around
//! this one". [`Window`] yields them without allocating, clipped to the
//! grid and always in row-major order, so passes that keep the first of
//! several equal candidates are reproducible.

/// A cell position produced by a neighborhood walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
    /// Row-major index, `y * width + x`
    pub index: usize,
}

/// Iterator over the square window of cells centred on `(x, y)`.
///
/// The window spans `radius` cells in each direction, is clipped to
/// `[0, width) x [0, height)` and includes the centre cell itself.
/// Out-of-bounds positions are skipped, never reported.
#[derive(Debug, Clone)]
pub struct Window {
    width: usize,
    x_start: usize,
    x_end: usize,
    y_end: usize,
    x: usize,
    y: usize,
}

impl Window {
    /// Window of the given radius around `(x, y)`.
    ///
    /// `(x, y)` must lie inside the grid.
    pub fn new(width: usize, height: usize, x: usize, y: usize, radius: usize) -> Self {
        debug_assert!(x < width && y < height, "window centre outside grid");
        let x_start = x.saturating_sub(radius);
        let y_start = y.saturating_sub(radius);
        Self {
            width,
            x_start,
            x_end: (x + radius).min(width - 1),
            y_end: (y + radius).min(height - 1),
            x: x_start,
            y: y_start,
        }
    }

    fn remaining(&self) -> usize {
        if self.y > self.y_end {
            return 0;
        }
        let row_len = self.x_end - self.x_start + 1;
        (self.x_end - self.x + 1) + (self.y_end - self.y) * row_len
    }
}

impl Iterator for Window {
    type Item = Cell;

    #[inline]
    fn next(&mut self) -> Option<Cell> {
        if self.y > self.y_end {
            return None;
        }

        let cell = Cell {
            x: self.x,
            y: self.y,
            index: self.y * self.width + self.x,
        };

        if self.x == self.x_end {
            self.x = self.x_start;
            self.y += 1;
        } else {
            self.x += 1;
        }

        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Window {}

/// The 8-connected neighborhood of `(x, y)` plus the cell itself
#[inline]
pub fn queen(width: usize, height: usize, x: usize, y: usize) -> Window {
    Window::new(width, height, x, y, 1)
}
