//! Integer line rasterization
//!
//! Bresenham-style walk between two cells, used to stamp drainage steps
//! that jump more than one cell at a time.

/// Iterator over the cells of a straight line, both endpoints included.
///
/// Yields exactly `max(|dx|, |dy|) + 1` cells, starting at `from` and
/// ending at `to`. Every cell lies inside the bounding box of the two
/// endpoints, so a line between two in-grid cells never leaves the grid.
#[derive(Debug, Clone)]
pub struct LineCells {
    x: isize,
    y: isize,
    // step taken when the error term overflows
    major: (isize, isize),
    // step taken otherwise
    minor: (isize, isize),
    longest: isize,
    shortest: isize,
    numerator: isize,
    remaining: usize,
}

impl LineCells {
    pub fn new(from: (usize, usize), to: (usize, usize)) -> Self {
        let (x1, y1) = (from.0 as isize, from.1 as isize);
        let w = to.0 as isize - x1;
        let h = to.1 as isize - y1;

        let major = (w.signum(), h.signum());
        let (longest, shortest, minor) = if w.abs() > h.abs() {
            (w.abs(), h.abs(), (w.signum(), 0))
        } else {
            (h.abs(), w.abs(), (0, h.signum()))
        };

        Self {
            x: x1,
            y: y1,
            major,
            minor,
            longest,
            shortest,
            numerator: longest >> 1,
            remaining: longest as usize + 1,
        }
    }
}

impl Iterator for LineCells {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<(usize, usize)> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let cell = (self.x as usize, self.y as usize);

        self.numerator += self.shortest;
        let (dx, dy) = if self.numerator >= self.longest {
            self.numerator -= self.longest;
            self.major
        } else {
            self.minor
        };
        self.x += dx;
        self.y += dy;

        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for LineCells {}
