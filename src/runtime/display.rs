//! Monochrome pixel display

use super::shape::Shape;
use std::fmt;

/// A `height` x `width` grid of on/off pixels, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Display {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Display {
    /// A cleared display
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Switch every pixel off
    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    /// `false` outside the display
    pub fn is_on(&self, row: usize, column: usize) -> bool {
        row < self.height && column < self.width && self.cells[row * self.width + column]
    }

    pub fn set(&mut self, row: usize, column: usize, on: bool) {
        if row < self.height && column < self.width {
            self.cells[row * self.width + column] = on;
        }
    }

    /// Rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.chunks(self.width.max(1)).take(self.height)
    }

    pub fn lit_count(&self) -> usize {
        self.cells.iter().filter(|on| **on).count()
    }

    /// Draw `shape` with its top-left corner at column `x`, row `y`
    ///
    /// Transparent cells and cells falling outside the display are skipped, every other cell
    /// overwrites the pixel below it.
    pub fn overlay(&mut self, shape: &Shape, x: i64, y: i64) {
        for (dy, row) in shape.rows().iter().enumerate() {
            let Some(target_row) = offset(y, dy, self.height) else {
                continue;
            };
            for (dx, pixel) in row.iter().enumerate() {
                if !pixel.is_opaque() {
                    continue;
                }
                if let Some(target_column) = offset(x, dx, self.width) {
                    self.cells[target_row * self.width + target_column] = true;
                }
            }
        }
    }

    /// Text rendering, `#` for on and `.` for off, one line per row
    pub fn render(&self) -> String {
        self.to_string()
    }
}

/// `origin + delta` when it lands inside `0..limit`
fn offset(origin: i64, delta: usize, limit: usize) -> Option<usize> {
    let delta = i64::try_from(delta).ok()?;
    let position = origin.checked_add(delta)?;
    usize::try_from(position).ok().filter(|p| *p < limit)
}

impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for on in row {
                f.write_str(if *on { "#" } else { "." })?;
            }
        }
        Ok(())
    }
}
