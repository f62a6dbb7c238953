//! Shape bitmaps

use std::fmt;

/// One cell of a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pixel {
    /// `.`, leaves the display untouched
    Transparent,
    /// `+`
    White,
    /// `#`
    Black,
}

impl Pixel {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Pixel::Transparent),
            '+' => Some(Pixel::White),
            '#' => Some(Pixel::Black),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Pixel::Transparent => '.',
            Pixel::White => '+',
            Pixel::Black => '#',
        }
    }

    /// Whether the cell overwrites the display; both colours switch a pixel on
    pub fn is_opaque(self) -> bool {
        !matches!(self, Pixel::Transparent)
    }
}

/// A character that is not a pixel, with its 1-based place inside the shape text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPixel {
    pub character: char,
    pub row: usize,
    pub column: usize,
}

impl fmt::Display for InvalidPixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid pixel {:?} at row {}, column {}",
            self.character, self.row, self.column
        )
    }
}

impl std::error::Error for InvalidPixel {}

/// A grid of pixels; rows may differ in length
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Shape {
    rows: Vec<Vec<Pixel>>,
}

impl Shape {
    pub fn new(rows: Vec<Vec<Pixel>>) -> Self {
        Self { rows }
    }

    /// Parse the body of a shape literal; surrounding blank lines are dropped
    pub fn parse(text: &str) -> Result<Self, InvalidPixel> {
        let rows = text
            .trim()
            .split('\n')
            .enumerate()
            .map(|(row, line)| {
                line.chars()
                    .enumerate()
                    .map(|(column, c)| {
                        Pixel::from_char(c).ok_or(InvalidPixel {
                            character: c,
                            row: row + 1,
                            column: column + 1,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<Pixel>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for pixel in row {
                write!(f, "{}", pixel.as_char())?;
            }
        }
        Ok(())
    }
}
