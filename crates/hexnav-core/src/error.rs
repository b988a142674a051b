//! Error types for board construction.

use std::fmt;

use crate::geom::Offset;

/// Errors arising from building a [`Board`](crate::Board).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// A board must have at least one hex.
    Empty { cols: i32, rows: i32 },
    /// One of the extents exceeds [`Board::MAX_DIM`](crate::Board::MAX_DIM).
    TooLarge { cols: i32, rows: i32, max: i32 },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { cols, rows } => {
                write!(f, "board must have at least one hex, got {cols}x{rows}")
            }
            Self::TooLarge { cols, rows, max } => {
                write!(f, "board {cols}x{rows} exceeds the {max} hex limit per side")
            }
        }
    }
}

impl std::error::Error for BoardError {}

/// Errors arising from parsing a [`BoardTemplate`](crate::BoardTemplate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The template has no rows.
    Empty,
    /// A row is not as wide as the first one.
    Ragged { row: i32, width: i32, expected: i32 },
    /// A character has no legend entry.
    UnknownRune { ch: char, at: Offset },
    /// A legend entry names a terrain tag missing from the terrain table.
    UnknownTerrain { ch: char },
    /// The parsed extents were rejected.
    Board(BoardError),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("board template is empty"),
            Self::Ragged {
                row,
                width,
                expected,
            } => write!(
                f,
                "board template row {row} is {width} hexes wide, expected {expected}"
            ),
            Self::UnknownRune { ch, at } => {
                write!(f, "board template has unknown rune \u{201c}{ch}\u{201d} at {at}")
            }
            Self::UnknownTerrain { ch } => {
                write!(f, "legend rune \u{201c}{ch}\u{201d} maps to a terrain missing from the table")
            }
            Self::Board(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for TemplateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Board(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BoardError> for TemplateError {
    fn from(e: BoardError) -> Self {
        Self::Board(e)
    }
}
