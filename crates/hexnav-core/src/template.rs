//! Boards described as ASCII art.
//!
//! A [`BoardTemplate`] holds one character per hex, laid out in offset
//! coordinates: line `row`, character `col`. A [`Legend`] maps each
//! character to a terrain tag and elevation, and a
//! [`TerrainTable`](crate::TerrainTable) turns those into hexes.
//!
//! ```
//! use hexnav_core::{BoardTemplate, Legend, StorageKind, TerrainSpec, TerrainTable, TerrainTag};
//!
//! let table = TerrainTable::new()
//!     .with(TerrainTag(0), TerrainSpec::passable(1, 0))
//!     .with(TerrainTag(1), TerrainSpec::impassable(5));
//! let legend = Legend::new().with('.', TerrainTag(0), 0).with('#', TerrainTag(1), 0);
//!
//! let template = BoardTemplate::parse("...\n.#.\n...").unwrap();
//! let board = template.build(&legend, &table, StorageKind::Flat).unwrap();
//! assert_eq!(board.size().cols, 3);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::board::Board;
use crate::error::TemplateError;
use crate::geom::{BoardSize, HexCoord, Offset};
use crate::hex::{Hex, TerrainSpec, TerrainTable, TerrainTag};
use crate::storage::StorageKind;

/// What a template character stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LegendEntry {
    pub terrain: TerrainTag,
    pub elevation: i32,
}

/// Mapping from template characters to terrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Legend {
    entries: BTreeMap<char, LegendEntry>,
}

impl Legend {
    /// Create an empty legend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the meaning of `ch` (builder).
    pub fn with(mut self, ch: char, terrain: TerrainTag, elevation: i32) -> Self {
        self.entries.insert(ch, LegendEntry { terrain, elevation });
        self
    }

    /// Meaning of `ch`, if any.
    pub fn get(&self, ch: char) -> Option<LegendEntry> {
        self.entries.get(&ch).copied()
    }
}

/// A rectangular block of characters, one per hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardTemplate {
    runes: Vec<char>,
    size: BoardSize,
}

impl BoardTemplate {
    /// Parse a template.
    ///
    /// Leading and trailing whitespace of the whole string is trimmed, but
    /// not of individual lines. Every line must be as wide as the first.
    pub fn parse(s: &str) -> Result<Self, TemplateError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TemplateError::Empty);
        }
        let mut runes = Vec::with_capacity(s.len());
        let mut expected = -1;
        let mut rows = 0;
        for (row, line) in s.lines().enumerate() {
            let before = runes.len();
            runes.extend(line.chars());
            let width = (runes.len() - before) as i32;
            if expected < 0 {
                expected = width;
            } else if width != expected {
                return Err(TemplateError::Ragged {
                    row: row as i32,
                    width,
                    expected,
                });
            }
            rows += 1;
        }
        Ok(Self {
            runes,
            size: BoardSize::new(expected, rows),
        })
    }

    /// Template extents.
    pub fn size(&self) -> BoardSize {
        self.size
    }

    /// Character at `coord`, if on the template.
    pub fn rune_at(&self, coord: HexCoord) -> Option<char> {
        self.size.index(coord).map(|i| self.runes[i])
    }

    /// Build a board from the template.
    ///
    /// Every character must appear in `legend`, and every terrain the
    /// legend uses must appear in `table`.
    pub fn build(
        &self,
        legend: &Legend,
        table: &TerrainTable,
        kind: StorageKind,
    ) -> Result<Board, TemplateError> {
        let mut cells: Vec<(LegendEntry, TerrainSpec)> = Vec::with_capacity(self.runes.len());
        for (i, &ch) in self.runes.iter().enumerate() {
            let Some(entry) = legend.get(ch) else {
                let c = self.size.coord(i);
                return Err(TemplateError::UnknownRune {
                    ch,
                    at: Offset::new(c.col(), c.row()),
                });
            };
            let spec = table
                .get(entry.terrain)
                .ok_or(TemplateError::UnknownTerrain { ch })?;
            cells.push((entry, spec));
        }
        let cells: Arc<[(LegendEntry, TerrainSpec)]> = cells.into();
        let cols = self.size.cols as usize;
        let board = Board::with_storage(self.size, kind, move |c| {
            let (entry, spec) = cells[c.row() as usize * cols + c.col() as usize];
            Hex::new(c, entry.terrain, entry.elevation, spec.height, spec.cost)
        })?;
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Hexside;

    const CLEAR: TerrainTag = TerrainTag(0);
    const HILL: TerrainTag = TerrainTag(1);
    const LAKE: TerrainTag = TerrainTag(2);

    fn table() -> TerrainTable {
        TerrainTable::new()
            .with(CLEAR, TerrainSpec::passable(1, 0))
            .with(HILL, TerrainSpec::passable(3, 0))
            .with(LAKE, TerrainSpec::impassable(0))
    }

    fn legend() -> Legend {
        Legend::new()
            .with('.', CLEAR, 0)
            .with('^', HILL, 2)
            .with('~', LAKE, 0)
    }

    const MAP: &str = "
....
.^~.
....
";

    #[test]
    fn parse_size_and_runes() {
        let t = BoardTemplate::parse(MAP).unwrap();
        assert_eq!(t.size(), BoardSize::new(4, 3));
        assert_eq!(t.rune_at(HexCoord::from_offset(1, 1)), Some('^'));
        assert_eq!(t.rune_at(HexCoord::from_offset(2, 1)), Some('~'));
        assert_eq!(t.rune_at(HexCoord::from_offset(4, 1)), None);
    }

    #[test]
    fn build_applies_legend_and_table() {
        let board = BoardTemplate::parse(MAP)
            .unwrap()
            .build(&legend(), &table(), StorageKind::Flat)
            .unwrap();
        let hill = board.get(HexCoord::from_offset(1, 1)).unwrap();
        assert_eq!(hill.terrain(), HILL);
        assert_eq!(hill.elevation(), 2);
        assert_eq!(hill.step_cost(Hexside::S), Some(3));
        let lake = board.get(HexCoord::from_offset(2, 1)).unwrap();
        assert!(!lake.is_passable());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = BoardTemplate::parse("...\n..\n...").unwrap_err();
        assert_eq!(
            err,
            TemplateError::Ragged {
                row: 1,
                width: 2,
                expected: 3
            }
        );
        assert_eq!(BoardTemplate::parse("  \n ").unwrap_err(), TemplateError::Empty);
    }

    #[test]
    fn unknown_runes_and_terrain_are_rejected() {
        let t = BoardTemplate::parse("..\n.x").unwrap();
        let err = t.build(&legend(), &table(), StorageKind::Flat).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnknownRune {
                ch: 'x',
                at: Offset::new(1, 1)
            }
        );

        let legend = legend().with('x', TerrainTag(42), 0);
        let err = t.build(&legend, &table(), StorageKind::Flat).unwrap_err();
        assert_eq!(err, TemplateError::UnknownTerrain { ch: 'x' });
        assert!(err.to_string().contains('x'));
    }
}
