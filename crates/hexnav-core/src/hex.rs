//! The [`Hex`] record and the terrain table that builds it.
//!
//! A hex is plain data: elevation, a terrain tag, the terrain's own height,
//! and six exit-indexed step costs. Terrain variety lives in a
//! [`TerrainTable`] mapping tags to [`TerrainSpec`]s rather than in types.

use std::collections::BTreeMap;

use crate::geom::{HexCoord, Hexside};

/// Movement cost of a single step. Always strictly positive.
pub type Cost = i32;

/// A terrain type tag, wrapping a `u16`.
///
/// What each value means (clear, woods, water...) is up to the caller's
/// [`TerrainTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerrainTag(pub u16);

impl TerrainTag {
    /// Create a new tag.
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Get the underlying value.
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl From<u16> for TerrainTag {
    fn from(v: u16) -> Self {
        Self(v)
    }
}

/// Height and movement cost of one terrain type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerrainSpec {
    /// Height of the terrain above the hex's elevation (trees, buildings).
    pub height: i32,
    /// Cost of leaving a hex of this terrain, `None` if it cannot be left.
    pub cost: Option<Cost>,
}

impl TerrainSpec {
    /// Passable terrain.
    pub const fn passable(cost: Cost, height: i32) -> Self {
        Self {
            height,
            cost: Some(cost),
        }
    }

    /// Terrain that cannot be left through any side.
    pub const fn impassable(height: i32) -> Self {
        Self { height, cost: None }
    }
}

/// Lookup table from [`TerrainTag`] to [`TerrainSpec`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerrainTable {
    specs: BTreeMap<TerrainTag, TerrainSpec>,
}

impl TerrainTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry (builder).
    pub fn with(mut self, tag: TerrainTag, spec: TerrainSpec) -> Self {
        self.insert(tag, spec);
        self
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, tag: TerrainTag, spec: TerrainSpec) {
        if let Some(cost) = spec.cost {
            check_cost(cost);
        }
        self.specs.insert(tag, spec);
    }

    /// Spec for `tag`, if known.
    pub fn get(&self, tag: TerrainTag) -> Option<TerrainSpec> {
        self.specs.get(&tag).copied()
    }

    /// Whether the table has an entry for `tag`.
    pub fn contains(&self, tag: TerrainTag) -> bool {
        self.specs.contains_key(&tag)
    }

    /// Build the hex at `coord` with terrain `tag` at `elevation`, using the
    /// terrain's cost on every side. Returns `None` for an unknown tag.
    pub fn hex(&self, coord: HexCoord, tag: TerrainTag, elevation: i32) -> Option<Hex> {
        let spec = self.get(tag)?;
        Some(Hex::new(coord, tag, elevation, spec.height, spec.cost))
    }
}

/// Per-hex terrain facts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hex {
    coord: HexCoord,
    elevation: i32,
    terrain: TerrainTag,
    terrain_height: i32,
    exit_costs: [Option<Cost>; 6],
}

impl Hex {
    /// Create a hex whose every side costs `exit_cost` to leave through.
    ///
    /// # Panics
    ///
    /// Panics if `exit_cost` is `Some` non-positive value.
    pub fn new(
        coord: HexCoord,
        terrain: TerrainTag,
        elevation: i32,
        terrain_height: i32,
        exit_cost: Option<Cost>,
    ) -> Self {
        if let Some(cost) = exit_cost {
            check_cost(cost);
        }
        Self {
            coord,
            elevation,
            terrain,
            terrain_height,
            exit_costs: [exit_cost; 6],
        }
    }

    /// Flat ground with the same cost on every side.
    pub fn uniform(coord: HexCoord, cost: Cost) -> Self {
        Self::new(coord, TerrainTag::default(), 0, 0, Some(cost))
    }

    /// Flat ground that cannot be left through any side.
    pub fn impassable(coord: HexCoord) -> Self {
        Self::new(coord, TerrainTag::default(), 0, 0, None)
    }

    /// Override the cost of leaving through `side` (builder).
    ///
    /// # Panics
    ///
    /// Panics if `cost` is `Some` non-positive value.
    pub fn with_exit_cost(mut self, side: Hexside, cost: Option<Cost>) -> Self {
        if let Some(c) = cost {
            check_cost(c);
        }
        self.exit_costs[side.index()] = cost;
        self
    }

    /// Set the elevation (builder).
    pub fn with_elevation(mut self, elevation: i32) -> Self {
        self.elevation = elevation;
        self
    }

    /// Set the terrain height (builder).
    pub fn with_terrain_height(mut self, height: i32) -> Self {
        self.terrain_height = height;
        self
    }

    /// Position of this hex.
    #[inline]
    pub fn coord(&self) -> HexCoord {
        self.coord
    }

    /// Ground elevation.
    #[inline]
    pub fn elevation(&self) -> i32 {
        self.elevation
    }

    /// Terrain type.
    #[inline]
    pub fn terrain(&self) -> TerrainTag {
        self.terrain
    }

    /// Height of the terrain above the ground.
    #[inline]
    pub fn terrain_height(&self) -> i32 {
        self.terrain_height
    }

    /// Highest point of the hex: ground plus terrain.
    #[inline]
    pub fn top_height(&self) -> i32 {
        self.elevation + self.terrain_height
    }

    /// Cost of leaving this hex through `exit`, or `None` if that side is
    /// impassable.
    #[inline]
    pub fn step_cost(&self, exit: Hexside) -> Option<Cost> {
        self.exit_costs[exit.index()]
    }

    /// Whether at least one side can be left through.
    pub fn is_passable(&self) -> bool {
        self.exit_costs.iter().any(Option::is_some)
    }
}

fn check_cost(cost: Cost) {
    assert!(cost > 0, "step cost must be positive, got {cost}");
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAR: TerrainTag = TerrainTag(0);
    const WOODS: TerrainTag = TerrainTag(1);
    const WATER: TerrainTag = TerrainTag(2);

    fn table() -> TerrainTable {
        TerrainTable::new()
            .with(CLEAR, TerrainSpec::passable(1, 0))
            .with(WOODS, TerrainSpec::passable(2, 3))
            .with(WATER, TerrainSpec::impassable(0))
    }

    #[test]
    fn table_builds_hexes() {
        let t = table();
        let c = HexCoord::from_offset(2, 3);
        let woods = t.hex(c, WOODS, 5).unwrap();
        assert_eq!(woods.coord(), c);
        assert_eq!(woods.terrain(), WOODS);
        assert_eq!(woods.elevation(), 5);
        assert_eq!(woods.top_height(), 8);
        for side in Hexside::ALL {
            assert_eq!(woods.step_cost(side), Some(2));
        }
        let water = t.hex(c, WATER, 0).unwrap();
        assert!(!water.is_passable());
        assert!(t.hex(c, TerrainTag(9), 0).is_none());
    }

    #[test]
    fn exit_cost_override_is_per_side() {
        let h = Hex::uniform(HexCoord::from_offset(0, 0), 1)
            .with_exit_cost(Hexside::N, Some(4))
            .with_exit_cost(Hexside::S, None);
        assert_eq!(h.step_cost(Hexside::N), Some(4));
        assert_eq!(h.step_cost(Hexside::S), None);
        assert_eq!(h.step_cost(Hexside::NE), Some(1));
        assert!(h.is_passable());
    }

    #[test]
    #[should_panic(expected = "step cost must be positive")]
    fn zero_cost_is_rejected() {
        let _ = Hex::uniform(HexCoord::from_offset(0, 0), 0);
    }

    #[test]
    #[should_panic(expected = "step cost must be positive")]
    fn negative_table_cost_is_rejected() {
        let _ = TerrainTable::new().with(CLEAR, TerrainSpec::passable(-1, 0));
    }
}
