//! Height-based line of sight.
//!
//! Every hex within the radius is tested on its own: walk the hex line from
//! the origin to the target and check each hex strictly in between against
//! the straight sight line running from the observer's eye to the target's
//! top. The comparison is exact integer arithmetic.

use hexnav_core::{Axial, Board, BoardSize, HexCoord};

/// Heights the field of view looks at.
pub trait HeightMap {
    /// Extents of the map.
    fn size(&self) -> BoardSize;

    /// Height of the ground at `c`, or `None` if `c` is not on the map.
    fn ground_height(&self, c: HexCoord) -> Option<i32>;

    /// Height of the top of whatever stands on `c`, or `None` if `c` is not
    /// on the map. A hex without a known top blocks sight.
    fn top_height(&self, c: HexCoord) -> Option<i32>;
}

impl HeightMap for Board {
    fn size(&self) -> BoardSize {
        Board::size(self)
    }

    fn ground_height(&self, c: HexCoord) -> Option<i32> {
        self.get(c).map(|h| h.elevation())
    }

    fn top_height(&self, c: HexCoord) -> Option<i32> {
        self.get(c).map(|h| h.top_height())
    }
}

impl<M: HeightMap + ?Sized> HeightMap for &M {
    fn size(&self) -> BoardSize {
        (**self).size()
    }

    fn ground_height(&self, c: HexCoord) -> Option<i32> {
        (**self).ground_height(c)
    }

    fn top_height(&self, c: HexCoord) -> Option<i32> {
        (**self).top_height(c)
    }
}

/// Eye and target heights above the ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FovConfig {
    /// Height of the observer's eye above the origin's ground.
    pub observer_height: i32,
    /// Height above a target's ground that must be seen.
    pub target_height: i32,
}

impl Default for FovConfig {
    fn default() -> Self {
        Self {
            observer_height: 1,
            target_height: 1,
        }
    }
}

impl FovConfig {
    pub fn with_observer_height(mut self, height: i32) -> Self {
        self.observer_height = height;
        self
    }

    pub fn with_target_height(mut self, height: i32) -> Self {
        self.target_height = height;
        self
    }
}

/// Field of view computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fov {
    config: FovConfig,
}

impl Fov {
    pub fn new(config: FovConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> FovConfig {
        self.config
    }

    /// Every hex on `map` within `radius` of `origin` that the observer can
    /// see. The origin sees itself; an origin off the map sees nothing.
    ///
    /// `radius` is clamped to `0..=cols + rows`, which covers the whole map.
    pub fn compute<M: HeightMap>(&self, map: &M, origin: HexCoord, radius: i32) -> VisibilitySet {
        let size = map.size();
        let radius = radius.clamp(0, size.cols.saturating_add(size.rows).max(0));
        let mut set = VisibilitySet::new(origin, radius);
        let Some(ground) = map.ground_height(origin) else {
            return set;
        };
        let eye = ground + self.config.observer_height;
        for target in origin.within(radius) {
            if size.contains(target) && self.sees(map, origin, eye, target) {
                set.insert(target);
            }
        }
        log::trace!(
            "fov from {origin} radius {radius}: {} hexes visible",
            set.len()
        );
        set
    }

    /// Whether the line from `origin` (eye at `eye`) to `target` is clear.
    fn sees<M: HeightMap>(&self, map: &M, origin: HexCoord, eye: i32, target: HexCoord) -> bool {
        let Some(ground) = map.ground_height(target) else {
            return false;
        };
        let aim = ground + self.config.target_height;
        let line = origin.line_to(target);
        let n = (line.len() - 1) as i64;
        let (eye, aim) = (eye as i64, aim as i64);
        let between = line.get(1..line.len() - 1).unwrap_or(&[]);
        between
            .iter()
            .enumerate()
            .all(|(k, &c)| {
                let i = k as i64 + 1;
                match map.top_height(c) {
                    Some(top) => (top as i64) * n <= eye * n + (aim - eye) * i,
                    None => false,
                }
            })
    }
}

/// The hexes seen from one origin.
///
/// Backed by a bitmap over the square of axial offsets that contains the
/// query's disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilitySet {
    origin: HexCoord,
    radius: i32,
    bits: Vec<u64>,
    len: usize,
}

impl VisibilitySet {
    fn new(origin: HexCoord, radius: i32) -> Self {
        let side = (2 * radius + 1) as usize;
        Self {
            origin,
            radius,
            bits: vec![0; (side * side).div_ceil(64)],
            len: 0,
        }
    }

    fn slot(&self, c: HexCoord) -> Option<usize> {
        let d: Axial = c.axial() - self.origin.axial();
        if self.origin.range(c) > self.radius {
            return None;
        }
        let side = 2 * self.radius + 1;
        Some(((d.q + self.radius) * side + (d.r + self.radius)) as usize)
    }

    fn insert(&mut self, c: HexCoord) {
        if let Some(i) = self.slot(c) {
            let (word, bit) = (i / 64, 1u64 << (i % 64));
            if self.bits[word] & bit == 0 {
                self.bits[word] |= bit;
                self.len += 1;
            }
        }
    }

    #[inline]
    pub fn origin(&self) -> HexCoord {
        self.origin
    }

    #[inline]
    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Whether `c` was seen.
    pub fn is_visible(&self, c: HexCoord) -> bool {
        self.slot(c)
            .is_some_and(|i| self.bits[i / 64] & (1u64 << (i % 64)) != 0)
    }

    /// Number of visible hexes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Visible hexes, ordered by axial `q` then `r`.
    pub fn iter(&self) -> impl Iterator<Item = HexCoord> + '_ {
        self.origin
            .within(self.radius)
            .filter(|&c| self.is_visible(c))
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn fov_config_round_trip() {
        let config = FovConfig {
            observer_height: 3,
            target_height: 0,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: FovConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
        let partial: FovConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(partial, FovConfig::default());
    }
}
