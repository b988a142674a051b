//! Hex grid geometry: [`Axial`], [`Offset`], [`HexCoord`], [`Hexside`] and
//! [`BoardSize`].
//!
//! Boards are laid out "odd-q": hexes are flat-topped, and odd columns are
//! shoved half a hex down. Callers address hexes with offset `(col, row)`
//! pairs; every distance and neighbour computation runs on axial `(q, r)`
//! coordinates, where `s = -q - r` is the implicit third cube axis.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Sub};

// ---------------------------------------------------------------------------
// Axial
// ---------------------------------------------------------------------------

/// Canonical axial coordinate (or displacement) on the hex lattice.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Axial {
    pub q: i32,
    pub r: i32,
}

impl Axial {
    /// Origin (0, 0).
    pub const ZERO: Self = Self { q: 0, r: 0 };

    /// Create a new axial coordinate.
    #[inline]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The third cube axis.
    #[inline]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    /// Hex distance of this displacement from the origin.
    #[inline]
    pub fn length(self) -> i32 {
        self.q.abs().max(self.r.abs()).max(self.s().abs())
    }
}

impl Add for Axial {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.q + rhs.q, self.r + rhs.r)
    }
}

impl Sub for Axial {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.q - rhs.q, self.r - rhs.r)
    }
}

impl Neg for Axial {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.q, -self.r)
    }
}

impl Mul<i32> for Axial {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: i32) -> Self {
        Self::new(self.q * rhs, self.r * rhs)
    }
}

impl fmt::Display for Axial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.q, self.r)
    }
}

// ---------------------------------------------------------------------------
// Offset
// ---------------------------------------------------------------------------

/// User-facing odd-q offset coordinate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Offset {
    pub col: i32,
    pub row: i32,
}

impl Offset {
    /// Create a new offset coordinate.
    #[inline]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Convert to the canonical axial coordinate.
    #[inline]
    pub const fn to_axial(self) -> Axial {
        // `col - (col & 1)` is even, so the division is exact for negative
        // columns too.
        Axial::new(self.col, self.row - (self.col - (self.col & 1)) / 2)
    }

    /// Convert from a canonical axial coordinate.
    #[inline]
    pub const fn from_axial(a: Axial) -> Self {
        Self::new(a.q, a.r + (a.q - (a.q & 1)) / 2)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

// ---------------------------------------------------------------------------
// Hexside
// ---------------------------------------------------------------------------

/// One of the six edges of a flat-topped hex, clockwise from north.
///
/// The derived ordering follows the enumeration order and is what searches
/// use to break ties deterministically.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Hexside {
    N = 0,
    NE = 1,
    SE = 2,
    S = 3,
    SW = 4,
    NW = 5,
}

impl Hexside {
    /// All six sides in enumeration order.
    pub const ALL: [Hexside; 6] = [
        Hexside::N,
        Hexside::NE,
        Hexside::SE,
        Hexside::S,
        Hexside::SW,
        Hexside::NW,
    ];

    /// Numeric value in `0..6`.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Side with the given numeric value, or `None` if `i >= 6`.
    #[inline]
    pub const fn from_index(i: usize) -> Option<Self> {
        if i < 6 { Some(Self::ALL[i]) } else { None }
    }

    /// The side facing the other way (`value + 3 mod 6`).
    #[inline]
    pub const fn opposite(self) -> Self {
        Self::ALL[(self as usize + 3) % 6]
    }

    /// Next side clockwise.
    #[inline]
    pub const fn clockwise(self) -> Self {
        Self::ALL[(self as usize + 1) % 6]
    }

    /// Next side counter-clockwise.
    #[inline]
    pub const fn counter_clockwise(self) -> Self {
        Self::ALL[(self as usize + 5) % 6]
    }

    /// Axial displacement of the neighbour across this side.
    #[inline]
    pub const fn delta(self) -> Axial {
        match self {
            Hexside::N => Axial::new(0, -1),
            Hexside::NE => Axial::new(1, -1),
            Hexside::SE => Axial::new(1, 0),
            Hexside::S => Axial::new(0, 1),
            Hexside::SW => Axial::new(-1, 1),
            Hexside::NW => Axial::new(-1, 0),
        }
    }
}

impl fmt::Display for Hexside {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Hexside::N => "N",
            Hexside::NE => "NE",
            Hexside::SE => "SE",
            Hexside::S => "S",
            Hexside::SW => "SW",
            Hexside::NW => "NW",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// HexCoord
// ---------------------------------------------------------------------------

/// A hex position, carrying both its canonical axial value and the derived
/// offset value.
///
/// Equality, hashing and ordering only look at the canonical position; the
/// offset is a pure function of it.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "Offset", into = "Offset")
)]
pub struct HexCoord {
    axial: Axial,
    offset: Offset,
}

impl HexCoord {
    /// Hex at user coordinate `(col, row)`.
    #[inline]
    pub const fn from_offset(col: i32, row: i32) -> Self {
        let offset = Offset::new(col, row);
        Self {
            axial: offset.to_axial(),
            offset,
        }
    }

    /// Hex at canonical coordinate `(q, r)`.
    #[inline]
    pub const fn from_canonical(q: i32, r: i32) -> Self {
        Self::from_axial(Axial::new(q, r))
    }

    /// Hex at the given axial position.
    #[inline]
    pub const fn from_axial(axial: Axial) -> Self {
        Self {
            axial,
            offset: Offset::from_axial(axial),
        }
    }

    /// Canonical position.
    #[inline]
    pub const fn axial(self) -> Axial {
        self.axial
    }

    /// User-facing position.
    #[inline]
    pub const fn offset(self) -> Offset {
        self.offset
    }

    /// Offset column.
    #[inline]
    pub const fn col(self) -> i32 {
        self.offset.col
    }

    /// Offset row.
    #[inline]
    pub const fn row(self) -> i32 {
        self.offset.row
    }

    /// Hex distance to `other`.
    #[inline]
    pub fn range(self, other: HexCoord) -> i32 {
        (other.axial - self.axial).length()
    }

    /// The adjacent hex across `side`. Not bounds-checked.
    #[inline]
    pub fn neighbor(self, side: Hexside) -> HexCoord {
        Self::from_axial(self.axial + side.delta())
    }

    /// All six neighbours, paired with the side crossed to reach them.
    pub fn neighbors(self) -> [(Hexside, HexCoord); 6] {
        Hexside::ALL.map(|side| (side, self.neighbor(side)))
    }

    /// The side of `self` shared with `other`, if the two are adjacent.
    pub fn side_to(self, other: HexCoord) -> Option<Hexside> {
        let d = other.axial - self.axial;
        Hexside::ALL.into_iter().find(|side| side.delta() == d)
    }

    /// The straight hex line from `self` to `other`, both ends included.
    ///
    /// Samples the cube-space segment at `range + 1` evenly spaced points and
    /// rounds each to the nearest hex. Both endpoints are nudged by the same
    /// tiny offset so that points on a hex edge always round the same way.
    pub fn line_to(self, other: HexCoord) -> Vec<HexCoord> {
        let n = self.range(other);
        if n == 0 {
            return vec![self];
        }
        const NUDGE: (f64, f64, f64) = (1e-6, 1e-6, -2e-6);
        let a = (
            self.axial.q as f64 + NUDGE.0,
            self.axial.r as f64 + NUDGE.1,
            self.axial.s() as f64 + NUDGE.2,
        );
        let b = (
            other.axial.q as f64 + NUDGE.0,
            other.axial.r as f64 + NUDGE.1,
            other.axial.s() as f64 + NUDGE.2,
        );
        let mut line = Vec::with_capacity(n as usize + 1);
        for i in 0..=n {
            let t = i as f64 / n as f64;
            let q = a.0 + (b.0 - a.0) * t;
            let r = a.1 + (b.1 - a.1) * t;
            let s = a.2 + (b.2 - a.2) * t;
            line.push(Self::from_axial(cube_round(q, r, s)));
        }
        line
    }

    /// Every hex within `radius` of `self` (including `self`), ordered by
    /// `q` then `r`. Not bounds-checked.
    pub fn within(self, radius: i32) -> impl Iterator<Item = HexCoord> {
        let center = self.axial;
        let radius = radius.max(0);
        (-radius..=radius).flat_map(move |dq| {
            let lo = (-radius).max(-dq - radius);
            let hi = radius.min(-dq + radius);
            (lo..=hi).map(move |dr| Self::from_axial(center + Axial::new(dq, dr)))
        })
    }
}

fn cube_round(q: f64, r: f64, s: f64) -> Axial {
    let mut rq = q.round();
    let mut rr = r.round();
    let rs = s.round();
    let dq = (rq - q).abs();
    let dr = (rr - r).abs();
    let ds = (rs - s).abs();
    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    }
    Axial::new(rq as i32, rr as i32)
}

impl PartialEq for HexCoord {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.axial == other.axial
    }
}

impl Eq for HexCoord {}

impl Hash for HexCoord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.axial.hash(state);
    }
}

impl PartialOrd for HexCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HexCoord {
    /// Row-major order of the offset position, which is a bijection of the
    /// canonical one.
    fn cmp(&self, other: &Self) -> Ordering {
        self.offset
            .row
            .cmp(&other.offset.row)
            .then(self.offset.col.cmp(&other.offset.col))
    }
}

impl From<Offset> for HexCoord {
    fn from(o: Offset) -> Self {
        Self::from_offset(o.col, o.row)
    }
}

impl From<HexCoord> for Offset {
    fn from(c: HexCoord) -> Self {
        c.offset
    }
}

impl From<Axial> for HexCoord {
    fn from(a: Axial) -> Self {
        Self::from_axial(a)
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.offset.fmt(f)
    }
}

/// Hex distance between `a` and `b`.
///
/// Symmetric, satisfies the triangle inequality, and is zero iff `a == b`.
#[inline]
pub fn range(a: HexCoord, b: HexCoord) -> i32 {
    a.range(b)
}

/// The hex adjacent to `coord` across `side`. Not bounds-checked.
#[inline]
pub fn neighbor(coord: HexCoord, side: Hexside) -> HexCoord {
    coord.neighbor(side)
}

/// Whether `coord` lies inside `size`.
#[inline]
pub fn is_on_board(coord: HexCoord, size: BoardSize) -> bool {
    size.contains(coord)
}

// ---------------------------------------------------------------------------
// BoardSize
// ---------------------------------------------------------------------------

/// Board extents in hexes: columns `0..cols`, rows `0..rows`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardSize {
    pub cols: i32,
    pub rows: i32,
}

impl BoardSize {
    /// Create new board extents.
    #[inline]
    pub const fn new(cols: i32, rows: i32) -> Self {
        Self { cols, rows }
    }

    /// Total number of hexes.
    #[inline]
    pub fn len(self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (self.cols as usize) * (self.rows as usize)
    }

    /// Whether the board has no hexes.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.cols <= 0 || self.rows <= 0
    }

    /// Whether `c` is on the board.
    #[inline]
    pub fn contains(self, c: HexCoord) -> bool {
        let o = c.offset();
        o.col >= 0 && o.col < self.cols && o.row >= 0 && o.row < self.rows
    }

    /// Dense row-major index of `c`, or `None` if off-board.
    #[inline]
    pub fn index(self, c: HexCoord) -> Option<usize> {
        if !self.contains(c) {
            return None;
        }
        Some(c.row() as usize * self.cols as usize + c.col() as usize)
    }

    /// Inverse of [`index`](Self::index).
    #[inline]
    pub fn coord(self, idx: usize) -> HexCoord {
        let cols = self.cols.max(1) as usize;
        HexCoord::from_offset((idx % cols) as i32, (idx / cols) as i32)
    }

    /// The four corner hexes: top-left, top-right, bottom-left, bottom-right.
    /// Duplicates appear on one-wide or one-high boards.
    pub fn corners(self) -> [HexCoord; 4] {
        let (c, r) = (self.cols - 1, self.rows - 1);
        [
            HexCoord::from_offset(0, 0),
            HexCoord::from_offset(c, 0),
            HexCoord::from_offset(0, r),
            HexCoord::from_offset(c, r),
        ]
    }

    /// Row-major iterator over every hex on the board.
    #[inline]
    pub fn iter(self) -> BoardIter {
        BoardIter {
            size: self,
            next: 0,
            len: self.len(),
        }
    }
}

impl IntoIterator for BoardSize {
    type Item = HexCoord;
    type IntoIter = BoardIter;
    #[inline]
    fn into_iter(self) -> BoardIter {
        self.iter()
    }
}

impl fmt::Display for BoardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

/// Row-major iterator over the hexes of a [`BoardSize`].
#[derive(Clone, Debug)]
pub struct BoardIter {
    size: BoardSize,
    next: usize,
    len: usize,
}

impl Iterator for BoardIter {
    type Item = HexCoord;

    #[inline]
    fn next(&mut self) -> Option<HexCoord> {
        if self.next >= self.len {
            return None;
        }
        let c = self.size.coord(self.next);
        self.next += 1;
        Some(c)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BoardIter {}
