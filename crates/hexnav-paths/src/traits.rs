use hexnav_core::{Board, BoardSize, Cost, HexCoord, Hexside};

/// Which way a search walks the directed edges of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Follow edges from a hex to the hexes it can step into.
    Forward,
    /// Follow edges backwards, from a hex to the hexes that can step into it.
    Backward,
}

/// A board seen as a directed graph with positive step costs.
pub trait StepGraph {
    /// Extents of the graph.
    fn size(&self) -> BoardSize;

    /// Cost of stepping from `from` across its side `exit`.
    ///
    /// Returns `None` when either end is off the board or the step is
    /// impassable. Costs must be > 0.
    fn step_cost(&self, from: HexCoord, exit: Hexside) -> Option<Cost>;

    /// The hex across `side` of `n`, with the cost of the edge between them
    /// taken in `direction`.
    ///
    /// Forward, that is the cost of leaving `n` through `side`; backward, the
    /// cost of leaving the neighbour towards `n`.
    #[inline]
    fn edge(&self, n: HexCoord, side: Hexside, direction: Direction) -> Option<(HexCoord, Cost)> {
        let m = n.neighbor(side);
        let cost = match direction {
            Direction::Forward => self.step_cost(n, side)?,
            Direction::Backward => self.step_cost(m, side.opposite())?,
        };
        Some((m, cost))
    }
}

impl StepGraph for Board {
    #[inline]
    fn size(&self) -> BoardSize {
        Board::size(self)
    }

    /// A hex with no passable side is a wall: it can be neither left nor
    /// entered.
    #[inline]
    fn step_cost(&self, from: HexCoord, exit: Hexside) -> Option<Cost> {
        let cost = Board::step_cost(self, from, exit)?;
        let to = self.get(from.neighbor(exit))?;
        if to.is_passable() { Some(cost) } else { None }
    }
}

impl<G: StepGraph + ?Sized> StepGraph for &G {
    #[inline]
    fn size(&self) -> BoardSize {
        (**self).size()
    }

    #[inline]
    fn step_cost(&self, from: HexCoord, exit: Hexside) -> Option<Cost> {
        (**self).step_cost(from, exit)
    }
}

/// An admissible estimate of path cost between two hexes.
pub trait Heuristic {
    /// Lower bound on the cheapest path cost from `from` to `to`.
    /// Must never overestimate.
    fn estimate(&self, from: HexCoord, to: HexCoord) -> Cost;
}

/// Hex distance as a heuristic. Admissible because every step costs at
/// least 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeHeuristic;

impl Heuristic for RangeHeuristic {
    #[inline]
    fn estimate(&self, from: HexCoord, to: HexCoord) -> Cost {
        from.range(to)
    }
}
