//! Directed paths stored in an index arena.
//!
//! A path is a singly linked list of steps that runs from its start hex to
//! its end hex. Lists are built back to front: [`PathArena::root`] creates
//! the empty path sitting on the destination, and [`PathArena::prepend`]
//! adds a step in front of an existing path without touching it. Many paths
//! can therefore share one tail, and each node caches the cost and step count
//! of the whole path it heads.

use std::fmt;
use std::sync::Arc;

use hexnav_core::{Cost, HexCoord, Hexside};

use crate::pathfinder::add_cost;

/// Index of a path node inside a [`PathArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathId(u32);

/// One move of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathStep {
    /// Hex reached by the move.
    pub hex: HexCoord,
    /// Side of `hex` crossed to enter it.
    pub entry: Hexside,
    /// Cost of the move.
    pub cost: Cost,
}

impl PathStep {
    /// Direction of travel: the side of the previous hex that was left.
    #[inline]
    pub fn direction(&self) -> Hexside {
        self.entry.opposite()
    }
}

#[derive(Debug, Clone)]
struct PathNode {
    start: HexCoord,
    end: HexCoord,
    step: Option<PathStep>,
    total_cost: Cost,
    total_steps: u32,
    rest: Option<PathId>,
}

/// Backing store for paths that share tails.
#[derive(Debug, Clone, Default)]
pub struct PathArena {
    nodes: Vec<PathNode>,
}

impl PathArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The empty path that starts and ends on `hex`.
    pub fn root(&mut self, hex: HexCoord) -> PathId {
        self.push(PathNode {
            start: hex,
            end: hex,
            step: None,
            total_cost: 0,
            total_steps: 0,
            rest: None,
        })
    }

    /// A new path that leaves `from` through `exit` at `cost` and then
    /// follows `rest`. `rest` is left unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `rest` does not start on the hex across `exit` from `from`,
    /// or if the total cost overflows.
    pub fn prepend(&mut self, rest: PathId, from: HexCoord, exit: Hexside, cost: Cost) -> PathId {
        let tail = &self.nodes[rest.0 as usize];
        let reached = from.neighbor(exit);
        assert_eq!(
            reached, tail.start,
            "step {from} -> {exit} lands on {reached}, but the path continues from {}",
            tail.start
        );
        let node = PathNode {
            start: from,
            end: tail.end,
            step: Some(PathStep {
                hex: reached,
                entry: exit.opposite(),
                cost,
            }),
            total_cost: add_cost(tail.total_cost, cost),
            total_steps: tail.total_steps + 1,
            rest: Some(rest),
        };
        self.push(node)
    }

    /// Freeze the arena into a shareable path headed by `head`.
    pub fn into_path(self, head: PathId) -> DirectedPath {
        DirectedPath {
            arena: Arc::new(self),
            head,
        }
    }

    /// Build the path visiting `hexes` in order, pricing each move with
    /// `cost`. Returns `None` if two consecutive hexes are not adjacent or a
    /// move has no cost.
    pub fn from_hexes(
        hexes: &[HexCoord],
        mut cost: impl FnMut(HexCoord, Hexside) -> Option<Cost>,
    ) -> Option<DirectedPath> {
        let (&end, _) = hexes.split_last()?;
        let mut arena = PathArena::new();
        let mut head = arena.root(end);
        for pair in hexes.windows(2).rev() {
            let exit = pair[0].side_to(pair[1])?;
            let c = cost(pair[0], exit)?;
            head = arena.prepend(head, pair[0], exit, c);
        }
        Some(arena.into_path(head))
    }

    fn push(&mut self, node: PathNode) -> PathId {
        let id = PathId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }
}

/// An immutable path from [`start`](Self::start) to [`end`](Self::end).
///
/// Cloning is cheap; clones and [`remainder`](Self::remainder)s share the
/// underlying arena.
#[derive(Clone)]
pub struct DirectedPath {
    arena: Arc<PathArena>,
    head: PathId,
}

impl DirectedPath {
    /// The zero-step path on `hex`.
    pub fn empty(hex: HexCoord) -> Self {
        let mut arena = PathArena::new();
        let head = arena.root(hex);
        arena.into_path(head)
    }

    #[inline]
    fn node(&self) -> &PathNode {
        &self.arena.nodes[self.head.0 as usize]
    }

    /// Hex the path starts on.
    #[inline]
    pub fn start(&self) -> HexCoord {
        self.node().start
    }

    /// Hex the path ends on.
    #[inline]
    pub fn end(&self) -> HexCoord {
        self.node().end
    }

    /// Sum of all step costs.
    #[inline]
    pub fn total_cost(&self) -> Cost {
        self.node().total_cost
    }

    /// Number of steps.
    #[inline]
    pub fn total_steps(&self) -> u32 {
        self.node().total_steps
    }

    /// Whether the path has no steps.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.node().step.is_none()
    }

    /// The first move, or `None` for an empty path.
    #[inline]
    pub fn first_step(&self) -> Option<PathStep> {
        self.node().step
    }

    /// The path after the first move, or `None` for an empty path.
    pub fn remainder(&self) -> Option<DirectedPath> {
        self.node().rest.map(|head| DirectedPath {
            arena: Arc::clone(&self.arena),
            head,
        })
    }

    /// Moves in travel order.
    pub fn steps(&self) -> Steps<'_> {
        Steps {
            arena: &self.arena,
            next: Some(self.head),
        }
    }

    /// Every hex visited, start and end included.
    pub fn hexes(&self) -> impl Iterator<Item = HexCoord> + '_ {
        std::iter::once(self.start()).chain(self.steps().map(|s| s.hex))
    }
}

impl fmt::Debug for DirectedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectedPath")
            .field("start", &self.start())
            .field("end", &self.end())
            .field("total_cost", &self.total_cost())
            .field("total_steps", &self.total_steps())
            .finish()
    }
}

impl fmt::Display for DirectedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start())?;
        for step in self.steps() {
            write!(f, " -{}-> {}", step.direction(), step.hex)?;
        }
        write!(f, " (cost {})", self.total_cost())
    }
}

/// Iterator over the moves of a [`DirectedPath`].
pub struct Steps<'a> {
    arena: &'a PathArena,
    next: Option<PathId>,
}

impl Iterator for Steps<'_> {
    type Item = PathStep;

    fn next(&mut self) -> Option<PathStep> {
        let node = &self.arena.nodes[self.next?.0 as usize];
        self.next = node.rest;
        node.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(col: i32, row: i32) -> HexCoord {
        HexCoord::from_offset(col, row)
    }

    #[test]
    fn empty_path() {
        let p = DirectedPath::empty(c(2, 2));
        assert!(p.is_empty());
        assert_eq!(p.total_cost(), 0);
        assert_eq!(p.total_steps(), 0);
        assert_eq!(p.start(), p.end());
        assert!(p.first_step().is_none());
        assert!(p.remainder().is_none());
        assert_eq!(p.hexes().collect::<Vec<_>>(), vec![c(2, 2)]);
    }

    #[test]
    fn prepend_caches_totals() {
        let mut arena = PathArena::new();
        let end = arena.root(c(0, 2));
        let mid = arena.prepend(end, c(0, 1), Hexside::S, 2);
        let head = arena.prepend(mid, c(0, 0), Hexside::S, 3);
        let p = arena.into_path(head);

        assert_eq!(p.start(), c(0, 0));
        assert_eq!(p.end(), c(0, 2));
        assert_eq!(p.total_cost(), 5);
        assert_eq!(p.total_steps(), 2);
        let first = p.first_step().unwrap();
        assert_eq!(first.hex, c(0, 1));
        assert_eq!(first.entry, Hexside::N);
        assert_eq!(first.direction(), Hexside::S);
        assert_eq!(first.cost, 3);

        let rest = p.remainder().unwrap();
        assert_eq!(rest.start(), c(0, 1));
        assert_eq!(rest.total_cost(), 2);
        assert_eq!(rest.total_steps(), 1);
        assert_eq!(
            p.hexes().collect::<Vec<_>>(),
            vec![c(0, 0), c(0, 1), c(0, 2)]
        );
    }

    #[test]
    fn alternate_paths_share_a_tail() {
        let mut arena = PathArena::new();
        let end = arena.root(c(2, 2));
        let shared = arena.prepend(end, c(2, 1), Hexside::S, 1);
        let a = arena.prepend(shared, c(2, 0), Hexside::S, 1);
        let b = arena.prepend(shared, c(1, 1), Hexside::NE, 4);
        assert_eq!(arena.len(), 4);

        let arena = Arc::new(arena);
        let pa = DirectedPath {
            arena: Arc::clone(&arena),
            head: a,
        };
        let pb = DirectedPath { arena, head: b };
        assert_eq!(pa.total_cost(), 2);
        assert_eq!(pb.total_cost(), 5);
        assert_eq!(pa.remainder().unwrap().head, pb.remainder().unwrap().head);
    }

    #[test]
    #[should_panic(expected = "but the path continues from")]
    fn prepend_rejects_disconnected_step() {
        let mut arena = PathArena::new();
        let end = arena.root(c(3, 3));
        arena.prepend(end, c(0, 0), Hexside::S, 1);
    }

    #[test]
    fn from_hexes_builds_in_order() {
        let hexes = [c(0, 0), c(1, 0), c(1, 1)];
        let p = PathArena::from_hexes(&hexes, |_, _| Some(2)).unwrap();
        assert_eq!(p.total_cost(), 4);
        assert_eq!(p.hexes().collect::<Vec<_>>(), hexes.to_vec());
        assert_eq!(p.to_string(), "(0, 0) -SE-> (1, 0) -S-> (1, 1) (cost 4)");

        assert!(PathArena::from_hexes(&[c(0, 0), c(3, 3)], |_, _| Some(1)).is_none());
        assert!(PathArena::from_hexes(&[], |_, _| Some(1)).is_none());
        assert_eq!(
            PathArena::from_hexes(&[c(4, 4)], |_, _| Some(1))
                .unwrap()
                .total_steps(),
            0
        );
    }
}
