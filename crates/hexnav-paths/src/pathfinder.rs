use std::collections::BinaryHeap;

use hexnav_core::{BoardSize, Cost, HexCoord, Hexside};

use crate::landmark::LandmarkSet;
use crate::path::{DirectedPath, PathArena, PathId};
use crate::traits::{RangeHeuristic, StepGraph};

/// Sentinel meaning "no known path" in distance tables.
pub const UNREACHABLE: Cost = Cost::MAX;

/// Default hex distance above which landmark search takes over.
pub const DEFAULT_RANGE_CUTOFF: i32 = 20;

/// `g + step` as a path cost.
///
/// # Panics
///
/// Panics if the sum overflows or lands on [`UNREACHABLE`].
#[inline]
pub(crate) fn add_cost(g: Cost, step: Cost) -> Cost {
    match g.checked_add(step) {
        Some(sum) if sum != UNREACHABLE => sum,
        _ => panic!("path cost {g} + {step} does not fit below the unreachable marker"),
    }
}

// ---------------------------------------------------------------------------
// Per-hex search state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum NodeState {
    #[default]
    Unvisited,
    Open,
    Closed,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Node {
    pub(crate) g: Cost,
    /// Side of this hex facing the hex it was labelled from.
    pub(crate) via: Option<Hexside>,
    pub(crate) generation: u32,
    pub(crate) state: NodeState,
}

/// Dense per-hex search state, lazily invalidated by a generation counter.
#[derive(Debug, Clone)]
pub(crate) struct NodeTable {
    nodes: Vec<Node>,
    generation: u32,
}

impl NodeTable {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            nodes: vec![Node::default(); len],
            generation: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Forget every label. Reallocates only if `len` exceeds the capacity.
    pub(crate) fn reset(&mut self, len: usize) {
        if len > self.nodes.len() {
            self.nodes.clear();
            self.nodes.resize(len, Node::default());
            self.generation = 0;
        }
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.nodes.fill(Node::default());
            self.generation = 1;
        }
    }

    #[inline]
    fn current(&self, idx: usize) -> Option<&Node> {
        let n = &self.nodes[idx];
        (n.generation == self.generation).then_some(n)
    }

    #[inline]
    pub(crate) fn state(&self, idx: usize) -> NodeState {
        self.current(idx).map_or(NodeState::Unvisited, |n| n.state)
    }

    /// Best known cost to `idx`, or [`UNREACHABLE`].
    #[inline]
    pub(crate) fn g(&self, idx: usize) -> Cost {
        self.current(idx).map_or(UNREACHABLE, |n| n.g)
    }

    #[inline]
    pub(crate) fn via(&self, idx: usize) -> Option<Hexside> {
        self.current(idx).and_then(|n| n.via)
    }

    /// Record `g` for `idx` if it improves on the current label and the hex
    /// is not closed. Returns whether the label changed.
    #[inline]
    pub(crate) fn label(&mut self, idx: usize, g: Cost, via: Option<Hexside>) -> bool {
        let generation = self.generation;
        let n = &mut self.nodes[idx];
        if n.generation != generation {
            *n = Node {
                g,
                via,
                generation,
                state: NodeState::Open,
            };
            return true;
        }
        if n.state == NodeState::Closed || g >= n.g {
            return false;
        }
        n.g = g;
        n.via = via;
        n.state = NodeState::Open;
        true
    }

    /// Close an open hex. Returns `false` if it was not open.
    #[inline]
    pub(crate) fn close(&mut self, idx: usize) -> bool {
        let generation = self.generation;
        let n = &mut self.nodes[idx];
        if n.generation != generation || n.state != NodeState::Open {
            return false;
        }
        n.state = NodeState::Closed;
        true
    }
}

/// Open-set entry, ordered so that `BinaryHeap` pops the smallest `f`,
/// then the smallest `h`, then the earliest pushed.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct NodeRef {
    pub(crate) idx: usize,
    pub(crate) f: Cost,
    pub(crate) h: Cost,
    pub(crate) seq: u64,
}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Pop entries for hexes that are no longer open.
pub(crate) fn skip_stale(open: &mut BinaryHeap<NodeRef>, table: &NodeTable) {
    while open
        .peek()
        .is_some_and(|top| table.state(top.idx) != NodeState::Open)
    {
        open.pop();
    }
}

// ---------------------------------------------------------------------------
// Configuration and diagnostics
// ---------------------------------------------------------------------------

/// Tuning knobs for [`PathFinder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// Queries whose endpoints are at most this far apart use direct A*.
    pub range_cutoff: i32,
    /// Give up after expanding this many hexes.
    pub max_expansions: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            range_cutoff: DEFAULT_RANGE_CUTOFF,
            max_expansions: None,
        }
    }
}

/// Which search answered the last query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Algorithm {
    /// No search ran: off-board endpoints or source equal to target.
    #[default]
    Trivial,
    /// Unidirectional A*.
    Direct,
    /// Bidirectional A* with landmark bounds.
    Bidirectional,
}

/// Counters from the last query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchStats {
    pub algorithm: Algorithm,
    /// Hexes closed.
    pub expanded: usize,
    /// Open-set insertions.
    pub pushed: usize,
}

// ---------------------------------------------------------------------------
// PathFinder
// ---------------------------------------------------------------------------

/// Shortest-path search over a [`StepGraph`].
///
/// `PathFinder` owns the node arrays and open sets of both search
/// directions so that repeated queries on the same board allocate nothing
/// but their result. It is cheap to keep one per thread.
#[derive(Debug, Clone)]
pub struct PathFinder {
    pub(crate) size: BoardSize,
    pub(crate) forward: NodeTable,
    pub(crate) backward: NodeTable,
    pub(crate) open_fwd: BinaryHeap<NodeRef>,
    pub(crate) open_bwd: BinaryHeap<NodeRef>,
    seq: u64,
    pub(crate) config: SearchConfig,
    pub(crate) stats: SearchStats,
}

impl PathFinder {
    /// Create a path finder for boards of `size` with the default config.
    pub fn new(size: BoardSize) -> Self {
        Self::with_config(size, SearchConfig::default())
    }

    /// Create a path finder for boards of `size`.
    pub fn with_config(size: BoardSize, config: SearchConfig) -> Self {
        let len = size.len();
        Self {
            size,
            forward: NodeTable::new(len),
            backward: NodeTable::new(len),
            open_fwd: BinaryHeap::new(),
            open_bwd: BinaryHeap::new(),
            seq: 0,
            config,
            stats: SearchStats::default(),
        }
    }

    /// Board extents the caches are laid out for.
    #[inline]
    pub fn size(&self) -> BoardSize {
        self.size
    }

    /// Switch to boards of `size`. Caches are kept when they are big enough.
    pub fn resize(&mut self, size: BoardSize) {
        self.size = size;
        self.forward.reset(size.len());
        self.backward.reset(size.len());
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[inline]
    pub fn set_config(&mut self, config: SearchConfig) {
        self.config = config;
    }

    /// Counters from the last query.
    #[inline]
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Cheapest path from `source` to `target`.
    ///
    /// Uses direct A* when the endpoints are within
    /// [`range_cutoff`](SearchConfig::range_cutoff) of each other or no
    /// landmarks are available, and bidirectional landmark search otherwise.
    /// Returns `None` if either endpoint is off the board, no path exists, or
    /// the expansion cap is hit. A query from a hex to itself yields the
    /// empty path.
    ///
    /// `landmarks` must have been computed on `graph` as it is now.
    ///
    /// # Panics
    ///
    /// Panics if `landmarks` were computed for a board of a different size.
    pub fn find_path<G: StepGraph>(
        &mut self,
        graph: &G,
        landmarks: Option<&LandmarkSet>,
        source: HexCoord,
        target: HexCoord,
    ) -> Option<DirectedPath> {
        let size = graph.size();
        if size != self.size {
            self.resize(size);
        }
        if let Some(lm) = landmarks {
            assert_eq!(
                lm.size(),
                size,
                "landmarks were computed for a {} board, not {}",
                lm.size(),
                size
            );
        }
        self.stats = SearchStats::default();
        if !size.contains(source) || !size.contains(target) {
            return None;
        }
        if source == target {
            return Some(DirectedPath::empty(source));
        }

        let distance = source.range(target);
        let landmarks = landmarks.filter(|lm| !lm.is_empty());
        let path = match landmarks {
            Some(lm) if distance > self.config.range_cutoff => {
                self.bidirectional_path(graph, lm, source, target)
            }
            _ => self.astar_path(graph, &RangeHeuristic, source, target),
        };
        log::debug!(
            "{:?} search {source} -> {target} (range {distance}): {} after {} expansions",
            self.stats.algorithm,
            path.as_ref()
                .map_or_else(|| "no path".to_string(), |p| format!("cost {}", p.total_cost())),
            self.stats.expanded,
        );
        path
    }

    /// Queue `idx` with cost `g` and estimate `h`.
    #[inline]
    pub(crate) fn entry(&mut self, idx: usize, g: Cost, h: Cost) -> NodeRef {
        self.seq += 1;
        self.stats.pushed += 1;
        NodeRef {
            idx,
            f: g.saturating_add(h),
            h,
            seq: self.seq,
        }
    }

    /// Whether the expansion cap has been reached.
    #[inline]
    pub(crate) fn exhausted(&self) -> bool {
        let hit = self
            .config
            .max_expansions
            .is_some_and(|cap| self.stats.expanded >= cap);
        if hit {
            log::debug!("search gave up after {} expansions", self.stats.expanded);
        }
        hit
    }

    /// Prepend the forward search tree's route from the source to `idx` in
    /// front of `head`, which must start on `idx`.
    pub(crate) fn prepend_forward(&self, arena: &mut PathArena, mut head: PathId, idx: usize) -> PathId {
        let size = self.size;
        let mut cur = idx;
        while let Some(via) = self.forward.via(cur) {
            let prev = size.coord(cur).neighbor(via);
            let Some(pi) = size.index(prev) else { break };
            let cost = self.forward.g(cur) - self.forward.g(pi);
            head = arena.prepend(head, prev, via.opposite(), cost);
            cur = pi;
        }
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexnav_core::{Board, Hex};

    fn c(col: i32, row: i32) -> HexCoord {
        HexCoord::from_offset(col, row)
    }

    #[test]
    fn node_ref_pops_low_f_then_low_h_then_first() {
        let mut heap = BinaryHeap::new();
        heap.push(NodeRef { idx: 0, f: 5, h: 1, seq: 1 });
        heap.push(NodeRef { idx: 1, f: 4, h: 3, seq: 2 });
        heap.push(NodeRef { idx: 2, f: 4, h: 2, seq: 4 });
        heap.push(NodeRef { idx: 3, f: 4, h: 2, seq: 3 });
        let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|n| n.idx)).collect();
        assert_eq!(order, vec![3, 2, 1, 0]);
    }

    #[test]
    fn node_table_labels_and_closes() {
        let mut t = NodeTable::new(4);
        t.reset(4);
        assert_eq!(t.g(1), UNREACHABLE);
        assert!(t.label(1, 7, None));
        assert!(!t.label(1, 9, Some(Hexside::N)));
        assert!(t.label(1, 5, Some(Hexside::S)));
        assert_eq!(t.g(1), 5);
        assert_eq!(t.via(1), Some(Hexside::S));
        assert!(t.close(1));
        assert!(!t.close(1));
        assert!(!t.label(1, 1, None));
        assert_eq!(t.state(1), NodeState::Closed);

        t.reset(4);
        assert_eq!(t.state(1), NodeState::Unvisited);
        assert_eq!(t.g(1), UNREACHABLE);
    }

    #[test]
    fn node_table_survives_generation_wrap() {
        let mut t = NodeTable::new(2);
        t.reset(2);
        t.label(0, 3, None);
        t.generation = u32::MAX;
        t.nodes[1].generation = 1;
        t.nodes[1].state = NodeState::Closed;
        t.reset(2);
        assert_eq!(t.generation, 1);
        assert_eq!(t.state(0), NodeState::Unvisited);
        assert_eq!(t.state(1), NodeState::Unvisited);
    }

    #[test]
    fn resize_keeps_capacity_when_shrinking() {
        let mut pf = PathFinder::new(BoardSize::new(20, 20));
        pf.resize(BoardSize::new(5, 5));
        assert_eq!(pf.size(), BoardSize::new(5, 5));
        assert_eq!(pf.forward.capacity(), 400);
        pf.resize(BoardSize::new(30, 30));
        assert_eq!(pf.forward.capacity(), 900);
        assert_eq!(pf.backward.capacity(), 900);
    }

    #[test]
    fn trivial_queries() {
        let board = Board::uniform(BoardSize::new(3, 3), 1).unwrap();
        let mut pf = PathFinder::new(board.size());
        let p = pf.find_path(&board, None, c(1, 1), c(1, 1)).unwrap();
        assert_eq!(p.total_steps(), 0);
        assert_eq!(p.total_cost(), 0);
        assert_eq!(pf.stats().algorithm, Algorithm::Trivial);
        assert!(pf.find_path(&board, None, c(-1, 0), c(1, 1)).is_none());
        assert!(pf.find_path(&board, None, c(1, 1), c(3, 0)).is_none());
    }

    #[test]
    fn finder_follows_board_size() {
        let small = Board::uniform(BoardSize::new(3, 3), 1).unwrap();
        let big = Board::uniform(BoardSize::new(12, 9), 1).unwrap();
        let mut pf = PathFinder::new(small.size());
        let p = pf.find_path(&big, None, c(0, 0), c(11, 8)).unwrap();
        assert_eq!(pf.size(), big.size());
        assert_eq!(p.total_cost(), c(0, 0).range(c(11, 8)));
        let p = pf.find_path(&small, None, c(0, 0), c(2, 2)).unwrap();
        assert_eq!(p.total_cost(), 3);
    }

    #[test]
    fn expansion_cap_gives_up() {
        let board = Board::uniform(BoardSize::new(10, 10), 1).unwrap();
        let mut pf = PathFinder::with_config(
            board.size(),
            SearchConfig {
                max_expansions: Some(3),
                ..SearchConfig::default()
            },
        );
        assert!(pf.find_path(&board, None, c(0, 0), c(9, 9)).is_none());
        assert_eq!(pf.stats().expanded, 3);

        pf.set_config(SearchConfig::default());
        assert!(pf.find_path(&board, None, c(0, 0), c(9, 9)).is_some());
    }

    #[test]
    #[should_panic(expected = "landmarks were computed for")]
    fn landmark_size_mismatch_panics() {
        let a = Board::uniform(BoardSize::new(3, 3), 1).unwrap();
        let b = Board::new(BoardSize::new(4, 4), |c| Hex::uniform(c, 1)).unwrap();
        let lm = LandmarkSet::empty(a.size());
        PathFinder::new(b.size()).find_path(&b, Some(&lm), c(0, 0), c(1, 1));
    }
}
