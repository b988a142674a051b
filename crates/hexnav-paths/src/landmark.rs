//! Landmark distance tables and the ALT lower bound built from them.
//!
//! A landmark is a hex with two precomputed Dijkstra tables: the cost from
//! the landmark to every hex and from every hex to the landmark. By the
//! triangle inequality these give a lower bound on the cost between any two
//! hexes that is usually far tighter than the hex distance.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::Instant;

use hexnav_core::{BoardSize, Cost, HexCoord, Hexside};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::dijkstra::dijkstra_map;
use crate::pathfinder::UNREACHABLE;
use crate::traits::{Direction, Heuristic, StepGraph};

/// Default number of landmarks for [`LandmarkSelection::Spread`].
pub const DEFAULT_LANDMARK_COUNT: usize = 8;

/// How landmark hexes are picked.
///
/// Only usable hexes become landmarks: on the board and with at least one
/// edge in or out. Duplicates are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LandmarkSelection {
    /// The four board corners.
    Corners,
    /// The corners, then repeatedly the hex farthest from every landmark
    /// picked so far, up to `count` in total.
    Spread { count: usize },
    /// `count` hexes drawn with a seeded RNG.
    Random { count: usize, seed: u64 },
    /// Exactly these hexes.
    Explicit(Vec<HexCoord>),
}

impl Default for LandmarkSelection {
    fn default() -> Self {
        LandmarkSelection::Spread {
            count: DEFAULT_LANDMARK_COUNT,
        }
    }
}

fn usable<G: StepGraph>(graph: &G, c: HexCoord) -> bool {
    graph.size().contains(c)
        && Hexside::ALL.into_iter().any(|side| {
            graph.edge(c, side, Direction::Forward).is_some()
                || graph.edge(c, side, Direction::Backward).is_some()
        })
}

fn push_unique(picked: &mut Vec<HexCoord>, c: HexCoord) {
    if !picked.contains(&c) {
        picked.push(c);
    }
}

impl LandmarkSelection {
    /// The landmark hexes this selection yields on `graph`.
    pub fn select<G: StepGraph>(&self, graph: &G) -> Vec<HexCoord> {
        let size = graph.size();
        let mut picked = Vec::new();
        match self {
            LandmarkSelection::Corners => {
                for c in size.corners() {
                    if usable(graph, c) {
                        push_unique(&mut picked, c);
                    }
                }
            }
            LandmarkSelection::Spread { count } => {
                for c in size.corners() {
                    if picked.len() < *count && usable(graph, c) {
                        push_unique(&mut picked, c);
                    }
                }
                let candidates: Vec<HexCoord> =
                    size.iter().filter(|&c| usable(graph, c)).collect();
                let mut nearest: Vec<i32> = candidates
                    .iter()
                    .map(|&c| picked.iter().map(|&p| c.range(p)).min().unwrap_or(i32::MAX))
                    .collect();
                while picked.len() < *count {
                    let far = nearest
                        .iter()
                        .enumerate()
                        .filter(|&(_, &d)| d > 0)
                        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)));
                    let Some((i, _)) = far else { break };
                    let chosen = candidates[i];
                    picked.push(chosen);
                    for (d, &c) in nearest.iter_mut().zip(&candidates) {
                        *d = (*d).min(c.range(chosen));
                    }
                }
            }
            LandmarkSelection::Random { count, seed } => {
                let mut candidates: Vec<HexCoord> =
                    size.iter().filter(|&c| usable(graph, c)).collect();
                let mut rng = StdRng::seed_from_u64(*seed);
                candidates.shuffle(&mut rng);
                candidates.truncate(*count);
                picked = candidates;
            }
            LandmarkSelection::Explicit(coords) => {
                for &c in coords {
                    if usable(graph, c) {
                        push_unique(&mut picked, c);
                    }
                }
            }
        }
        picked
    }
}

/// Which table of a landmark to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LandmarkDirection {
    /// Cost from the landmark to a hex.
    FromLandmark,
    /// Cost from a hex to the landmark.
    ToLandmark,
}

/// A hex with exact costs to and from every other hex.
#[derive(Clone)]
pub struct Landmark {
    coord: HexCoord,
    from: Box<[Cost]>,
    to: Box<[Cost]>,
}

impl Landmark {
    /// Run both Dijkstra sweeps for `coord`.
    pub fn compute<G: StepGraph>(graph: &G, coord: HexCoord) -> Self {
        Self {
            coord,
            from: dijkstra_map(graph, &[coord], Direction::Forward, UNREACHABLE),
            to: dijkstra_map(graph, &[coord], Direction::Backward, UNREACHABLE),
        }
    }

    #[inline]
    pub fn coord(&self) -> HexCoord {
        self.coord
    }

    /// Table entry for dense index `idx`: [`UNREACHABLE`] when there is no
    /// path.
    #[inline]
    pub fn distance_at(&self, idx: usize, direction: LandmarkDirection) -> Cost {
        match direction {
            LandmarkDirection::FromLandmark => self.from[idx],
            LandmarkDirection::ToLandmark => self.to[idx],
        }
    }

    /// Number of hexes reachable from the landmark.
    pub fn reachable(&self) -> usize {
        self.from.iter().filter(|&&d| d != UNREACHABLE).count()
    }

    /// Lower bound on the cost from dense index `a` to `b`, ignoring any
    /// table entry that is unreachable.
    #[inline]
    fn bound(&self, a: usize, b: usize) -> Cost {
        let mut best = 0;
        let (la, lb) = (self.from[a], self.from[b]);
        if la != UNREACHABLE && lb != UNREACHABLE {
            best = best.max(lb - la);
        }
        let (al, bl) = (self.to[a], self.to[b]);
        if al != UNREACHABLE && bl != UNREACHABLE {
            best = best.max(al - bl);
        }
        best
    }
}

impl fmt::Debug for Landmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Landmark")
            .field("coord", &self.coord)
            .field("reachable", &self.reachable())
            .finish()
    }
}

/// The landmarks of one board.
///
/// Tables describe the board at the time of [`compute`](Self::compute);
/// after the board changes the set must be recomputed, or path costs may
/// no longer be optimal.
#[derive(Debug, Clone)]
pub struct LandmarkSet {
    size: BoardSize,
    landmarks: Vec<Landmark>,
}

impl LandmarkSet {
    /// Pick landmarks on `graph` and compute their tables.
    pub fn compute<G: StepGraph>(graph: &G, selection: &LandmarkSelection) -> Self {
        let started = Instant::now();
        let size = graph.size();
        let landmarks: Vec<Landmark> = selection
            .select(graph)
            .into_iter()
            .map(|c| Landmark::compute(graph, c))
            .collect();
        log::debug!(
            "computed {} landmarks on {size} board in {:?} (reachable: {:?})",
            landmarks.len(),
            started.elapsed(),
            landmarks.iter().map(Landmark::reachable).collect::<Vec<_>>(),
        );
        Self { size, landmarks }
    }

    /// A set with no landmarks. Its bound is the hex distance.
    pub fn empty(size: BoardSize) -> Self {
        Self {
            size,
            landmarks: Vec::new(),
        }
    }

    #[inline]
    pub fn size(&self) -> BoardSize {
        self.size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Landmark> {
        self.landmarks.iter()
    }

    /// Cost between landmark `index` and `coord` in `direction`, or `None`
    /// if there is no such landmark or `coord` is off the board. Unreachable
    /// pairs yield `Some(UNREACHABLE)`.
    pub fn distance(&self, index: usize, coord: HexCoord, direction: LandmarkDirection) -> Option<Cost> {
        let lm = self.landmarks.get(index)?;
        let idx = self.size.index(coord)?;
        Some(lm.distance_at(idx, direction))
    }

    /// Best landmark lower bound on the cost from `from` to `to`; 0 when no
    /// landmark gives information or either hex is off the board.
    pub fn lower_bound(&self, from: HexCoord, to: HexCoord) -> Cost {
        let (Some(a), Some(b)) = (self.size.index(from), self.size.index(to)) else {
            return 0;
        };
        self.landmarks
            .iter()
            .map(|lm| lm.bound(a, b))
            .max()
            .unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a LandmarkSet {
    type Item = &'a Landmark;
    type IntoIter = std::slice::Iter<'a, Landmark>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Heuristic for LandmarkSet {
    #[inline]
    fn estimate(&self, from: HexCoord, to: HexCoord) -> Cost {
        from.range(to).max(self.lower_bound(from, to))
    }
}

// ---------------------------------------------------------------------------
// LandmarkHandle
// ---------------------------------------------------------------------------

struct Slot {
    set: Mutex<Option<Arc<LandmarkSet>>>,
    ready: Condvar,
}

/// A landmark set that may still be under construction.
///
/// Clones share the same slot. Once filled, the set never changes.
#[derive(Clone)]
pub struct LandmarkHandle {
    slot: Arc<Slot>,
}

impl LandmarkHandle {
    fn pending() -> Self {
        Self {
            slot: Arc::new(Slot {
                set: Mutex::new(None),
                ready: Condvar::new(),
            }),
        }
    }

    /// A handle holding an already computed set.
    pub fn ready(set: LandmarkSet) -> Self {
        let handle = Self::pending();
        handle.fill(set);
        handle
    }

    /// Compute the landmarks of `graph` on a background thread.
    ///
    /// If the computation panics the handle is filled with an empty set, so
    /// searches keep using the hex distance bound. If no thread can be
    /// started the set is computed before returning.
    pub fn spawn<G>(graph: Arc<G>, selection: LandmarkSelection) -> Self
    where
        G: StepGraph + Send + Sync + 'static,
    {
        let handle = Self::pending();
        let worker = handle.clone();
        let worker_graph = Arc::clone(&graph);
        let worker_selection = selection.clone();
        let spawned = thread::Builder::new()
            .name("hexnav-landmarks".into())
            .spawn(move || {
                let size = worker_graph.size();
                let set = panic::catch_unwind(AssertUnwindSafe(|| {
                    LandmarkSet::compute(&*worker_graph, &worker_selection)
                }))
                .unwrap_or_else(|_| {
                    log::error!("landmark computation panicked; falling back to hex distance");
                    LandmarkSet::empty(size)
                });
                worker.fill(set);
            });
        if let Err(err) = spawned {
            log::warn!("could not start landmark thread ({err}); computing inline");
            handle.fill(LandmarkSet::compute(&*graph, &selection));
        }
        handle
    }

    fn fill(&self, set: LandmarkSet) {
        let mut slot = self.slot.set.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::new(set));
        self.slot.ready.notify_all();
    }

    /// The set, if ready. Never blocks on the computation.
    pub fn try_get(&self) -> Option<Arc<LandmarkSet>> {
        self.slot
            .set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_ready(&self) -> bool {
        self.try_get().is_some()
    }

    /// Block until the set is ready.
    pub fn wait(&self) -> Arc<LandmarkSet> {
        let mut slot = self.slot.set.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(set) = slot.as_ref() {
                return Arc::clone(set);
            }
            slot = self
                .slot
                .ready
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl fmt::Debug for LandmarkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LandmarkHandle")
            .field("ready", &self.is_ready())
            .finish()
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
    fn corners_skip_walls_and_duplicates() {
        let board = Board::new(BoardSize::new(4, 3), |c| {
            if c == HexCoord::from_offset(3, 2) {
                Hex::impassable(c)
            } else {
                Hex::uniform(c, 1)
            }
        })
        .unwrap();
        assert_eq!(
            LandmarkSelection::Corners.select(&board),
            vec![c(0, 0), c(3, 0), c(0, 2)]
        );

        let line = Board::uniform(BoardSize::new(1, 5), 1).unwrap();
        assert_eq!(LandmarkSelection::Corners.select(&line), vec![c(0, 0), c(0, 4)]);
    }

    #[test]
    fn spread_adds_far_hexes_after_corners() {
        let board = Board::uniform(BoardSize::new(9, 9), 1).unwrap();
        let picked = LandmarkSelection::Spread { count: 5 }.select(&board);
        assert_eq!(picked.len(), 5);
        assert_eq!(&picked[..4], &board.size().corners());
        let fifth = picked[4];
        let nearest = picked[..4].iter().map(|&p| p.range(fifth)).min().unwrap();
        for h in board.size().iter() {
            let d = picked[..4].iter().map(|&p| p.range(h)).min().unwrap();
            assert!(d <= nearest);
        }

        let few = LandmarkSelection::Spread { count: 2 }.select(&board);
        assert_eq!(few, vec![c(0, 0), c(8, 0)]);
    }

    #[test]
    fn spread_stops_when_board_is_exhausted() {
        let board = Board::uniform(BoardSize::new(2, 2), 1).unwrap();
        let picked = LandmarkSelection::Spread { count: 10 }.select(&board);
        assert_eq!(picked.len(), 4);
    }

    #[test]
    fn random_is_seeded() {
        let board = Board::uniform(BoardSize::new(10, 10), 1).unwrap();
        let a = LandmarkSelection::Random { count: 6, seed: 7 }.select(&board);
        let b = LandmarkSelection::Random { count: 6, seed: 7 }.select(&board);
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
        let mut dedup = a.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), 6);
    }

    #[test]
    fn explicit_filters_off_board() {
        let board = Board::uniform(BoardSize::new(5, 5), 1).unwrap();
        let sel = LandmarkSelection::Explicit(vec![c(1, 1), c(9, 9), c(1, 1), c(4, 0)]);
        assert_eq!(sel.select(&board), vec![c(1, 1), c(4, 0)]);
    }

    #[test]
    fn distances_in_both_directions() {
        // Leaving column 0 costs 3, everything else 1.
        let board = Board::new(BoardSize::new(4, 1), |c| {
            if c.col() == 0 { Hex::uniform(c, 3) } else { Hex::uniform(c, 1) }
        })
        .unwrap();
        let set = LandmarkSet::compute(&board, &LandmarkSelection::Explicit(vec![c(0, 0)]));
        assert_eq!(set.len(), 1);
        assert_eq!(set.distance(0, c(3, 0), LandmarkDirection::FromLandmark), Some(5));
        assert_eq!(set.distance(0, c(3, 0), LandmarkDirection::ToLandmark), Some(3));
        assert_eq!(set.distance(0, c(0, 0), LandmarkDirection::ToLandmark), Some(0));
        assert_eq!(set.distance(1, c(3, 0), LandmarkDirection::ToLandmark), None);
        assert_eq!(set.distance(0, c(4, 0), LandmarkDirection::ToLandmark), None);
    }

    #[test]
    fn large_distances_are_not_unreachable() {
        let board = Board::uniform(BoardSize::new(4, 1), 700_000_000).unwrap();
        let set = LandmarkSet::compute(&board, &LandmarkSelection::Explicit(vec![c(0, 0)]));
        assert_eq!(
            set.distance(0, c(3, 0), LandmarkDirection::FromLandmark),
            Some(2_100_000_000)
        );
        assert_eq!(
            set.distance(0, c(3, 0), LandmarkDirection::ToLandmark),
            Some(2_100_000_000)
        );
    }

    #[test]
    fn unreachable_entries_are_skipped() {
        let board = Board::new(BoardSize::new(3, 3), |c| {
            if c.col() == 1 { Hex::impassable(c) } else { Hex::uniform(c, 1) }
        })
        .unwrap();
        let set = LandmarkSet::compute(&board, &LandmarkSelection::Explicit(vec![c(0, 0)]));
        assert_eq!(
            set.distance(0, c(2, 2), LandmarkDirection::FromLandmark),
            Some(UNREACHABLE)
        );
        assert_eq!(set.lower_bound(c(2, 0), c(2, 2)), 0);
        assert_eq!(set.lower_bound(c(0, 0), c(0, 2)), 2);
        assert_eq!(set.estimate(c(2, 0), c(2, 2)), 2);
    }

    #[test]
    fn bound_beats_range_on_costly_terrain() {
        let board = Board::uniform(BoardSize::new(6, 6), 4).unwrap();
        let set = LandmarkSet::compute(&board, &LandmarkSelection::Corners);
        let (a, b) = (c(0, 0), c(5, 5));
        assert_eq!(set.estimate(a, b), 4 * a.range(b));
        assert_eq!(set.estimate(b, a), 4 * a.range(b));
    }

    #[test]
    fn empty_set_estimates_range() {
        let set = LandmarkSet::empty(BoardSize::new(5, 5));
        assert!(set.is_empty());
        assert_eq!(set.estimate(c(0, 0), c(4, 4)), c(0, 0).range(c(4, 4)));
    }

    #[test]
    fn handle_ready_and_spawned() {
        let board = Arc::new(Board::uniform(BoardSize::new(8, 8), 1).unwrap());
        let ready = LandmarkHandle::ready(LandmarkSet::empty(board.size()));
        assert!(ready.is_ready());
        assert!(ready.try_get().unwrap().is_empty());

        let spawned = LandmarkHandle::spawn(Arc::clone(&board), LandmarkSelection::Corners);
        let clone = spawned.clone();
        let set = spawned.wait();
        assert_eq!(set.len(), 4);
        assert!(clone.is_ready());
        assert!(Arc::ptr_eq(&set, &clone.try_get().unwrap()));
    }

    #[test]
    fn handle_survives_a_panicking_graph() {
        struct Broken;
        impl StepGraph for Broken {
            fn size(&self) -> BoardSize {
                BoardSize::new(4, 4)
            }
            fn step_cost(&self, _: HexCoord, _: Hexside) -> Option<Cost> {
                panic!("broken graph");
            }
        }
        let handle = LandmarkHandle::spawn(Arc::new(Broken), LandmarkSelection::Corners);
        let set = handle.wait();
        assert!(set.is_empty());
        assert_eq!(set.size(), BoardSize::new(4, 4));
    }
}
