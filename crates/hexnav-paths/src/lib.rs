//! Shortest paths on hex boards.
//!
//! This crate searches the directed graph a [`Board`](hexnav_core::Board)
//! defines through its per-side exit costs:
//!
//! - **A\*** with the hex distance heuristic ([`PathFinder::astar_path`])
//! - **Bidirectional A\*** with landmark (ALT) bounds
//!   ([`PathFinder::bidirectional_path`])
//! - **Dijkstra** multi-source distance maps in either edge direction
//!   ([`dijkstra_map`])
//!
//! [`PathFinder::find_path`] picks between the two A* variants by the hex
//! distance between the endpoints. [`PathFinder`] owns and reuses its
//! internal caches, so repeated queries allocate only their result.
//! Results are [`DirectedPath`]s: immutable step lists that share their
//! tails.
//!
//! # Traits
//!
//! | Trait | Role |
//! |---|---|
//! | [`StepGraph`] | the searched graph; implemented for `Board` |
//! | [`Heuristic`] | admissible cost estimate; [`RangeHeuristic`] and [`LandmarkSet`] |

mod astar;
mod bidir;
mod dijkstra;
mod landmark;
mod path;
mod pathfinder;
mod traits;

pub use dijkstra::dijkstra_map;
pub use landmark::{
    DEFAULT_LANDMARK_COUNT, Landmark, LandmarkDirection, LandmarkHandle, LandmarkSelection,
    LandmarkSet,
};
pub use path::{DirectedPath, PathArena, PathId, PathStep, Steps};
pub use pathfinder::{
    Algorithm, DEFAULT_RANGE_CUTOFF, PathFinder, SearchConfig, SearchStats, UNREACHABLE,
};
pub use traits::{Direction, Heuristic, RangeHeuristic, StepGraph};
