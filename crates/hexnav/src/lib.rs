//! Navigation on hexagonal boards.
//!
//! A [`Navigator`] wraps an immutable [`Board`] and answers three kinds of
//! query:
//!
//! - [`compute_path`](Navigator::compute_path): the cheapest directed path
//!   between two hexes. Short queries run plain A*; long ones run
//!   bidirectional A* bounded by precomputed landmark distances.
//! - [`compute_visibility`](Navigator::compute_visibility): the hexes an
//!   observer can see over terrain heights.
//! - [`landmark_distance`](Navigator::landmark_distance): raw landmark
//!   table lookups.
//!
//! ```
//! use hexnav::{Board, BoardSize, HexCoord, NavConfig, Navigator};
//!
//! let board = Board::uniform(BoardSize::new(12, 8), 1).unwrap();
//! let mut nav = Navigator::new(board, NavConfig::default());
//! let path = nav
//!     .compute_path(HexCoord::from_offset(0, 0), HexCoord::from_offset(11, 7))
//!     .unwrap();
//! assert_eq!(path.total_cost(), path.total_steps() as i32);
//! ```
//!
//! The building blocks live in their own crates and are re-exported here:
//! `hexnav-core` (coordinates, hexes, storage, boards), `hexnav-paths`
//! (search and landmarks) and `hexnav-fov` (field of view).

mod config;
mod navigator;

pub use config::NavConfig;
pub use navigator::Navigator;

pub use hexnav_core::{
    Axial, Board, BoardError, BoardSize, BoardTemplate, Cost, Hex, HexCoord, Hexside, Legend,
    StorageKind, TemplateError, TerrainSpec, TerrainTable, TerrainTag, is_on_board, neighbor,
    range,
};
pub use hexnav_fov::{Fov, FovConfig, HeightMap, VisibilitySet};
pub use hexnav_paths::{
    Algorithm, DirectedPath, LandmarkDirection, LandmarkSelection, LandmarkSet, PathStep,
    SearchConfig, SearchStats, StepGraph, UNREACHABLE,
};

/// Lower-level pieces for callers that drive searches themselves.
pub mod paths {
    pub use hexnav_paths::*;
}
