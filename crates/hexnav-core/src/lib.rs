//! Core types for hex grid navigation.
//!
//! This crate provides the foundations used across the *hexnav* workspace:
//! odd-q hex coordinates and hexsides, the per-hex [`Hex`] record and its
//! [`TerrainTable`], lazily materialized board storage (flat and 32×32
//! blocked), and the [`Board`] that ties them together.

pub mod board;
pub mod error;
pub mod geom;
pub mod hex;
pub mod storage;
pub mod template;

pub use board::Board;
pub use error::{BoardError, TemplateError};
pub use geom::{Axial, BoardIter, BoardSize, HexCoord, Hexside, Offset, is_on_board, neighbor, range};
pub use hex::{Cost, Hex, TerrainSpec, TerrainTable, TerrainTag};
pub use storage::{
    AUTO_BLOCKED_THRESHOLD, BLOCK_SIZE, BlockedStorage, BoardStorage, FlatStorage, Storage,
    StorageKind,
};
pub use template::{BoardTemplate, Legend, LegendEntry};
