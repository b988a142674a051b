//! Field of view over hex board heights.
//!
//! A hex is visible from an origin when the straight hex line between them
//! clears every hex in between: see [`Fov::compute`].

pub mod fov;

pub use fov::{Fov, FovConfig, HeightMap, VisibilitySet};
