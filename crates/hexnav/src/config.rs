use hexnav_core::StorageKind;
use hexnav_fov::FovConfig;
use hexnav_paths::{DEFAULT_RANGE_CUTOFF, LandmarkSelection, SearchConfig};

/// Settings for a [`Navigator`](crate::Navigator).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavConfig {
    /// Hex distance up to which paths are found by direct A*. Longer
    /// queries use landmarks once they are ready.
    pub range_cutoff: i32,
    /// How landmark hexes are picked.
    pub landmarks: LandmarkSelection,
    /// Storage layout for boards the navigator builds itself.
    pub storage: StorageKind,
    /// Give up on a path query after expanding this many hexes.
    pub max_expansions: Option<usize>,
    pub fov: FovConfig,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            range_cutoff: DEFAULT_RANGE_CUTOFF,
            landmarks: LandmarkSelection::default(),
            storage: StorageKind::default(),
            max_expansions: None,
            fov: FovConfig::default(),
        }
    }
}

impl NavConfig {
    pub fn with_range_cutoff(mut self, range_cutoff: i32) -> Self {
        self.range_cutoff = range_cutoff;
        self
    }

    pub fn with_landmarks(mut self, landmarks: LandmarkSelection) -> Self {
        self.landmarks = landmarks;
        self
    }

    pub fn with_storage(mut self, storage: StorageKind) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_max_expansions(mut self, max_expansions: Option<usize>) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    pub fn with_fov(mut self, fov: FovConfig) -> Self {
        self.fov = fov;
        self
    }

    /// The path search part of the config.
    pub fn search(&self) -> SearchConfig {
        SearchConfig {
            range_cutoff: self.range_cutoff,
            max_expansions: self.max_expansions,
        }
    }
}
