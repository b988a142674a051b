use std::sync::Arc;

use hexnav_core::{
    Board, BoardError, BoardSize, BoardTemplate, Cost, Hex, HexCoord, Legend, TemplateError,
    TerrainTable,
};
use hexnav_fov::{Fov, VisibilitySet};
use hexnav_paths::{
    DirectedPath, LandmarkDirection, LandmarkHandle, LandmarkSet, PathFinder, SearchStats,
};

use crate::config::NavConfig;

/// Paths and sight lines on one board.
///
/// The board and its landmarks are shared between clones; the search caches
/// are not, so each clone can answer queries on its own thread.
pub struct Navigator {
    board: Arc<Board>,
    landmarks: LandmarkHandle,
    finder: PathFinder,
    fov: Fov,
    config: NavConfig,
}

impl Navigator {
    /// Wrap `board`, computing its landmarks before returning.
    pub fn new(board: Board, config: NavConfig) -> Self {
        let set = LandmarkSet::compute(&board, &config.landmarks);
        Self::assemble(Arc::new(board), LandmarkHandle::ready(set), config)
    }

    /// Wrap `board` and compute its landmarks on a background thread.
    /// Until they are ready every query uses direct A*.
    pub fn new_background(board: Board, config: NavConfig) -> Self {
        let board = Arc::new(board);
        let landmarks = LandmarkHandle::spawn(Arc::clone(&board), config.landmarks.clone());
        Self::assemble(board, landmarks, config)
    }

    /// Build the board from `factory` with the configured storage layout,
    /// then wrap it as [`new`](Self::new) does.
    pub fn from_factory(
        size: BoardSize,
        config: NavConfig,
        factory: impl Fn(HexCoord) -> Hex + Send + Sync + 'static,
    ) -> Result<Self, BoardError> {
        let board = Board::with_storage(size, config.storage, factory)?;
        Ok(Self::new(board, config))
    }

    /// Build the board from an ASCII template with the configured storage
    /// layout, then wrap it as [`new`](Self::new) does.
    pub fn from_template(
        template: &BoardTemplate,
        legend: &Legend,
        table: &TerrainTable,
        config: NavConfig,
    ) -> Result<Self, TemplateError> {
        let board = template.build(legend, table, config.storage)?;
        Ok(Self::new(board, config))
    }

    fn assemble(board: Arc<Board>, landmarks: LandmarkHandle, config: NavConfig) -> Self {
        log::debug!(
            "navigator on {} board, range cutoff {}, landmarks {}",
            board.size(),
            config.range_cutoff,
            if landmarks.is_ready() { "ready" } else { "pending" }
        );
        Self {
            finder: PathFinder::with_config(board.size(), config.search()),
            fov: Fov::new(config.fov),
            board,
            landmarks,
            config,
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// The hex at `coord`, or `None` off the board.
    #[inline]
    pub fn get(&self, coord: HexCoord) -> Option<&Hex> {
        self.board.get(coord)
    }

    /// Cheapest path from `source` to `target`, or `None` if either is off
    /// the board, no path exists, or the expansion cap is hit.
    pub fn compute_path(&mut self, source: HexCoord, target: HexCoord) -> Option<DirectedPath> {
        let landmarks = self.landmarks.try_get();
        self.finder
            .find_path(&*self.board, landmarks.as_deref(), source, target)
    }

    /// Hexes visible from `origin` within `radius`.
    pub fn compute_visibility(&self, origin: HexCoord, radius: i32) -> VisibilitySet {
        self.fov.compute(&*self.board, origin, radius)
    }

    /// Cost between landmark `index` and `coord`. `None` while landmarks are
    /// pending, for an unknown landmark, or for an off-board `coord`;
    /// [`UNREACHABLE`](hexnav_paths::UNREACHABLE) when there is no path.
    pub fn landmark_distance(
        &self,
        index: usize,
        coord: HexCoord,
        direction: LandmarkDirection,
    ) -> Option<Cost> {
        self.landmarks.try_get()?.distance(index, coord, direction)
    }

    /// Landmarks, if they are ready.
    pub fn landmarks(&self) -> Option<Arc<LandmarkSet>> {
        self.landmarks.try_get()
    }

    pub fn landmarks_ready(&self) -> bool {
        self.landmarks.is_ready()
    }

    /// Block until landmarks are ready.
    pub fn wait_for_landmarks(&self) -> Arc<LandmarkSet> {
        self.landmarks.wait()
    }

    /// Counters from the last [`compute_path`](Self::compute_path).
    pub fn last_search(&self) -> SearchStats {
        self.finder.stats()
    }
}

impl Clone for Navigator {
    fn clone(&self) -> Self {
        Self {
            board: Arc::clone(&self.board),
            landmarks: self.landmarks.clone(),
            finder: PathFinder::with_config(self.board.size(), self.config.search()),
            fov: self.fov,
            config: self.config.clone(),
        }
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("size", &self.board.size())
            .field("landmarks", &self.landmarks)
            .field("config", &self.config)
            .finish()
    }
}
