//! Lazily materialized board storage.
//!
//! Storage maps every on-board [`HexCoord`] to exactly one value built by a
//! factory on first access. Two layouts share the [`BoardStorage`] contract:
//!
//! - [`FlatStorage`]: one dense slice, each cell initialized on its own.
//! - [`BlockedStorage`]: the board is cut into [`BLOCK_SIZE`]² tiles; a tile
//!   is allocated and filled in one go the first time any of its hexes is
//!   requested, so untouched regions of a huge board cost one pointer each.
//!
//! Initialization goes through [`OnceLock`], so a built store can be read
//! from several threads at once.

use std::fmt;
use std::sync::OnceLock;

use crate::geom::{BoardSize, HexCoord};

/// Side length of a [`BlockedStorage`] tile, in hexes.
pub const BLOCK_SIZE: i32 = 32;

/// Boards with more hexes than this use [`BlockedStorage`] under
/// [`StorageKind::Auto`].
pub const AUTO_BLOCKED_THRESHOLD: usize = 256 * 256;

/// Factory building the value stored at a coordinate.
pub type Factory<T> = Box<dyn Fn(HexCoord) -> T + Send + Sync>;

/// Read access to a coordinate-addressed store.
pub trait BoardStorage<T> {
    /// Extents of the stored board.
    fn size(&self) -> BoardSize;

    /// Value at `coord`, building it on first access. Returns `None` for an
    /// off-board coordinate without invoking the factory.
    fn get(&self, coord: HexCoord) -> Option<&T>;

    /// Number of values built so far.
    fn materialized(&self) -> usize;
}

// ---------------------------------------------------------------------------
// FlatStorage
// ---------------------------------------------------------------------------

/// Dense storage: one lazily initialized slot per hex.
pub struct FlatStorage<T> {
    size: BoardSize,
    cells: Box<[OnceLock<T>]>,
    factory: Factory<T>,
}

impl<T> FlatStorage<T> {
    /// Create an empty store for `size`; nothing is built yet.
    pub fn new(size: BoardSize, factory: impl Fn(HexCoord) -> T + Send + Sync + 'static) -> Self {
        Self::with_factory(size, Box::new(factory))
    }

    fn with_factory(size: BoardSize, factory: Factory<T>) -> Self {
        let cells = (0..size.len()).map(|_| OnceLock::new()).collect();
        Self {
            size,
            cells,
            factory,
        }
    }
}

impl<T> BoardStorage<T> for FlatStorage<T> {
    #[inline]
    fn size(&self) -> BoardSize {
        self.size
    }

    #[inline]
    fn get(&self, coord: HexCoord) -> Option<&T> {
        let i = self.size.index(coord)?;
        Some(self.cells[i].get_or_init(|| (self.factory)(coord)))
    }

    fn materialized(&self) -> usize {
        self.cells.iter().filter(|c| c.get().is_some()).count()
    }
}

impl<T> fmt::Debug for FlatStorage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatStorage")
            .field("size", &self.size)
            .field("materialized", &self.materialized())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// BlockedStorage
// ---------------------------------------------------------------------------

/// Tiled storage: [`BLOCK_SIZE`]² tiles, each built whole on first touch.
///
/// Tiles on the right and bottom edges are clipped to the board.
pub struct BlockedStorage<T> {
    size: BoardSize,
    blocks_across: usize,
    blocks: Box<[OnceLock<Box<[T]>>]>,
    factory: Factory<T>,
}

impl<T> BlockedStorage<T> {
    /// Create an empty store for `size`; nothing is built yet.
    pub fn new(size: BoardSize, factory: impl Fn(HexCoord) -> T + Send + Sync + 'static) -> Self {
        Self::with_factory(size, Box::new(factory))
    }

    fn with_factory(size: BoardSize, factory: Factory<T>) -> Self {
        let (across, down) = if size.is_empty() {
            (0, 0)
        } else {
            (
                blocks_needed(size.cols) as usize,
                blocks_needed(size.rows) as usize,
            )
        };
        let blocks = (0..across * down).map(|_| OnceLock::new()).collect();
        Self {
            size,
            blocks_across: across,
            blocks,
            factory,
        }
    }

    /// Number of tiles built so far.
    pub fn materialized_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| b.get().is_some()).count()
    }

    /// Total number of tiles covering the board.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Tile origin and clipped tile width for the tile holding `(col, row)`.
    #[inline]
    fn block_geometry(&self, col: i32, row: i32) -> (i32, i32, i32) {
        let col0 = col - col % BLOCK_SIZE;
        let row0 = row - row % BLOCK_SIZE;
        let width = BLOCK_SIZE.min(self.size.cols - col0);
        (col0, row0, width)
    }

    fn fill_block(&self, col0: i32, row0: i32, width: i32) -> Box<[T]> {
        let height = BLOCK_SIZE.min(self.size.rows - row0);
        log::trace!("materializing block at ({col0}, {row0}), {width}x{height}");
        (row0..row0 + height)
            .flat_map(|row| (col0..col0 + width).map(move |col| HexCoord::from_offset(col, row)))
            .map(|c| (self.factory)(c))
            .collect()
    }
}

fn blocks_needed(extent: i32) -> i32 {
    (extent + BLOCK_SIZE - 1) / BLOCK_SIZE
}

impl<T> BoardStorage<T> for BlockedStorage<T> {
    #[inline]
    fn size(&self) -> BoardSize {
        self.size
    }

    fn get(&self, coord: HexCoord) -> Option<&T> {
        if !self.size.contains(coord) {
            return None;
        }
        let (col, row) = (coord.col(), coord.row());
        let (col0, row0, width) = self.block_geometry(col, row);
        let block_idx =
            (row0 / BLOCK_SIZE) as usize * self.blocks_across + (col0 / BLOCK_SIZE) as usize;
        let block = self.blocks[block_idx].get_or_init(|| self.fill_block(col0, row0, width));
        let local = ((row - row0) * width + (col - col0)) as usize;
        Some(&block[local])
    }

    fn materialized(&self) -> usize {
        self.blocks.iter().filter_map(|b| b.get()).map(|b| b.len()).sum()
    }
}

impl<T> fmt::Debug for BlockedStorage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockedStorage")
            .field("size", &self.size)
            .field("blocks", &self.blocks.len())
            .field("materialized_blocks", &self.materialized_blocks())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Which storage layout to use for a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StorageKind {
    /// Always [`FlatStorage`].
    Flat,
    /// Always [`BlockedStorage`].
    Blocked,
    /// [`BlockedStorage`] above [`AUTO_BLOCKED_THRESHOLD`] hexes, otherwise
    /// [`FlatStorage`]. This is the default.
    #[default]
    Auto,
}

impl StorageKind {
    /// The concrete layout for a board of `size` (never `Auto`).
    pub fn resolve(self, size: BoardSize) -> StorageKind {
        match self {
            StorageKind::Auto if size.len() > AUTO_BLOCKED_THRESHOLD => StorageKind::Blocked,
            StorageKind::Auto => StorageKind::Flat,
            other => other,
        }
    }
}

/// Either storage layout behind one type.
#[derive(Debug)]
pub enum Storage<T> {
    Flat(FlatStorage<T>),
    Blocked(BlockedStorage<T>),
}

impl<T> Storage<T> {
    /// Create a store of the layout `kind` resolves to for `size`.
    pub fn new(
        kind: StorageKind,
        size: BoardSize,
        factory: impl Fn(HexCoord) -> T + Send + Sync + 'static,
    ) -> Self {
        let factory: Factory<T> = Box::new(factory);
        match kind.resolve(size) {
            StorageKind::Blocked => Storage::Blocked(BlockedStorage::with_factory(size, factory)),
            _ => Storage::Flat(FlatStorage::with_factory(size, factory)),
        }
    }

    /// The concrete layout in use.
    pub fn kind(&self) -> StorageKind {
        match self {
            Storage::Flat(_) => StorageKind::Flat,
            Storage::Blocked(_) => StorageKind::Blocked,
        }
    }
}

impl<T> BoardStorage<T> for Storage<T> {
    #[inline]
    fn size(&self) -> BoardSize {
        match self {
            Storage::Flat(s) => s.size(),
            Storage::Blocked(s) => s.size(),
        }
    }

    #[inline]
    fn get(&self, coord: HexCoord) -> Option<&T> {
        match self {
            Storage::Flat(s) => s.get(coord),
            Storage::Blocked(s) => s.get(coord),
        }
    }

    fn materialized(&self) -> usize {
        match self {
            Storage::Flat(s) => s.materialized(),
            Storage::Blocked(s) => s.materialized(),
        }
    }
}
