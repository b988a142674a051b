//! The [`Board`]: lazily built [`Hex`] storage plus movement queries.

use crate::error::BoardError;
use crate::geom::{BoardSize, HexCoord, Hexside};
use crate::hex::{Cost, Hex};
use crate::storage::{BoardStorage, Storage, StorageKind};

/// A hex board.
///
/// Hexes are built by the factory supplied at construction, on first access,
/// and never change afterwards. A board is `Send + Sync` and can be shared
/// between concurrent readers.
#[derive(Debug)]
pub struct Board {
    storage: Storage<Hex>,
}

impl Board {
    /// Largest accepted column or row count.
    pub const MAX_DIM: i32 = 1 << 16;

    /// Create a board of `size` using the storage layout picked by
    /// [`StorageKind::Auto`].
    pub fn new(
        size: BoardSize,
        factory: impl Fn(HexCoord) -> Hex + Send + Sync + 'static,
    ) -> Result<Self, BoardError> {
        Self::with_storage(size, StorageKind::Auto, factory)
    }

    /// Create a board with an explicit storage layout.
    ///
    /// # Panics
    ///
    /// Accessing a hex panics if `factory` returns a hex for a different
    /// coordinate than the one requested.
    pub fn with_storage(
        size: BoardSize,
        kind: StorageKind,
        factory: impl Fn(HexCoord) -> Hex + Send + Sync + 'static,
    ) -> Result<Self, BoardError> {
        if size.is_empty() {
            return Err(BoardError::Empty {
                cols: size.cols,
                rows: size.rows,
            });
        }
        if size.cols > Self::MAX_DIM || size.rows > Self::MAX_DIM {
            return Err(BoardError::TooLarge {
                cols: size.cols,
                rows: size.rows,
                max: Self::MAX_DIM,
            });
        }
        let checked = move |c: HexCoord| {
            let hex = factory(c);
            assert_eq!(
                hex.coord(),
                c,
                "hex factory built {} when asked for {}",
                hex.coord(),
                c
            );
            hex
        };
        let storage = Storage::new(kind, size, checked);
        log::debug!("board {size} using {:?} storage", storage.kind());
        Ok(Self { storage })
    }

    /// A board where every hex is flat ground costing `cost` to leave.
    pub fn uniform(size: BoardSize, cost: Cost) -> Result<Self, BoardError> {
        Self::new(size, move |c| Hex::uniform(c, cost))
    }

    /// Board extents.
    #[inline]
    pub fn size(&self) -> BoardSize {
        self.storage.size()
    }

    /// Storage layout in use.
    pub fn storage_kind(&self) -> StorageKind {
        self.storage.kind()
    }

    /// Number of hexes built so far.
    pub fn materialized(&self) -> usize {
        self.storage.materialized()
    }

    /// Whether `coord` is on the board.
    #[inline]
    pub fn contains(&self, coord: HexCoord) -> bool {
        self.size().contains(coord)
    }

    /// The hex at `coord`, or `None` at and beyond the board edge.
    #[inline]
    pub fn get(&self, coord: HexCoord) -> Option<&Hex> {
        self.storage.get(coord)
    }

    /// Cost of stepping from `from` across `exit` into its neighbour.
    ///
    /// `None` if `from` or the neighbour is off the board, or if `from`
    /// cannot be left through `exit`.
    #[inline]
    pub fn step_cost(&self, from: HexCoord, exit: Hexside) -> Option<Cost> {
        if !self.contains(from.neighbor(exit)) {
            return None;
        }
        self.get(from)?.step_cost(exit)
    }
}
