//! Per-chunk counts of one block laid out on the chunk grid.

use mian_region::coords::{chunk_block_range, region_chunk_range};
use mian_region::{BlockArray, ChunkPos, RegionPos};
use serde::Serialize;

/// Cell value for chunks with no data (absent chunk, missing or unreadable
/// region). Distinct from a count of zero.
pub const EMPTY_CELL: i64 = -10;

/// Largest grid an area scan will allocate (4096 x 4096 chunks).
pub const MAX_AREA_CELLS: usize = 1 << 24;

/// Inclusive bounding box, in chunk or block coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bounds {
    pub min_x: i32,
    pub min_z: i32,
    pub max_x: i32,
    pub max_z: i32,
}

impl Bounds {
    /// Chunk bounds covering every chunk of every region in `regions`.
    pub fn from_regions<I: IntoIterator<Item = RegionPos>>(regions: I) -> Option<Self> {
        regions.into_iter().fold(None, |acc, region| {
            let xs = region_chunk_range(region.x);
            let zs = region_chunk_range(region.z);
            let next = Bounds {
                min_x: *xs.start(),
                min_z: *zs.start(),
                max_x: *xs.end(),
                max_z: *zs.end(),
            };
            Some(match acc {
                None => next,
                Some(b) => Bounds {
                    min_x: b.min_x.min(next.min_x),
                    min_z: b.min_z.min(next.min_z),
                    max_x: b.max_x.max(next.max_x),
                    max_z: b.max_z.max(next.max_z),
                },
            })
        })
    }

    /// Block bounds of these chunk bounds.
    pub fn to_blocks(&self) -> Bounds {
        Bounds {
            min_x: *chunk_block_range(self.min_x).start(),
            min_z: *chunk_block_range(self.min_z).start(),
            max_x: *chunk_block_range(self.max_x).end(),
            max_z: *chunk_block_range(self.max_z).end(),
        }
    }

    pub fn width(&self) -> usize {
        (i64::from(self.max_x) - i64::from(self.min_x) + 1) as usize
    }

    pub fn depth(&self) -> usize {
        (i64::from(self.max_z) - i64::from(self.min_z) + 1) as usize
    }

    /// Number of grid cells, or None if it does not fit in `usize`.
    pub fn cell_count(&self) -> Option<usize> {
        self.width().checked_mul(self.depth())
    }

    pub fn contains(&self, pos: ChunkPos) -> bool {
        (self.min_x..=self.max_x).contains(&pos.x) && (self.min_z..=self.max_z).contains(&pos.z)
    }

    /// Row-major cell index (rows along z).
    fn index(&self, pos: ChunkPos) -> Option<usize> {
        if !self.contains(pos) {
            return None;
        }
        let col = (pos.x - self.min_x) as usize;
        let row = (pos.z - self.min_z) as usize;
        Some(row * self.width() + col)
    }
}

/// Grid of one block's per-chunk counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaMap {
    block: u8,
    bounds: Bounds,
    cells: Vec<i64>,
}

impl AreaMap {
    /// A map with every cell set to [`EMPTY_CELL`].
    ///
    /// Allocates [`Bounds::cell_count`] cells; callers check it against
    /// [`MAX_AREA_CELLS`] first.
    pub fn new(block: u8, bounds: Bounds) -> Self {
        let cells = vec![EMPTY_CELL; bounds.width() * bounds.depth()];
        Self { block, bounds, cells }
    }

    pub fn block(&self) -> u8 {
        self.block
    }

    /// Chunk bounds of the grid.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Count the block in `array` and store it at `pos`.
    /// Returns false if `pos` is outside the grid.
    pub fn record(&mut self, pos: ChunkPos, array: &BlockArray) -> bool {
        self.set(pos, array.count(self.block) as i64)
    }

    pub fn set(&mut self, pos: ChunkPos, value: i64) -> bool {
        match self.bounds.index(pos) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, pos: ChunkPos) -> Option<i64> {
        self.bounds.index(pos).map(|i| self.cells[i])
    }

    /// Rows of cells, north to south (ascending z), each west to east.
    pub fn rows(&self) -> std::slice::Chunks<'_, i64> {
        self.cells.chunks(self.bounds.width())
    }

    /// Sum of all non-empty cells.
    pub fn total(&self) -> u64 {
        self.cells.iter().filter(|&&c| c > 0).map(|&c| c as u64).sum()
    }

    /// Number of cells backed by a decoded chunk.
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|&&c| c != EMPTY_CELL).count()
    }
}
