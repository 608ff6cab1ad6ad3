//! Minecraft McRegion file format (.mcr), read-only.
//!
//! Region files contain 32x32 chunks in a specific binary format:
//! - Bytes 0-4095: Location table (1024 entries × 4 bytes)
//! - Bytes 4096-8191: Timestamp table (1024 entries × 4 bytes)
//! - Bytes 8192+: Chunk data (variable size sectors)

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

mod blocks;
mod compression;
pub mod coords;
mod error;
mod header;
mod payload;

#[cfg(any(test, feature = "fixture"))]
pub mod fixture;

pub use blocks::{BLOCKS_TAG, BlockArray, BlockExtractor, MarkerFraming};
pub use compression::Compression;
pub use coords::{ChunkPos, RegionPos};
pub use error::{Error, ErrorKind, Result};
pub use header::{SectorEntry, SectorTable};
pub use payload::ChunkPayload;

/// Size of one sector in bytes (4 KB).
pub const SECTOR_BYTES: usize = 4096;

/// Total header size (location table + timestamp table).
pub const HEADER_BYTES: usize = SECTOR_BYTES * 2; // 8192 bytes

/// Number of chunks per region dimension.
pub const REGION_SIZE: i32 = 32;

/// Number of chunks a region can hold.
pub const REGION_CHUNKS: usize = (REGION_SIZE * REGION_SIZE) as usize;

/// Blocks per chunk along x and z.
pub const CHUNK_WIDTH: usize = 16;

/// Blocks per chunk along y; also the number of altitude layers.
pub const CHUNK_HEIGHT: usize = 128;

/// Length of a chunk's block-identifier array.
pub const BLOCKS_PER_CHUNK: usize = CHUNK_WIDTH * CHUNK_WIDTH * CHUNK_HEIGHT; // 32768

/// An open region file with its location table.
pub struct RegionFile<R> {
    reader: R,
    table: SectorTable,
}

impl RegionFile<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> RegionFile<R> {
    /// Read the location table from `reader`.
    pub fn new(mut reader: R) -> Result<Self> {
        let table = SectorTable::read(&mut reader)?;
        Ok(Self { reader, table })
    }

    pub fn table(&self) -> &SectorTable {
        &self.table
    }

    /// Read and decompress the chunk described by `entry`.
    pub fn read_chunk(&mut self, entry: &SectorEntry) -> Result<Vec<u8>> {
        let payload = ChunkPayload::read(&mut self.reader, entry.offset)?;
        log::trace!(
            "Chunk {:?} at sector {}: {} bytes, {:?}",
            entry.local(),
            entry.offset,
            payload.data.len(),
            payload.compression
        );
        payload.decompress()
    }

    /// Block identifiers of the chunk described by `entry`.
    pub fn blocks(&mut self, entry: &SectorEntry, extractor: BlockExtractor) -> Result<BlockArray> {
        let chunk = self.read_chunk(entry)?;
        extractor.extract(&chunk)
    }

    /// Block identifiers of the chunk at local coordinates.
    /// Returns None without touching the file if the chunk is absent.
    pub fn blocks_at(
        &mut self,
        local_x: i32,
        local_z: i32,
        extractor: BlockExtractor,
    ) -> Result<Option<BlockArray>> {
        match self.table.get(local_x, local_z) {
            Some(entry) => self.blocks(&entry, extractor).map(Some),
            None => Ok(None),
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}
