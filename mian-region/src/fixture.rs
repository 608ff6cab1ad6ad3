//! Synthetic region files for tests.
//!
//! Available to this crate's tests and, through the `fixture` feature, to
//! tests of downstream crates. Panics instead of returning errors.

use std::io::Write;
use std::path::{Path, PathBuf};

use fastnbt::ByteArray;
use serde::Serialize;

use crate::compression::Compression;
use crate::coords::{RegionPos, local_to_slot};
use crate::{BLOCKS_PER_CHUNK, HEADER_BYTES, SECTOR_BYTES};

#[derive(Serialize)]
struct Chunk {
    #[serde(rename = "Level")]
    level: Level,
}

#[derive(Serialize)]
struct DecoyChunk {
    #[serde(rename = "Comment")]
    comment: String,
    #[serde(rename = "Level")]
    level: Level,
}

#[derive(Serialize)]
struct Level {
    #[serde(rename = "xPos")]
    x_pos: i32,
    #[serde(rename = "zPos")]
    z_pos: i32,
    #[serde(rename = "Blocks")]
    blocks: ByteArray,
}

#[derive(Serialize)]
struct BareChunk {
    #[serde(rename = "Level")]
    level: BareLevel,
}

#[derive(Serialize)]
struct BareLevel {
    #[serde(rename = "xPos")]
    x_pos: i32,
    #[serde(rename = "zPos")]
    z_pos: i32,
}

fn level(blocks: &[u8]) -> Level {
    Level {
        x_pos: 0,
        z_pos: 0,
        blocks: ByteArray::new(blocks.iter().map(|&b| b as i8).collect()),
    }
}

/// A deterministic 32768-byte block array that differs per `seed`.
pub fn pattern(seed: u8) -> Vec<u8> {
    (0..BLOCKS_PER_CHUNK)
        .map(|i| ((i * 31 + seed as usize * 7) % 97) as u8)
        .collect()
}

/// Uncompressed NBT of a chunk holding `blocks` in `Level.Blocks`.
pub fn chunk_nbt(blocks: &[u8]) -> Vec<u8> {
    fastnbt::to_bytes(&Chunk { level: level(blocks) }).expect("serialize chunk")
}

/// Like [`chunk_nbt`], with a string field containing `decoy` stored first.
pub fn chunk_nbt_with_decoy(blocks: &[u8], decoy: &str) -> Vec<u8> {
    let chunk = DecoyChunk { comment: decoy.to_string(), level: level(blocks) };
    fastnbt::to_bytes(&chunk).expect("serialize chunk")
}

/// Chunk NBT with a `Level` compound but no `Blocks` field.
pub fn chunk_nbt_without_blocks() -> Vec<u8> {
    fastnbt::to_bytes(&BareChunk { level: BareLevel { x_pos: 0, z_pos: 0 } })
        .expect("serialize chunk")
}

/// Compress `data` and frame it as `[Length: 4][Type: 1][Data...]`.
pub fn wrap_chunk(data: &[u8], compression: Compression) -> Vec<u8> {
    let compressed = match compression {
        Compression::Gzip => {
            let mut encoder =
                flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(data).expect("gzip");
            encoder.finish().expect("gzip")
        }
        Compression::Zlib => {
            let mut encoder =
                flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(data).expect("zlib");
            encoder.finish().expect("zlib")
        }
    };

    let mut blob = Vec::with_capacity(compressed.len() + 5);
    blob.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
    blob.push(compression.tag());
    blob.extend_from_slice(&compressed);
    blob
}

/// Lays out chunk blobs into a region file image.
#[derive(Default)]
pub struct RegionBuilder {
    chunks: Vec<(usize, Vec<u8>)>,
}

impl RegionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chunk with the given block array. Chunks are stored in the file
    /// in the order they are added.
    pub fn chunk(
        self,
        local_x: i32,
        local_z: i32,
        blocks: &[u8],
        compression: Compression,
    ) -> Self {
        self.raw(local_x, local_z, wrap_chunk(&chunk_nbt(blocks), compression))
    }

    /// Add an already framed blob as-is.
    pub fn raw(mut self, local_x: i32, local_z: i32, blob: Vec<u8>) -> Self {
        self.chunks.push((local_to_slot(local_x, local_z), blob));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut file = vec![0u8; HEADER_BYTES];
        let mut sector = (HEADER_BYTES / SECTOR_BYTES) as u32;

        for (slot, blob) in &self.chunks {
            let count = blob.len().div_ceil(SECTOR_BYTES).max(1);
            let at = slot * 4;
            file[at] = ((sector >> 16) & 0xFF) as u8;
            file[at + 1] = ((sector >> 8) & 0xFF) as u8;
            file[at + 2] = (sector & 0xFF) as u8;
            file[at + 3] = count as u8;

            file.extend_from_slice(blob);
            file.resize((sector as usize + count) * SECTOR_BYTES, 0);
            sector += count as u32;
        }
        file
    }

    /// Write the region into `dir` under its canonical filename.
    pub fn write_to(&self, dir: &Path, pos: RegionPos) -> PathBuf {
        let path = dir.join(pos.file_name());
        std::fs::write(&path, self.build()).expect("write region");
        path
    }
}
