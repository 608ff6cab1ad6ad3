//! Block-identifier arrays and their extraction from decompressed chunks.
//!
//! McRegion chunks keep one byte per voxel in `Level.Blocks`, a 32768-byte
//! NBT byte array ordered `y + z * 128 + x * 128 * 16` (height fastest).

use fastnbt::ByteArray;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::{BLOCKS_PER_CHUNK, CHUNK_HEIGHT, CHUNK_WIDTH};

/// NBT name of the block-identifier field.
pub const BLOCKS_TAG: &[u8] = b"Blocks";

/// The 16x16x128 block identifiers of one chunk.
#[derive(Clone, PartialEq, Eq)]
pub struct BlockArray(Box<[u8; BLOCKS_PER_CHUNK]>);

impl BlockArray {
    pub fn from_vec(bytes: Vec<u8>) -> Result<Self> {
        let len = bytes.len();
        bytes
            .into_boxed_slice()
            .try_into()
            .map(BlockArray)
            .map_err(|_| Error::BlockArrayLength(len))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Self::from_vec(bytes.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }

    /// Identifier at chunk-local coordinates (x, z: 0..16, y: 0..128).
    pub fn get(&self, x: usize, y: usize, z: usize) -> u8 {
        debug_assert!(x < CHUNK_WIDTH && z < CHUNK_WIDTH && y < CHUNK_HEIGHT);
        self.0[y + z * CHUNK_HEIGHT + x * CHUNK_HEIGHT * CHUNK_WIDTH]
    }

    /// Vertical columns, each `CHUNK_HEIGHT` bytes indexed by altitude.
    pub fn columns(&self) -> std::slice::ChunksExact<'_, u8> {
        self.0.chunks_exact(CHUNK_HEIGHT)
    }

    /// All identifiers at altitude `y`.
    pub fn layer(&self, y: usize) -> impl Iterator<Item = u8> + '_ {
        self.0[y..].iter().step_by(CHUNK_HEIGHT).copied()
    }

    /// Occurrences of `id` in the whole chunk.
    pub fn count(&self, id: u8) -> usize {
        self.0.iter().filter(|&&b| b == id).count()
    }
}

impl std::fmt::Debug for BlockArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BlockArray({:02X?}..)", &self.0[..8])
    }
}

/// Bytes between the end of the `Blocks` name and the array data, per
/// on-disk revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerFraming {
    /// The NBT array length (`00 00 80 00`) sits between name and data.
    LengthPrefixed,
    /// Data follows the name directly.
    Bare,
}

impl MarkerFraming {
    pub fn skip(self) -> usize {
        match self {
            MarkerFraming::LengthPrefixed => 4,
            MarkerFraming::Bare => 0,
        }
    }
}

/// How the block array is located inside a decompressed chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockExtractor {
    /// Typed NBT read of `Level.Blocks`; every other field is skipped.
    #[default]
    TagWalk,
    /// Byte search for the `Blocks` name followed by a fixed skip.
    ///
    /// Faster, but a chance match of the name inside earlier binary data
    /// yields the wrong bytes without any error.
    MarkerScan(MarkerFraming),
}

// Only the one field we need; fastnbt skips the rest of the tree.
#[derive(Deserialize)]
struct LegacyChunk {
    #[serde(rename = "Level")]
    level: Option<LegacyLevel>,
}

#[derive(Deserialize)]
struct LegacyLevel {
    #[serde(rename = "Blocks")]
    blocks: Option<ByteArray>,
}

impl BlockExtractor {
    pub fn extract(&self, chunk: &[u8]) -> Result<BlockArray> {
        match self {
            BlockExtractor::TagWalk => {
                let parsed: LegacyChunk = fastnbt::from_bytes(chunk).map_err(Error::Nbt)?;
                let blocks = parsed
                    .level
                    .and_then(|level| level.blocks)
                    .ok_or(Error::MissingBlocks)?;
                BlockArray::from_vec(blocks.into_inner().into_iter().map(|b| b as u8).collect())
            }
            BlockExtractor::MarkerScan(framing) => {
                let index = chunk
                    .windows(BLOCKS_TAG.len())
                    .position(|w| w == BLOCKS_TAG)
                    .ok_or(Error::MissingBlocks)?;
                let start = index + BLOCKS_TAG.len() + framing.skip();
                let end = start + BLOCKS_PER_CHUNK;
                if end > chunk.len() {
                    return Err(Error::BlockArrayLength(chunk.len().saturating_sub(start)));
                }
                BlockArray::from_slice(&chunk[start..end])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{chunk_nbt, pattern};

    #[test]
    fn test_tag_walk() {
        let blocks = pattern(3);
        let nbt = chunk_nbt(&blocks);
        let array = BlockExtractor::TagWalk.extract(&nbt).unwrap();
        assert_eq!(array.as_bytes(), &blocks[..]);
    }

    #[test]
    fn test_marker_scan_length_prefixed() {
        let blocks = pattern(11);
        let nbt = chunk_nbt(&blocks);
        let array = BlockExtractor::MarkerScan(MarkerFraming::LengthPrefixed)
            .extract(&nbt)
            .unwrap();
        assert_eq!(array.as_bytes(), &blocks[..]);
    }

    #[test]
    fn test_marker_scan_bare() {
        let blocks = pattern(5);
        let mut raw = b"junk".to_vec();
        raw.extend_from_slice(BLOCKS_TAG);
        raw.extend_from_slice(&blocks);

        let array = BlockExtractor::MarkerScan(MarkerFraming::Bare).extract(&raw).unwrap();
        assert_eq!(array.as_bytes(), &blocks[..]);
    }

    #[test]
    fn test_tag_walk_ignores_marker_in_earlier_data() {
        // A string value containing "Blocks" ahead of the real field.
        let blocks = pattern(1);
        let nbt = crate::fixture::chunk_nbt_with_decoy(&blocks, "Blocks everywhere");

        let walked = BlockExtractor::TagWalk.extract(&nbt).unwrap();
        assert_eq!(walked.as_bytes(), &blocks[..]);

        let scanned = BlockExtractor::MarkerScan(MarkerFraming::LengthPrefixed).extract(&nbt);
        assert!(scanned.map(|a| a.as_bytes() != &blocks[..]).unwrap_or(true));
    }

    #[test]
    fn test_missing_blocks() {
        let err = BlockExtractor::MarkerScan(MarkerFraming::Bare)
            .extract(b"no marker here")
            .unwrap_err();
        assert!(matches!(err, Error::MissingBlocks));

        let nbt = crate::fixture::chunk_nbt_without_blocks();
        let err = BlockExtractor::TagWalk.extract(&nbt).unwrap_err();
        assert!(matches!(err, Error::MissingBlocks));
    }

    #[test]
    fn test_short_array() {
        let mut raw = BLOCKS_TAG.to_vec();
        raw.extend_from_slice(&[0u8; 100]);
        let err = BlockExtractor::MarkerScan(MarkerFraming::Bare).extract(&raw).unwrap_err();
        assert!(matches!(err, Error::BlockArrayLength(100)));

        let nbt = chunk_nbt(&[1u8; 16]);
        let err = BlockExtractor::TagWalk.extract(&nbt).unwrap_err();
        assert!(matches!(err, Error::BlockArrayLength(16)));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = BlockExtractor::TagWalk.extract(&[0xFF, 0x00, 0x13]).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Decode);
    }

    #[test]
    fn test_layout() {
        let mut bytes = vec![0u8; BLOCKS_PER_CHUNK];
        // x = 2, z = 3, y = 64
        bytes[64 + 3 * 128 + 2 * 128 * 16] = 56;
        let array = BlockArray::from_vec(bytes).unwrap();
        assert_eq!(array.get(2, 64, 3), 56);
        assert_eq!(array.layer(64).filter(|&b| b == 56).count(), 1);
        assert_eq!(array.layer(63).filter(|&b| b == 56).count(), 0);
        assert_eq!(array.layer(0).count(), 256);
        assert_eq!(array.columns().count(), 256);
        assert_eq!(array.count(56), 1);
    }
}
