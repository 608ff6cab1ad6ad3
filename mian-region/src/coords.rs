//! Conversions between region filenames, chunk and block coordinates.
//!
//! All chunk → region conversions floor toward negative infinity, so chunk
//! `-1` lives in region `-1` at local index `31`.

use std::ops::RangeInclusive;

use crate::{CHUNK_WIDTH, REGION_SIZE};

/// Convert chunk coordinates to local region coordinates (0-31).
#[inline]
pub fn chunk_to_local(chunk_coord: i32) -> i32 {
    chunk_coord.rem_euclid(REGION_SIZE)
}

/// Convert chunk coordinates to region coordinates.
#[inline]
pub fn chunk_to_region(chunk_coord: i32) -> i32 {
    chunk_coord.div_euclid(REGION_SIZE)
}

/// Calculate the header slot for a chunk within a region (0-1023).
#[inline]
pub fn local_to_slot(local_x: i32, local_z: i32) -> usize {
    (chunk_to_local(local_z) * REGION_SIZE + chunk_to_local(local_x)) as usize
}

/// Calculate local coordinates from a header slot.
#[inline]
pub fn slot_to_local(slot: usize) -> (i32, i32) {
    let local_x = (slot % REGION_SIZE as usize) as i32;
    let local_z = (slot / REGION_SIZE as usize) as i32;
    (local_x, local_z)
}

/// Whether every block coordinate of region `region_coord` fits in `i32`.
pub fn region_in_range(region_coord: i32) -> bool {
    let blocks = REGION_SIZE * CHUNK_WIDTH as i32;
    region_coord
        .checked_mul(blocks)
        .and_then(|start| start.checked_add(blocks - 1))
        .is_some()
}

/// Chunk coordinates covered by one region axis.
pub fn region_chunk_range(region_coord: i32) -> RangeInclusive<i32> {
    let start = region_coord * REGION_SIZE;
    start..=start + REGION_SIZE - 1
}

/// Block coordinates covered by one chunk axis.
pub fn chunk_block_range(chunk_coord: i32) -> RangeInclusive<i32> {
    let start = chunk_coord * CHUNK_WIDTH as i32;
    start..=start + CHUNK_WIDTH as i32 - 1
}

/// Region file coordinates (parsed from filename like "r.0.-1.mcr").
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct RegionPos {
    pub x: i32,
    pub z: i32,
}

impl RegionPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Parse region position from filename (e.g., "r.0.-1.mcr").
    ///
    /// Both the McRegion (`mcr`) and Anvil (`mca`) extensions are accepted.
    /// Positions whose block coordinates would overflow `i32` are rejected.
    pub fn from_filename(name: &str) -> Option<Self> {
        let parts: Vec<&str> = name.split('.').collect();
        if parts.len() == 4 && parts[0] == "r" && matches!(parts[3], "mcr" | "mca") {
            let x = parts[1].parse().ok()?;
            let z = parts[2].parse().ok()?;
            (region_in_range(x) && region_in_range(z)).then_some(Self { x, z })
        } else {
            None
        }
    }

    /// Parse the final component of `path` as a region filename.
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.file_name()?.to_str().and_then(Self::from_filename)
    }

    /// McRegion filename for this position.
    pub fn file_name(&self) -> String {
        format!("r.{}.{}.mcr", self.x, self.z)
    }

    /// Convert local chunk coordinates to world chunk coordinates.
    pub fn local_to_world(&self, local_x: i32, local_z: i32) -> ChunkPos {
        ChunkPos::new(
            self.x * REGION_SIZE + local_x,
            self.z * REGION_SIZE + local_z,
        )
    }

    /// Lowest chunk (both axes) stored in this region.
    pub fn min_chunk(&self) -> ChunkPos {
        self.local_to_world(0, 0)
    }

    /// Highest chunk (both axes) stored in this region.
    pub fn max_chunk(&self) -> ChunkPos {
        self.local_to_world(REGION_SIZE - 1, REGION_SIZE - 1)
    }
}

/// World chunk coordinates.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub fn region(&self) -> RegionPos {
        RegionPos::new(chunk_to_region(self.x), chunk_to_region(self.z))
    }

    /// Coordinates within the owning region (0-31 on both axes).
    pub fn local(&self) -> (i32, i32) {
        (chunk_to_local(self.x), chunk_to_local(self.z))
    }

    pub fn slot(&self) -> usize {
        local_to_slot(self.x, self.z)
    }

    /// First block (both axes) of this chunk.
    pub fn min_block(&self) -> (i32, i32) {
        (*chunk_block_range(self.x).start(), *chunk_block_range(self.z).start())
    }

    /// Last block (both axes) of this chunk.
    pub fn max_block(&self) -> (i32, i32) {
        (*chunk_block_range(self.x).end(), *chunk_block_range(self.z).end())
    }
}
