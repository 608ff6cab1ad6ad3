//! Region file header parsing.
//!
//! The header consists of two tables:
//! - Location table: where each chunk is stored
//! - Timestamp table: when each chunk was last saved (not read here)

use std::io::{Read, Seek, SeekFrom};

use super::coords::{local_to_slot, slot_to_local};
use super::{REGION_CHUNKS, SECTOR_BYTES};
use crate::error::{Error, Result};

/// One non-empty entry of the location table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorEntry {
    /// Index of the entry in the location table (`x + z * 32`).
    pub slot: u16,
    /// First sector of the chunk payload, counted from the start of the file.
    pub offset: u32,
    /// Number of sectors reserved for the chunk. Not validated.
    pub sectors: u8,
}

impl SectorEntry {
    /// Local chunk coordinates of this entry within its region.
    pub fn local(&self) -> (i32, i32) {
        slot_to_local(self.slot as usize)
    }

    /// Byte position of the chunk payload.
    pub fn byte_offset(&self) -> u64 {
        self.offset as u64 * SECTOR_BYTES as u64
    }
}

/// Parsed location table of a region file.
#[derive(Debug, Clone)]
pub struct SectorTable {
    /// Present entries, ascending by sector offset.
    entries: Vec<SectorEntry>,
    /// Position into `entries` for each slot, if present.
    slots: Vec<Option<u16>>,
}

impl SectorTable {
    /// Read the location table from the start of `reader`.
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        reader.seek(SeekFrom::Start(0))?;

        let mut locations = vec![0u8; SECTOR_BYTES];
        let mut filled = 0;
        while filled < SECTOR_BYTES {
            let n = reader.read(&mut locations[filled..])?;
            if n == 0 {
                return Err(Error::TruncatedHeader { available: filled });
            }
            filled += n;
        }

        Ok(Self::parse(&locations))
    }

    /// Parse a 4096-byte location table.
    pub fn parse(locations: &[u8]) -> Self {
        // Minecraft stores: [Offset:3 bytes][Count:1 byte] (Big Endian)
        let mut entries: Vec<SectorEntry> = locations
            .chunks_exact(4)
            .take(REGION_CHUNKS)
            .enumerate()
            .filter_map(|(slot, raw)| {
                let offset = u32::from_be_bytes([0, raw[0], raw[1], raw[2]]);
                if offset == 0 {
                    return None;
                }
                Some(SectorEntry { slot: slot as u16, offset, sectors: raw[3] })
            })
            .collect();

        // Reading in file order keeps seeks forward-only.
        entries.sort_by_key(|e| (e.offset, e.slot));

        let mut slots = vec![None; REGION_CHUNKS];
        for (position, entry) in entries.iter().enumerate() {
            slots[entry.slot as usize] = Some(position as u16);
        }

        Self { entries, slots }
    }

    /// Present chunks, ascending by sector offset.
    pub fn entries(&self) -> &[SectorEntry] {
        &self.entries
    }

    /// Entry for the chunk at local coordinates, if that chunk is present.
    pub fn get(&self, local_x: i32, local_z: i32) -> Option<SectorEntry> {
        let slot = local_to_slot(local_x, local_z);
        self.slots[slot].map(|position| self.entries[position as usize])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn put(header: &mut [u8], slot: usize, offset: u32, count: u8) {
        let at = slot * 4;
        header[at] = ((offset >> 16) & 0xFF) as u8;
        header[at + 1] = ((offset >> 8) & 0xFF) as u8;
        header[at + 2] = (offset & 0xFF) as u8;
        header[at + 3] = count;
    }

    #[test]
    fn test_two_chunks_ascending() {
        let mut header = vec![0u8; 8192];
        // (5,5) is stored before (0,0) in the file body.
        put(&mut header, local_to_slot(5, 5), 2, 1);
        put(&mut header, local_to_slot(0, 0), 3, 2);

        let table = SectorTable::read(&mut Cursor::new(header)).unwrap();
        assert_eq!(table.len(), 2);
        let entries = table.entries();
        assert_eq!(entries[0].offset, 2);
        assert_eq!(entries[0].local(), (5, 5));
        assert_eq!(entries[1].offset, 3);
        assert_eq!(entries[1].local(), (0, 0));
        assert_eq!(entries[1].sectors, 2);
    }

    #[test]
    fn test_lookup_by_local() {
        let mut header = vec![0u8; 4096];
        put(&mut header, local_to_slot(31, 0), 0x01_02_03, 4);

        let table = SectorTable::parse(&header);
        let entry = table.get(31, 0).unwrap();
        assert_eq!(entry.offset, 0x01_02_03);
        assert_eq!(entry.byte_offset(), 0x01_02_03 * 4096);
        assert_eq!(table.get(0, 0), None);
        // Wraps like world coordinates.
        assert_eq!(table.get(-1, 32), Some(entry));
    }

    #[test]
    fn test_empty_header() {
        let table = SectorTable::read(&mut Cursor::new(vec![0u8; 8192])).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_truncated_header() {
        let err = SectorTable::read(&mut Cursor::new(vec![0u8; 100])).unwrap_err();
        assert!(matches!(err, Error::TruncatedHeader { available: 100 }));
    }

    #[test]
    fn test_count_byte_does_not_make_entry_present() {
        let mut header = vec![0u8; 4096];
        header[3] = 7;
        assert!(SectorTable::parse(&header).is_empty());
    }
}
