//! Chunk payload framing: `[Length: 4][Type: 1][Data...]` at `offset * 4096`.

use std::io::{Read, Seek, SeekFrom};

use crate::SECTOR_BYTES;
use crate::compression::Compression;
use crate::error::{Error, Result};

/// A chunk payload as stored in the region file, still compressed.
#[derive(Debug, Clone)]
pub struct ChunkPayload {
    pub compression: Compression,
    pub data: Vec<u8>,
}

impl ChunkPayload {
    /// Read the payload stored at `sector`.
    ///
    /// Exactly `length` bytes of compressed data follow the compression byte.
    /// Never reads past the end of `reader`.
    pub fn read<R: Read + Seek>(reader: &mut R, sector: u32) -> Result<Self> {
        debug_assert!(sector != 0, "sector 0 holds the header");
        reader.seek(SeekFrom::Start(sector as u64 * SECTOR_BYTES as u64))?;

        let mut head = [0u8; 5];
        let got = read_up_to(reader, &mut head)?;
        if got < head.len() {
            return Err(Error::TruncatedPayload { sector, expected: head.len(), available: got });
        }

        let length = u32::from_be_bytes([head[0], head[1], head[2], head[3]]) as usize;
        if length == 0 {
            return Err(Error::EmptyPayload { sector });
        }
        let compression = Compression::try_from(head[4])?;

        let expected = length;
        let mut data = Vec::new();
        reader.by_ref().take(expected as u64).read_to_end(&mut data)?;
        if data.len() < expected {
            return Err(Error::TruncatedPayload { sector, expected, available: data.len() });
        }

        Ok(Self { compression, data })
    }

    pub fn decompress(&self) -> Result<Vec<u8>> {
        self.compression.decompress(&self.data)
    }
}

fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}
