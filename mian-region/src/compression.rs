use std::io::Read;

use crate::error::{Error, Result};

/// Compression types used in the McRegion format.
/// Same IDs as used by vanilla Minecraft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip = 1,
    Zlib = 2,
}

impl Compression {
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Decompress a chunk payload written with this scheme.
    pub fn decompress(self, compressed: &[u8]) -> Result<Vec<u8>> {
        let mut decompressed = Vec::new();
        let res = match self {
            Compression::Gzip => {
                flate2::read::GzDecoder::new(compressed).read_to_end(&mut decompressed)
            }
            Compression::Zlib if has_zlib_header(compressed) => {
                flate2::read::ZlibDecoder::new(compressed).read_to_end(&mut decompressed)
            }
            Compression::Zlib => {
                flate2::read::DeflateDecoder::new(compressed).read_to_end(&mut decompressed)
            }
        };
        res.map_err(Error::Decompress)?;
        Ok(decompressed)
    }
}

/// RFC 1950 header: deflate method, window <= 32K, check bits valid.
fn has_zlib_header(data: &[u8]) -> bool {
    match data {
        [cmf, flg, ..] => {
            cmf & 0x0F == 8 && cmf >> 4 <= 7 && (u16::from(*cmf) << 8 | u16::from(*flg)) % 31 == 0
        }
        _ => false,
    }
}

impl TryFrom<u8> for Compression {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            1 => Ok(Compression::Gzip),
            2 => Ok(Compression::Zlib),
            _ => Err(Error::UnknownCompression(tag)),
        }
    }
}
