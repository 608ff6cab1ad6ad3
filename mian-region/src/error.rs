use std::fmt;
use std::io;

/// Broad class of a region [`Error`].
///
/// Scanners use this to decide how to report a failure; all three classes are
/// recoverable at the container level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The bytes do not match the expected container/chunk layout.
    Format,
    /// A well-framed payload failed to decompress or decode.
    Decode,
    /// The underlying stream failed.
    Io,
}

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    /// Header shorter than the locations sector.
    TruncatedHeader { available: usize },
    /// Chunk payload length field of zero (no room for the compression tag).
    EmptyPayload { sector: u32 },
    /// Fewer bytes left in the stream than the length field promises.
    TruncatedPayload { sector: u32, expected: usize, available: usize },
    UnknownCompression(u8),
    Decompress(io::Error),
    Nbt(fastnbt::error::Error),
    /// The block-array marker or field is not present in the payload.
    MissingBlocks,
    /// The block array is present but not 32768 bytes long.
    BlockArrayLength(usize),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::Decompress(_) | Error::Nbt(_) => ErrorKind::Decode,
            Error::TruncatedHeader { .. }
            | Error::EmptyPayload { .. }
            | Error::TruncatedPayload { .. }
            | Error::UnknownCompression(_)
            | Error::MissingBlocks
            | Error::BlockArrayLength(_) => ErrorKind::Format,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::TruncatedHeader { available } => {
                write!(f, "region header truncated: {} of 4096 bytes", available)
            }
            Error::EmptyPayload { sector } => {
                write!(f, "chunk at sector {} has a zero length field", sector)
            }
            Error::TruncatedPayload { sector, expected, available } => write!(
                f,
                "chunk at sector {} truncated: expected {} bytes, {} available",
                sector, expected, available
            ),
            Error::UnknownCompression(tag) => write!(f, "unknown compression type: {}", tag),
            Error::Decompress(e) => write!(f, "decompression failed: {}", e),
            Error::Nbt(e) => write!(f, "NBT decoding failed: {}", e),
            Error::MissingBlocks => f.write_str("chunk has no Blocks array"),
            Error::BlockArrayLength(len) => {
                write!(f, "Blocks array has {} bytes, expected 32768", len)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) | Error::Decompress(e) => Some(e),
            Error::Nbt(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
