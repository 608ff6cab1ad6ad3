use std::fmt;

/// Run-level scan failures. Per-chunk and per-region problems are logged and
/// skipped instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// No region files were given (or none had a parseable name, in area mode).
    NoRegions,
    /// Every region file failed to open or parse.
    NoReadableRegions { skipped: usize },
    NoBlockTypes,
    /// Regions were read but none of the requested blocks occur in them.
    NoRecognizedBlocks,
    /// The regions span a grid larger than an area scan will allocate.
    AreaTooLarge { width: usize, depth: usize },
    Cancelled,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::NoRegions => f.write_str("no region files found"),
            ScanError::NoReadableRegions { skipped } => {
                write!(f, "none of the {} region files could be read", skipped)
            }
            ScanError::NoBlockTypes => f.write_str("no block types selected"),
            ScanError::NoRecognizedBlocks => f.write_str("no blocks were recognized"),
            ScanError::AreaTooLarge { width, depth } => {
                write!(f, "area of {} x {} chunks is too large to map", width, depth)
            }
            ScanError::Cancelled => f.write_str("scan cancelled"),
        }
    }
}

impl std::error::Error for ScanError {}
