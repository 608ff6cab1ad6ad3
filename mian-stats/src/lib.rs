//! Block statistics over McRegion worlds: per-altitude histograms and
//! per-chunk area maps.

pub mod area;
mod error;
pub mod layers;
mod scan;

pub use area::{AreaMap, Bounds, EMPTY_CELL, MAX_AREA_CELLS};
pub use error::ScanError;
pub use layers::{BlockSet, LayerHistogram, LayerSeries};
pub use scan::{ScanSummary, Scanner};
