//! JSON documents handed to the plotting side.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use mian_blocks::BlockTable;
use mian_stats::{AreaMap, Bounds, EMPTY_CELL, LayerHistogram, ScanSummary};
use serde::Serialize;

/// Plot X axis
pub const LABEL_X: &str = "Layer";

/// Plot Y axis
pub const LABEL_Y: &str = "Count";

#[derive(Debug, Serialize)]
pub struct Series {
    pub label: String,
    pub id: String,
    pub counts: Vec<u64>,
}

/// Altitude histogram: one line per block type.
#[derive(Debug, Serialize)]
pub struct LayerDocument {
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub log_scale: bool,
    pub series: Vec<Series>,
    pub summary: ScanSummary,
}

impl LayerDocument {
    pub fn new(
        title: String,
        table: &BlockTable,
        histogram: &LayerHistogram,
        log_scale: bool,
        summary: ScanSummary,
    ) -> Self {
        let series = histogram
            .series()
            .into_iter()
            .map(|s| Series {
                label: table.label(s.id),
                id: format!("{:02X}", s.id),
                counts: s.counts,
            })
            .collect();
        Self { title, x_label: LABEL_X, y_label: LABEL_Y, log_scale, series, summary }
    }
}

/// Area map: per-chunk counts of one block type.
#[derive(Debug, Serialize)]
pub struct AreaDocument {
    pub title: String,
    pub label: String,
    pub id: String,
    pub empty_cell: i64,
    pub chunk_bounds: Bounds,
    pub block_bounds: Bounds,
    /// Rows along z (north to south), columns along x (west to east).
    pub grid: Vec<Vec<i64>>,
    pub summary: ScanSummary,
}

impl AreaDocument {
    pub fn new(title: String, table: &BlockTable, map: &AreaMap, summary: ScanSummary) -> Self {
        Self {
            title,
            label: table.label(map.block()),
            id: format!("{:02X}", map.block()),
            empty_cell: EMPTY_CELL,
            chunk_bounds: map.bounds(),
            block_bounds: map.bounds().to_blocks(),
            grid: map.rows().map(<[i64]>::to_vec).collect(),
            summary,
        }
    }
}

/// Write `doc` as pretty JSON to `path`, or stdout when `path` is None.
pub fn write<T: Serialize>(doc: &T, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            log::info!("Saving data to: {}", path.display());
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            let mut out = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut out, doc)?;
            out.write_all(b"\n")?;
            out.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            serde_json::to_writer_pretty(&mut out, doc)?;
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}
