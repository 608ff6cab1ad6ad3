//! Parallel scans over a set of region files.
//!
//! Each region is opened, decoded and closed by a single worker. Workers
//! return partial results that are merged once all of them finish.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use mian_metrics::ScanMetrics;
use mian_region::{BlockArray, BlockExtractor, ChunkPos, REGION_CHUNKS, RegionFile, RegionPos};
use rayon::prelude::*;
use serde::Serialize;

use crate::area::{AreaMap, Bounds, MAX_AREA_CELLS};
use crate::error::ScanError;
use crate::layers::{BlockSet, LayerHistogram};

/// Counts reported at the end of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub regions_scanned: usize,
    pub regions_skipped: usize,
    pub chunks_decoded: usize,
    pub chunks_skipped: usize,
}

pub struct Scanner {
    extractor: BlockExtractor,
    metrics: Arc<ScanMetrics>,
    stop: Arc<AtomicBool>,
    progress: AtomicUsize,
}

impl Scanner {
    pub fn new(extractor: BlockExtractor) -> Self {
        Self {
            extractor,
            metrics: Arc::new(ScanMetrics::new()),
            stop: Arc::new(AtomicBool::new(false)),
            progress: AtomicUsize::new(0),
        }
    }

    /// Counters of the most recent scan.
    pub fn metrics(&self) -> &Arc<ScanMetrics> {
        &self.metrics
    }

    /// Flag that stops the scan when set. No new region or chunk is started
    /// afterwards; the scan then fails with [`ScanError::Cancelled`].
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub fn cancel(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    fn cancelled(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub fn summary(&self) -> ScanSummary {
        ScanSummary {
            regions_scanned: self.metrics.regions_scanned(),
            regions_skipped: self.metrics.regions_skipped(),
            chunks_decoded: self.metrics.chunks_decoded(),
            chunks_skipped: self.metrics.chunks_skipped(),
        }
    }

    /// Per-altitude counts of `blocks` over every chunk in `paths`.
    pub fn layers(
        &self,
        paths: &[PathBuf],
        blocks: &BlockSet,
    ) -> Result<LayerHistogram, ScanError> {
        if blocks.is_empty() {
            return Err(ScanError::NoBlockTypes);
        }
        if paths.is_empty() {
            return Err(ScanError::NoRegions);
        }
        self.begin();
        log::info!("There are {} regions in the savegame directory", paths.len());

        let total = paths.len();
        let histogram = paths
            .par_iter()
            .filter_map(|path| {
                if self.cancelled() {
                    return None;
                }
                self.log_progress(total);
                match self.region_layers(path, blocks) {
                    Ok(partial) => Some(partial),
                    Err(e) => {
                        log::warn!("Skipping region {}: {}", path.display(), e);
                        self.metrics.record_region_skipped();
                        None
                    }
                }
            })
            .reduce(|| LayerHistogram::new(blocks.clone()), LayerHistogram::merge);

        self.finish()?;
        if !histogram.has_occurrences() {
            return Err(ScanError::NoRecognizedBlocks);
        }
        Ok(histogram)
    }

    /// Per-chunk counts of `block` on the grid spanned by `paths`.
    ///
    /// Paths whose name is not a region filename are skipped, since their
    /// chunks cannot be placed on the grid. Fails with
    /// [`ScanError::AreaTooLarge`] before reading anything if the grid would
    /// exceed [`MAX_AREA_CELLS`].
    pub fn area(&self, paths: &[PathBuf], block: u8) -> Result<AreaMap, ScanError> {
        let regions: Vec<(RegionPos, &PathBuf)> = paths
            .iter()
            .filter_map(|path| match RegionPos::from_path(path) {
                Some(pos) => Some((pos, path)),
                None => {
                    log::warn!("Skipping {}: not a region filename", path.display());
                    None
                }
            })
            .collect();

        let bounds = Bounds::from_regions(regions.iter().map(|(pos, _)| *pos))
            .ok_or(ScanError::NoRegions)?;
        if bounds.cell_count().is_none_or(|cells| cells > MAX_AREA_CELLS) {
            return Err(ScanError::AreaTooLarge {
                width: bounds.width(),
                depth: bounds.depth(),
            });
        }
        self.begin();

        let blocks = bounds.to_blocks();
        log::info!(
            "Area: chunks x {}..={} z {}..={} (blocks x {}..={} z {}..={})",
            bounds.min_x,
            bounds.max_x,
            bounds.min_z,
            bounds.max_z,
            blocks.min_x,
            blocks.max_x,
            blocks.min_z,
            blocks.max_z
        );

        let total = regions.len();
        let counts: Vec<(ChunkPos, i64)> = regions
            .par_iter()
            .filter_map(|(pos, path)| {
                if self.cancelled() {
                    return None;
                }
                self.log_progress(total);
                match self.region_counts(path, *pos, block) {
                    Ok(chunks) => Some(chunks),
                    Err(e) => {
                        log::warn!("Skipping region {}: {}", path.display(), e);
                        self.metrics.record_region_skipped();
                        None
                    }
                }
            })
            .flatten()
            .collect();

        self.finish()?;

        let mut map = AreaMap::new(block, bounds);
        for (pos, count) in counts {
            map.set(pos, count);
        }
        if map.total() == 0 {
            return Err(ScanError::NoRecognizedBlocks);
        }
        Ok(map)
    }

    /// Start a scan with fresh counters and progress.
    fn begin(&self) {
        self.metrics.reset();
        self.progress.store(0, Ordering::Relaxed);
    }

    fn finish(&self) -> Result<(), ScanError> {
        if self.cancelled() {
            return Err(ScanError::Cancelled);
        }
        let summary = self.summary();
        log::info!(
            "Done! {} regions read, {} skipped; {} chunks decoded, {} skipped",
            summary.regions_scanned,
            summary.regions_skipped,
            summary.chunks_decoded,
            summary.chunks_skipped
        );
        if summary.regions_scanned == 0 {
            return Err(ScanError::NoReadableRegions { skipped: summary.regions_skipped });
        }
        Ok(())
    }

    fn log_progress(&self, total: usize) {
        let n = self.progress.fetch_add(1, Ordering::Relaxed) + 1;
        log::info!("Reading {:>5} / {}", n, total);
    }

    fn region_layers(
        &self,
        path: &Path,
        blocks: &BlockSet,
    ) -> mian_region::Result<LayerHistogram> {
        let mut histogram = LayerHistogram::new(blocks.clone());
        self.for_each_chunk(path, |_, array| histogram.add(&array))?;
        Ok(histogram)
    }

    /// Count of `block` in each decodable chunk of one region, in world
    /// coordinates. Unreadable chunks are left out.
    fn region_counts(
        &self,
        path: &Path,
        region: RegionPos,
        block: u8,
    ) -> mian_region::Result<Vec<(ChunkPos, i64)>> {
        let mut counts = Vec::new();
        self.for_each_chunk(path, |(x, z), array| {
            counts.push((region.local_to_world(x, z), array.count(block) as i64));
        })?;
        Ok(counts)
    }

    /// Open `path` and hand every decodable chunk to `f` with its local
    /// coordinates. Chunk-level errors are logged and skipped.
    fn for_each_chunk<F>(&self, path: &Path, mut f: F) -> mian_region::Result<()>
    where
        F: FnMut((i32, i32), BlockArray),
    {
        let start_region = Instant::now();
        let mut region = RegionFile::open(path)?;
        let entries = region.table().entries().to_vec();
        log::debug!("{}: {} chunks present", path.display(), entries.len());
        self.metrics.record_chunks_absent(REGION_CHUNKS - entries.len());

        for entry in &entries {
            if self.cancelled() {
                break;
            }
            let start = Instant::now();
            let res = region.read_chunk(entry).and_then(|chunk| {
                self.metrics.record_decompressed(chunk.len());
                self.extractor.extract(&chunk)
            });
            match res {
                Ok(array) => {
                    self.metrics.record_chunk(start.elapsed());
                    f(entry.local(), array);
                }
                Err(e) => {
                    log::warn!(
                        "{}: skipping chunk {:?} at sector {}: {}",
                        path.display(),
                        entry.local(),
                        entry.offset,
                        e
                    );
                    self.metrics.record_chunk_skipped();
                }
            }
        }

        self.metrics.record_region(start_region.elapsed());
        Ok(())
    }
}
