use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counters shared by all scan workers.
#[derive(Debug, Default)]
pub struct ScanMetrics {
    // Regions
    pub regions_scanned: AtomicUsize,
    pub regions_skipped: AtomicUsize,

    // Chunks
    pub chunks_decoded: AtomicUsize,
    pub chunks_skipped: AtomicUsize,
    pub chunks_absent: AtomicUsize,

    // Detailed Breakdown
    pub total_read_us: AtomicU64,
    pub total_decompressed_bytes: AtomicU64,
    pub max_region_time_us: AtomicU64,

    // Session
    pub start_time: Option<Instant>,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Zero every counter. The session start time is kept.
    pub fn reset(&self) {
        for counter in [
            &self.regions_scanned,
            &self.regions_skipped,
            &self.chunks_decoded,
            &self.chunks_skipped,
            &self.chunks_absent,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        for counter in [
            &self.total_read_us,
            &self.total_decompressed_bytes,
            &self.max_region_time_us,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    pub fn record_region(&self, duration: Duration) {
        self.regions_scanned.fetch_add(1, Ordering::Relaxed);
        self.max_region_time_us.fetch_max(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_region_skipped(&self) {
        self.regions_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_chunk(&self, duration: Duration) {
        self.chunks_decoded.fetch_add(1, Ordering::Relaxed);
        self.total_read_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_chunk_skipped(&self) {
        self.chunks_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_chunks_absent(&self, count: usize) {
        self.chunks_absent.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_decompressed(&self, bytes: usize) {
        self.total_decompressed_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn regions_scanned(&self) -> usize {
        self.regions_scanned.load(Ordering::Relaxed)
    }

    pub fn regions_skipped(&self) -> usize {
        self.regions_skipped.load(Ordering::Relaxed)
    }

    pub fn chunks_decoded(&self) -> usize {
        self.chunks_decoded.load(Ordering::Relaxed)
    }

    pub fn chunks_skipped(&self) -> usize {
        self.chunks_skipped.load(Ordering::Relaxed)
    }

    pub fn generate_report(&self) -> String {
        let uptime = self.start_time.unwrap_or_else(Instant::now).elapsed();
        let regions = self.regions_scanned();
        let regions_skipped = self.regions_skipped();
        let region_max = self.max_region_time_us.load(Ordering::Relaxed) as f64 / 1000.0; // ms

        let decoded = self.chunks_decoded();
        let skipped = self.chunks_skipped();
        let absent = self.chunks_absent.load(Ordering::Relaxed);
        let read_time = self.total_read_us.load(Ordering::Relaxed) as f64 / 1000.0; // ms
        let read_avg = if decoded > 0 { read_time / decoded as f64 } else { 0.0 };
        let mib = self.total_decompressed_bytes.load(Ordering::Relaxed) as f64 / (1024.0 * 1024.0);

        format!(
            "mian Scan Report\n\
             ================\n\
             Session Duration: {:.2?}\n\n\
             [Regions]\n\
             Scanned: {}\n\
             Skipped: {}\n\
             Max Time: {:.2} ms\n\n\
             [Chunks]\n\
             Decoded: {}\n\
             Skipped: {}\n\
             Absent: {}\n\
             Avg Read+Decode: {:.3} ms/chunk\n\
             Decompressed: {:.1} MiB\n",
            uptime,
            regions,
            regions_skipped,
            region_max,
            decoded,
            skipped,
            absent,
            read_avg,
            mib
        )
    }
}
