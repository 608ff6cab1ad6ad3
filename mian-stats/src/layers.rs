//! Per-altitude block counts.

use mian_region::{BlockArray, CHUNK_HEIGHT};
use serde::Serialize;

/// Ordered, duplicate-free set of requested block identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSet {
    ids: Vec<u8>,
    positions: [Option<u8>; 256],
}

impl BlockSet {
    /// Keeps the first occurrence of each identifier.
    pub fn new<I: IntoIterator<Item = u8>>(ids: I) -> Self {
        let mut set = Self { ids: Vec::new(), positions: [None; 256] };
        for id in ids {
            if set.positions[id as usize].is_none() {
                set.positions[id as usize] = Some(set.ids.len() as u8);
                set.ids.push(id);
            }
        }
        set
    }

    pub fn ids(&self) -> &[u8] {
        &self.ids
    }

    pub fn position(&self, id: u8) -> Option<usize> {
        self.positions[id as usize].map(usize::from)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// One identifier's counts, indexed by altitude.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerSeries {
    pub id: u8,
    pub counts: Vec<u64>,
}

/// Running per-altitude totals for a [`BlockSet`].
///
/// Adding arrays and merging partial histograms are order-independent, so
/// partials can be built on separate threads and combined afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerHistogram {
    blocks: BlockSet,
    counts: Vec<[u64; CHUNK_HEIGHT]>,
    chunks: u64,
}

impl LayerHistogram {
    pub fn new(blocks: BlockSet) -> Self {
        let counts = vec![[0; CHUNK_HEIGHT]; blocks.len()];
        Self { blocks, counts, chunks: 0 }
    }

    pub fn blocks(&self) -> &BlockSet {
        &self.blocks
    }

    /// Count every requested identifier in `array`, layer by layer.
    pub fn add(&mut self, array: &BlockArray) {
        for column in array.columns() {
            for (y, &id) in column.iter().enumerate() {
                if let Some(k) = self.blocks.position(id) {
                    self.counts[k][y] += 1;
                }
            }
        }
        self.chunks += 1;
    }

    /// Add `other`'s totals into this histogram.
    ///
    /// # Panics
    /// If the two histograms were built for different block sets.
    pub fn absorb(&mut self, other: &LayerHistogram) {
        assert_eq!(
            self.blocks.ids(),
            other.blocks.ids(),
            "merging histograms of different block sets"
        );
        for (mine, theirs) in self.counts.iter_mut().zip(&other.counts) {
            for (a, b) in mine.iter_mut().zip(theirs) {
                *a += b;
            }
        }
        self.chunks += other.chunks;
    }

    pub fn merge(mut self, other: LayerHistogram) -> LayerHistogram {
        self.absorb(&other);
        self
    }

    /// Counts for `id`, or None if it was not requested.
    pub fn counts(&self, id: u8) -> Option<&[u64; CHUNK_HEIGHT]> {
        self.blocks.position(id).map(|k| &self.counts[k])
    }

    pub fn total(&self, id: u8) -> u64 {
        self.counts(id).map(|c| c.iter().sum()).unwrap_or(0)
    }

    /// Number of chunks folded in. Zero means "no data", not "no blocks".
    pub fn chunks(&self) -> u64 {
        self.chunks
    }

    pub fn is_empty(&self) -> bool {
        self.chunks == 0
    }

    /// Whether any requested identifier was seen at all.
    pub fn has_occurrences(&self) -> bool {
        self.counts.iter().any(|c| c.iter().any(|&n| n > 0))
    }

    /// Series in request order, ready for output.
    pub fn series(&self) -> Vec<LayerSeries> {
        self.blocks
            .ids()
            .iter()
            .zip(&self.counts)
            .map(|(&id, counts)| LayerSeries { id, counts: counts.to_vec() })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mian_region::BLOCKS_PER_CHUNK;
    use mian_region::fixture::pattern;

    fn array(bytes: Vec<u8>) -> BlockArray {
        BlockArray::from_vec(bytes).unwrap()
    }

    #[test]
    fn test_block_set_dedup_keeps_order() {
        let set = BlockSet::new([0x38, 0x0E, 0x38, 0x10, 0x0E]);
        assert_eq!(set.ids(), &[0x38, 0x0E, 0x10]);
        assert_eq!(set.position(0x10), Some(2));
        assert_eq!(set.position(0x01), None);
    }

    #[test]
    fn test_layer_sum_equals_total_count() {
        let arrays: Vec<BlockArray> = (0..4).map(|s| array(pattern(s))).collect();
        let ids: Vec<u8> = vec![0, 5, 42, 96];
        let mut histogram = LayerHistogram::new(BlockSet::new(ids.clone()));
        for a in &arrays {
            histogram.add(a);
        }

        for id in ids {
            let expected: usize = arrays.iter().map(|a| a.count(id)).sum();
            assert_eq!(histogram.total(id), expected as u64, "id {}", id);
        }
        assert_eq!(histogram.chunks(), 4);
    }

    #[test]
    fn test_layer_stride() {
        let mut bytes = vec![0u8; BLOCKS_PER_CHUNK];
        // One diamond per column at y = 12, plus one extra at y = 100.
        for column in bytes.chunks_exact_mut(CHUNK_HEIGHT) {
            column[12] = 0x38;
        }
        bytes[100] = 0x38;

        let mut histogram = LayerHistogram::new(BlockSet::new([0x38]));
        histogram.add(&array(bytes));
        let counts = histogram.counts(0x38).unwrap();
        assert_eq!(counts[12], 256);
        assert_eq!(counts[100], 1);
        assert_eq!(counts.iter().sum::<u64>(), 257);
    }

    #[test]
    fn test_order_independent() {
        let arrays: Vec<BlockArray> = (0..8).map(|s| array(pattern(s * 13))).collect();
        let blocks = BlockSet::new([1, 2, 3, 50, 77]);

        let mut forward = LayerHistogram::new(blocks.clone());
        arrays.iter().for_each(|a| forward.add(a));

        let mut backward = LayerHistogram::new(blocks.clone());
        arrays.iter().rev().for_each(|a| backward.add(a));

        let mut interleaved = LayerHistogram::new(blocks.clone());
        for i in [3, 7, 0, 5, 1, 6, 2, 4] {
            interleaved.add(&arrays[i]);
        }

        // Batches combined afterwards.
        let batched = arrays
            .chunks(3)
            .map(|batch| {
                let mut partial = LayerHistogram::new(blocks.clone());
                batch.iter().for_each(|a| partial.add(a));
                partial
            })
            .rev()
            .fold(LayerHistogram::new(blocks.clone()), LayerHistogram::merge);

        assert_eq!(forward, backward);
        assert_eq!(forward, interleaved);
        assert_eq!(forward, batched);
    }

    #[test]
    fn test_absent_identifier_is_all_zero() {
        let mut histogram = LayerHistogram::new(BlockSet::new([200]));
        histogram.add(&array(pattern(0)));
        assert_eq!(histogram.counts(200).unwrap(), &[0; CHUNK_HEIGHT]);
        assert!(!histogram.has_occurrences());
        assert!(!histogram.is_empty());

        let series = histogram.series();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].counts.len(), CHUNK_HEIGHT);
    }

    #[test]
    fn test_no_chunks_is_empty() {
        let histogram = LayerHistogram::new(BlockSet::new([1]));
        assert!(histogram.is_empty());
        assert_eq!(histogram.total(1), 0);
        assert_eq!(histogram.total(2), 0);
    }

    #[test]
    #[should_panic(expected = "different block sets")]
    fn test_merge_mismatched_sets() {
        let a = LayerHistogram::new(BlockSet::new([1]));
        let b = LayerHistogram::new(BlockSet::new([2]));
        let _ = a.merge(b);
    }
}
