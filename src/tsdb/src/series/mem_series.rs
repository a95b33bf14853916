use tracing::debug;

use crate::chunk::{Chunk, SealedChunk};
use crate::codec::Sample;
use crate::error::Result;
use crate::labels::Labels;

/// MemSeries is the in-memory state of one series: its labels, the appendable
/// head chunk and the sealed chunks it superseded, oldest first.
#[derive(Debug)]
pub struct MemSeries {
    labels: Labels,
    fingerprint: u64,

    sealed: Vec<SealedChunk>,
    head: Chunk,
}

impl MemSeries {
    pub fn new(labels: Labels, fingerprint: u64) -> Self {
        Self {
            labels,
            fingerprint,
            sealed: vec![],
            head: Chunk::new(),
        }
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// append adds a sample to the head chunk, first cutting a new head when
    /// the current one holds `samples_per_chunk` samples or cannot encode `t`.
    /// Returns whether a chunk was cut.
    pub fn append(&mut self, t: u64, v: f64, samples_per_chunk: u16) -> bool {
        let cut = self.head.is_full(samples_per_chunk) || !self.head.fits(t);
        if cut {
            self.cut_new_head_chunk();
        }

        self.head.append(t, v);
        cut
    }

    fn cut_new_head_chunk(&mut self) {
        let previous = std::mem::take(&mut self.head).seal();
        debug!(
            fingerprint = self.fingerprint,
            sealed_samples = previous.sample_count(),
            chain_len = self.sealed.len() + 2,
            "cut new head chunk"
        );
        self.sealed.push(previous);
    }

    pub fn head_chunk(&self) -> &Chunk {
        &self.head
    }

    /// previous returns the chunk the head chunk superseded.
    pub fn previous(&self) -> Option<&SealedChunk> {
        self.sealed.last()
    }

    /// sealed_chunks returns the immutable history, oldest first.
    pub fn sealed_chunks(&self) -> &[SealedChunk] {
        &self.sealed
    }

    pub fn num_chunks(&self) -> usize {
        self.sealed.len() + 1
    }

    pub fn num_samples(&self) -> usize {
        self.sealed
            .iter()
            .map(|c| c.sample_count() as usize)
            .sum::<usize>()
            + self.head.sample_count() as usize
    }

    /// chain snapshots the whole chunk chain, newest first: the head chunk as
    /// it is now, then every sealed chunk back to the oldest.
    pub fn chain(&self) -> Vec<SealedChunk> {
        let mut chunks = Vec::with_capacity(self.num_chunks());
        chunks.push(self.head.snapshot());
        chunks.extend(self.sealed.iter().rev().cloned());
        chunks
    }

    /// samples decodes the head chunk only.
    pub fn samples(&self) -> Result<Vec<Sample>> {
        self.head.samples()
    }
}
