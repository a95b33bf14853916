//! Head is the in-memory index of every series: the single entry point for
//! appends and reads.

mod options;

use std::fmt::{Debug, Formatter};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, warn};

use crate::chunk::SealedChunk;
use crate::codec::Sample;
use crate::error::Result;
use crate::labels::{Fingerprinter, Labels};
use crate::series::{MemSeries, SeriesRef};

pub use options::HeadOptions;

pub struct Head {
    series: DashMap<u64, SeriesRef>,
    fingerprinter: Box<dyn Fingerprinter>,
    opts: HeadOptions,
}

impl Default for Head {
    fn default() -> Self {
        Self::new()
    }
}

impl Head {
    pub fn new() -> Self {
        let opts = HeadOptions::default();
        Self {
            series: DashMap::new(),
            fingerprinter: opts.fingerprint.fingerprinter(),
            opts,
        }
    }

    pub fn with_options(opts: HeadOptions) -> Result<Self> {
        let fingerprinter = opts.fingerprint.fingerprinter();
        Self::with_fingerprinter(opts, fingerprinter)
    }

    /// with_fingerprinter uses `fingerprinter` instead of the scheme named by
    /// `opts.fingerprint`.
    pub fn with_fingerprinter(
        opts: HeadOptions,
        fingerprinter: Box<dyn Fingerprinter>,
    ) -> Result<Self> {
        opts.validate()?;
        Ok(Self {
            series: DashMap::new(),
            fingerprinter,
            opts,
        })
    }

    pub fn options(&self) -> &HeadOptions {
        &self.opts
    }

    pub fn fingerprint(&self, labels: &Labels) -> u64 {
        self.fingerprinter.fingerprint(labels)
    }

    /// get_or_create returns the series of `labels`, creating it with an empty
    /// head chunk on first use.
    pub fn get_or_create(&self, labels: &Labels) -> SeriesRef {
        let fingerprint = self.fingerprint(labels);
        match self.series.entry(fingerprint) {
            Entry::Occupied(e) => e.get().clone(),
            Entry::Vacant(e) => {
                debug!(fingerprint, labels = %labels, "create series");
                let series = SeriesRef::new(MemSeries::new(labels.clone(), fingerprint));
                e.insert(series).value().clone()
            }
        }
    }

    pub fn append(&self, labels: &Labels, t: u64, v: f64) {
        let series = self.get_or_create(labels);
        series.lock().append(t, v, self.opts.samples_per_chunk);
    }

    /// get_series returns the series of `labels` if it was ever appended to.
    pub fn get_series(&self, labels: &Labels) -> Option<SeriesRef> {
        self.series
            .get(&self.fingerprint(labels))
            .map(|s| s.value().clone())
    }

    /// read_series decodes the head chunk of the series of `labels`. Samples in
    /// sealed chunks are not included, see `read_series_history`.
    pub fn read_series(&self, labels: &Labels) -> Result<Option<Vec<Sample>>> {
        let Some(series) = self.get_series(labels) else {
            return Ok(None);
        };

        let head = series.lock().head_chunk().snapshot();
        decode_logged(&head, labels).map(Some)
    }

    /// read_series_history decodes every chunk of the series of `labels`,
    /// oldest first.
    pub fn read_series_history(&self, labels: &Labels) -> Result<Option<Vec<Sample>>> {
        let Some(chunks) = self.chunks(labels) else {
            return Ok(None);
        };

        let total = chunks.iter().map(|c| c.sample_count() as usize).sum::<usize>();
        let mut samples = Vec::with_capacity(total);
        for chunk in chunks.iter().rev() {
            samples.extend(decode_logged(chunk, labels)?);
        }
        Ok(Some(samples))
    }

    /// chunks snapshots the chunk chain of the series of `labels`, newest first.
    pub fn chunks(&self, labels: &Labels) -> Option<Vec<SealedChunk>> {
        self.get_series(labels).map(|s| s.lock().chain())
    }

    pub fn num_series(&self) -> usize {
        self.series.len()
    }

    pub fn num_chunks(&self) -> usize {
        self.each_series(|s| s.num_chunks())
    }

    pub fn num_samples(&self) -> usize {
        self.each_series(|s| s.num_samples())
    }

    fn each_series<F>(&self, f: F) -> usize
    where
        F: Fn(&MemSeries) -> usize,
    {
        // Clone the handles first so no map shard is held while locking a series.
        let series: Vec<SeriesRef> = self.series.iter().map(|e| e.value().clone()).collect();
        series.iter().map(|s| f(&s.lock())).sum()
    }
}

impl Debug for Head {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Head")
            .field("series", &self.series.len())
            .field("opts", &self.opts)
            .finish()
    }
}

fn decode_logged(chunk: &SealedChunk, labels: &Labels) -> Result<Vec<Sample>> {
    chunk.samples().map_err(|e| {
        warn!(labels = %labels, chunk = ?chunk, error = %e, "decode chunk");
        e
    })
}
