use std::fmt::{Debug, Formatter};

use bytes::Bytes;
use memtsdb_utils::time::{now_secs, time_format, unix_secs_to_time};

use crate::codec::xor::{decode_chunk, XorDecoder, XorEncoder};
use crate::codec::{Encoder, Sample};
use crate::error::Result;

/// DEFAULT_SAMPLES_PER_CHUNK is the number of samples after which a series
/// cuts a new head chunk.
pub const DEFAULT_SAMPLES_PER_CHUNK: u16 = 120;

/// Chunk is the appendable, most recent run of a series' samples. It does not
/// enforce a size limit itself: the owning series checks `is_full` and cuts.
#[derive(Clone)]
pub struct Chunk {
    app: XorEncoder,
    created_at: u64,

    min_time: Option<u64>,
    max_time: Option<u64>,
}

impl Default for Chunk {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunk {
    pub fn new() -> Self {
        Self::with_created_at(now_secs())
    }

    pub fn with_created_at(created_at: u64) -> Self {
        Self {
            app: XorEncoder::new(),
            created_at,
            min_time: None,
            max_time: None,
        }
    }

    pub fn append(&mut self, t: u64, v: f64) {
        self.app.append(t, v);

        self.min_time.get_or_insert(t);
        self.max_time = Some(t);
    }

    pub fn sample_count(&self) -> u16 {
        self.app.num_samples()
    }

    pub fn is_full(&self, limit: u16) -> bool {
        self.sample_count() >= limit
    }

    /// fits reports whether `t` can be appended without overflowing the
    /// delta-of-delta encoding.
    pub fn fits(&self, t: u64) -> bool {
        self.app.fits(t)
    }

    /// raw_bytes is the encoded stream, header included.
    pub fn raw_bytes(&self) -> &[u8] {
        self.app.bytes()
    }

    /// Unix seconds at which the chunk was cut.
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn min_time(&self) -> Option<u64> {
        self.min_time
    }

    pub fn max_time(&self) -> Option<u64> {
        self.max_time
    }

    pub fn decoder(&self) -> Result<XorDecoder<'_>> {
        XorDecoder::new(self.raw_bytes())
    }

    pub fn samples(&self) -> Result<Vec<Sample>> {
        decode_chunk(self.raw_bytes())
    }

    /// seal freezes the chunk. No further appends are possible.
    pub fn seal(self) -> SealedChunk {
        SealedChunk {
            samples: self.sample_count(),
            bytes: Bytes::from(self.app.into_bytes()),
            created_at: self.created_at,
            min_time: self.min_time,
            max_time: self.max_time,
        }
    }

    /// snapshot copies the chunk as it is now into an immutable chunk.
    pub fn snapshot(&self) -> SealedChunk {
        self.clone().seal()
    }
}

impl Debug for Chunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("samples", &self.sample_count())
            .field("bytes", &self.raw_bytes().len())
            .field("created_at", &format_created_at(self.created_at))
            .field("min_time", &self.min_time)
            .field("max_time", &self.max_time)
            .finish()
    }
}

/// SealedChunk is an immutable chunk. Cloning it shares the encoded bytes, so
/// it can be decoded without holding its series' lock.
#[derive(Clone)]
pub struct SealedChunk {
    bytes: Bytes,
    samples: u16,
    created_at: u64,

    min_time: Option<u64>,
    max_time: Option<u64>,
}

impl SealedChunk {
    pub fn sample_count(&self) -> u16 {
        self.samples
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn min_time(&self) -> Option<u64> {
        self.min_time
    }

    pub fn max_time(&self) -> Option<u64> {
        self.max_time
    }

    pub fn decoder(&self) -> Result<XorDecoder<'_>> {
        XorDecoder::new(&self.bytes)
    }

    pub fn samples(&self) -> Result<Vec<Sample>> {
        decode_chunk(&self.bytes)
    }
}

impl Debug for SealedChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedChunk")
            .field("samples", &self.samples)
            .field("bytes", &self.bytes.len())
            .field("created_at", &format_created_at(self.created_at))
            .field("min_time", &self.min_time)
            .field("max_time", &self.max_time)
            .finish()
    }
}

fn format_created_at(created_at: u64) -> String {
    unix_secs_to_time(created_at)
        .map(time_format)
        .unwrap_or_else(|| created_at.to_string())
}
