//! In-memory storage core of a minimal time series database.
//!
//! Samples are appended per series into Gorilla-compressed chunks of at most
//! [`DEFAULT_SAMPLES_PER_CHUNK`] samples (configurable through [`HeadOptions`]).
//!
//! ```rust
//! use memtsdb_tsdb::{Head, Labels};
//!
//! let head = Head::new();
//! let labels = Labels::from_pairs(&[("__name__", "up"), ("job", "node")]);
//!
//! head.append(&labels, 1745755810, 1.0);
//! head.append(&labels, 1745755840, 1.0);
//!
//! let samples = head.read_series(&labels).unwrap().unwrap();
//! assert_eq!(samples.len(), 2);
//! ```

pub mod chunk;
pub mod codec;
pub mod error;
pub mod head;
pub mod labels;
pub mod series;

pub use chunk::{Chunk, SealedChunk, DEFAULT_SAMPLES_PER_CHUNK};
pub use codec::xor::{decode_chunk, XorDecoder, XorEncoder};
pub use codec::{Decoder, Encoder, Sample};
pub use error::{Result, TsdbError};
pub use head::{Head, HeadOptions};
pub use labels::{FingerprintScheme, Fingerprinter, Label, Labels};
pub use series::{MemSeries, SeriesRef};
