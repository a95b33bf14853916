use serde::{Deserialize, Serialize};

use crate::chunk::DEFAULT_SAMPLES_PER_CHUNK;
use crate::error::{Result, TsdbError};
use crate::labels::FingerprintScheme;

/// HeadOptions represents initialization options that are passed to `Head::with_options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadOptions {
    /// Number of samples after which a series cuts a new head chunk.
    pub samples_per_chunk: u16,
    /// How label sets are reduced to series fingerprints.
    pub fingerprint: FingerprintScheme,
}

impl Default for HeadOptions {
    fn default() -> Self {
        Self {
            samples_per_chunk: DEFAULT_SAMPLES_PER_CHUNK,
            fingerprint: FingerprintScheme::default(),
        }
    }
}

impl HeadOptions {
    pub fn validate(&self) -> Result<()> {
        if self.samples_per_chunk < 2 {
            return Err(TsdbError::InvalidOptions(format!(
                "samples_per_chunk must be at least 2, got {}",
                self.samples_per_chunk
            )));
        }
        Ok(())
    }
}
