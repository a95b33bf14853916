use crate::codec::bit;

pub type Result<T> = std::result::Result<T, TsdbError>;

#[derive(Debug, thiserror::Error)]
pub enum TsdbError {
    /// The bit stream ran out before a field could be read.
    #[error("bit stream: {0}")]
    Bit(#[from] bit::Error),

    /// The chunk header declares more samples than its stream holds,
    /// or a value window in the stream is malformed.
    #[error("corrupt chunk: header declares {declared} samples, decoded {decoded}")]
    CorruptChunk { declared: u16, decoded: u16 },

    #[error("invalid head options: {0}")]
    InvalidOptions(String),
}
