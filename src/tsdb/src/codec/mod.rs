pub mod bit;
pub mod dod;
pub mod xor;

use crate::error::TsdbError;

pub trait Encoder<T> {
    fn write(&mut self, v: T);
    fn bytes(&self) -> &[u8];
}

pub trait Decoder<T> {
    fn next(&mut self) -> bool;
    fn read(&self) -> T;
    fn err(&self) -> Option<&TsdbError>;
}

/// Sample is a single `(timestamp, value)` pair of a series.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sample {
    pub timestamp: u64,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: u64, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// bit_eq compares timestamps and the exact bit patterns of the values,
    /// so NaN equals the same NaN.
    pub fn bit_eq(&self, other: &Sample) -> bool {
        self.timestamp == other.timestamp && self.value.to_bits() == other.value.to_bits()
    }
}

impl From<(u64, f64)> for Sample {
    fn from((timestamp, value): (u64, f64)) -> Self {
        Self { timestamp, value }
    }
}
