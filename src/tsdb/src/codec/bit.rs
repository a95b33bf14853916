//! Bit-level stream used by the chunk codec.
//!
//! Bits are packed most-significant-bit-first within each byte. The writer owns
//! a growable buffer; the reader is an independent cursor over an immutable byte
//! slice that pulls up to eight bytes at a time into a 64-bit lookahead word.

/// Bit
///
/// An enum used to represent a single bit, can be either `Zero` or `One`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bit {
    Zero,
    One,
}

impl Bit {
    /// Convert a bit to u64, so `Zero` becomes 0 and `One` becomes 1.
    pub fn to_u64(&self) -> u64 {
        match self {
            Bit::Zero => 0,
            Bit::One => 1,
        }
    }
}

impl From<bool> for Bit {
    fn from(b: bool) -> Self {
        if b {
            Bit::One
        } else {
            Bit::Zero
        }
    }
}

/// Error
///
/// Enum used to represent potential errors when interacting with a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Encountered the end of the stream")]
    EOF,
}

/// Read
///
/// Read is a trait that encapsulates the functionality required to read from a stream of bytes.
pub trait Read {
    /// Read a single bit from the underlying stream.
    fn read_bit(&mut self) -> Result<Bit, Error>;

    /// Read `num` bits from the underlying stream, `num` in `0..=64`.
    fn read_bits(&mut self, num: u32) -> Result<u64, Error>;
}

/// Write
///
/// Write is a trait that encapsulates the functionality required to write a stream of bytes.
pub trait Write {
    // Write a single bit to the underlying stream.
    fn write_bit(&mut self, bit: Bit);

    // Write a single byte to the underlying stream.
    fn write_byte(&mut self, byte: u8);

    // Write the bottom `num` bits of `bits` to the underlying stream.
    fn write_bits(&mut self, bits: u64, num: u32);
}

/// BufferedWriter
///
/// BufferedWriter writes bits to a growable buffer.
#[derive(Debug, Clone, Default)]
pub struct BufferedWriter {
    buf: Vec<u8>,
    count: u32, // unused bit positions in the last byte of the buffer
}

impl BufferedWriter {
    /// new creates an empty BufferedWriter
    pub fn new() -> Self {
        Self::default()
    }

    /// from_vec continues writing after the bytes of `buf`, which are treated as
    /// fully written.
    pub fn from_vec(buf: Vec<u8>) -> Self {
        Self { buf, count: 0 }
    }

    /// Number of unused bit positions in the last byte, `0..=8`.
    pub fn unused_bits(&self) -> u32 {
        self.count
    }

    /// Total number of bits written.
    pub fn bit_len(&self) -> usize {
        self.buf.len() * 8 - self.count as usize
    }

    /// The raw buffer. The last byte may be partially written and zero padded.
    pub fn as_slice(&self) -> &[u8] {
        self.buf.as_slice()
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        self.buf.as_mut_slice()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn last_index(&self) -> usize {
        self.buf.len() - 1
    }
}

impl Write for BufferedWriter {
    fn write_bit(&mut self, bit: Bit) {
        if self.count == 0 {
            self.buf.push(0);
            self.count = 8;
        }

        let i = self.last_index();
        if bit == Bit::One {
            self.buf[i] |= 1u8 << (self.count - 1);
        }

        self.count -= 1;
    }

    fn write_byte(&mut self, byte: u8) {
        if self.count == 0 {
            self.buf.push(byte);
            return;
        }

        // Split the byte across the tail of the current byte and a fresh one.
        let i = self.last_index();
        self.buf[i] |= byte >> (8 - self.count);
        self.buf.push(byte << self.count);
    }

    fn write_bits(&mut self, mut bits: u64, mut num: u32) {
        if num == 0 {
            return;
        }
        // we should never write more than 64 bits for a u64
        if num > 64 {
            num = 64;
        }

        bits <<= 64 - num;
        while num >= 8 {
            self.write_byte((bits >> 56) as u8);
            bits <<= 8;
            num -= 8;
        }

        while num > 0 {
            self.write_bit(Bit::from(bits >> 63 == 1));
            bits <<= 1;
            num -= 1;
        }
    }
}

/// BufferedReader
///
/// BufferedReader reads bits from an immutable byte slice through a 64-bit
/// lookahead buffer. It never mutates the underlying bytes.
#[derive(Debug, Clone)]
pub struct BufferedReader<'a> {
    bytes: &'a [u8], // underlying stream
    index: usize,    // next byte of `bytes` to load into `buffer`
    buffer: u64,     // lookahead, valid bits are the low `valid` bits
    valid: u32,      // number of unread bits in `buffer`
}

impl<'a> BufferedReader<'a> {
    /// new creates a new `BufferedReader` from `bytes`
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            index: 0,
            buffer: 0,
            valid: 0,
        }
    }

    /// Number of bits left to read, including the zero padding of the last byte.
    pub fn remaining_bits(&self) -> usize {
        (self.bytes.len() - self.index) * 8 + self.valid as usize
    }

    /// Refill the lookahead buffer. Only called once it has been drained.
    fn load(&mut self) -> bool {
        let rest = &self.bytes[self.index..];
        if rest.is_empty() {
            return false;
        }

        if let Some(word) = rest.get(..8) {
            let mut buf = [0_u8; 8];
            buf.copy_from_slice(word);
            self.buffer = u64::from_be_bytes(buf);
            self.valid = 64;
            self.index += 8;
            return true;
        }

        self.buffer = rest.iter().fold(0, |acc, b| (acc << 8) | u64::from(*b));
        self.valid = rest.len() as u32 * 8;
        self.index = self.bytes.len();
        true
    }
}

fn mask(num: u32) -> u64 {
    if num >= 64 {
        u64::MAX
    } else {
        (1 << num) - 1
    }
}

impl<'a> Read for BufferedReader<'a> {
    fn read_bit(&mut self) -> Result<Bit, Error> {
        if self.valid == 0 && !self.load() {
            return Err(Error::EOF);
        }

        self.valid -= 1;
        Ok(Bit::from((self.buffer >> self.valid) & 1 == 1))
    }

    fn read_bits(&mut self, mut num: u32) -> Result<u64, Error> {
        if num == 0 {
            return Ok(0);
        }
        // can't read more than 64 bits into a u64
        if num > 64 {
            num = 64;
        }

        if self.valid == 0 && !self.load() {
            return Err(Error::EOF);
        }

        if num <= self.valid {
            self.valid -= num;
            return Ok((self.buffer >> self.valid) & mask(num));
        }

        // The read straddles the lookahead boundary: take what is buffered,
        // reload, and take the rest. `valid` is at least 1 here so the
        // remainder is at most 63 bits.
        let head = self.buffer & mask(self.valid);
        let rest = num - self.valid;
        self.valid = 0;
        if !self.load() || self.valid < rest {
            return Err(Error::EOF);
        }

        self.valid -= rest;
        Ok((head << rest) | ((self.buffer >> self.valid) & mask(rest)))
    }
}

#[cfg(test)]
mod tests {
    use crate::codec::bit::{Bit, BufferedReader, BufferedWriter, Error, Read, Write};

    #[test]
    fn test_write_bit_msb_first() {
        let mut w = BufferedWriter::new();
        w.write_bit(Bit::One);
        w.write_bit(Bit::Zero);
        w.write_bit(Bit::One);

        assert_eq!(w.as_slice(), &[0b1010_0000]);
        assert_eq!(w.unused_bits(), 5);
        assert_eq!(w.bit_len(), 3);
    }

    #[test]
    fn test_write_byte_unaligned() {
        let mut w = BufferedWriter::new();
        w.write_bit(Bit::One);
        w.write_byte(0xFF);

        assert_eq!(w.as_slice(), &[0xFF, 0x80]);
        assert_eq!(w.unused_bits(), 7);

        // the same byte written bit by bit yields the same stream
        let mut bw = BufferedWriter::new();
        bw.write_bit(Bit::One);
        for _ in 0..8 {
            bw.write_bit(Bit::One);
        }
        assert_eq!(w.as_slice(), bw.as_slice());
    }

    #[test]
    fn test_write_byte_aligned() {
        let mut w = BufferedWriter::from_vec(vec![0, 0]);
        w.write_byte(0xAB);
        assert_eq!(w.as_slice(), &[0, 0, 0xAB]);
        assert_eq!(w.unused_bits(), 0);
    }

    #[test]
    fn test_write_bits() {
        let mut w = BufferedWriter::new();
        w.write_bits(0b10, 2);
        w.write_bits(0x1234, 16);
        w.write_bits(u64::MAX, 64);
        w.write_bits(0, 0);

        assert_eq!(w.bit_len(), 82);

        let mut r = BufferedReader::new(w.as_slice());
        assert_eq!(r.read_bits(2).unwrap(), 0b10);
        assert_eq!(r.read_bits(16).unwrap(), 0x1234);
        assert_eq!(r.read_bits(64).unwrap(), u64::MAX);
    }

    #[test]
    fn test_read_across_lookahead() {
        let widths = [1_u32, 7, 64, 3, 33, 12, 64, 5, 9, 32, 1, 64];
        let mut w = BufferedWriter::new();
        for (i, n) in widths.iter().enumerate() {
            let v = (0x9E37_79B9_7F4A_7C15_u64).rotate_left(i as u32 * 7);
            w.write_bits(v, *n);
        }

        let mut r = BufferedReader::new(w.as_slice());
        for (i, n) in widths.iter().enumerate() {
            let v = (0x9E37_79B9_7F4A_7C15_u64).rotate_left(i as u32 * 7);
            let exp = if *n == 64 { v } else { v & ((1 << n) - 1) };
            assert_eq!(r.read_bits(*n).unwrap(), exp, "field {} of width {}", i, n);
        }
    }

    #[test]
    fn test_read_bit_by_bit() {
        let bytes = [0b1100_0101_u8, 0xFF, 0x00];
        let mut r = BufferedReader::new(&bytes);
        let mut got = vec![];
        for _ in 0..8 {
            got.push(r.read_bit().unwrap().to_u64());
        }
        assert_eq!(got, vec![1, 1, 0, 0, 0, 1, 0, 1]);
        assert_eq!(r.read_bits(8).unwrap(), 0xFF);
        assert_eq!(r.remaining_bits(), 8);
    }

    #[test]
    fn test_read_past_end() {
        let bytes = [0xAA_u8; 9];
        let mut r = BufferedReader::new(&bytes);
        assert_eq!(r.read_bits(64).unwrap(), 0xAAAA_AAAA_AAAA_AAAA);
        assert_eq!(r.read_bits(16), Err(Error::EOF));

        let mut r = BufferedReader::new(&[]);
        assert_eq!(r.read_bit(), Err(Error::EOF));
        assert_eq!(r.read_bits(1), Err(Error::EOF));

        let mut r = BufferedReader::new(&[0x80]);
        assert_eq!(r.read_bit(), Ok(Bit::One));
        assert_eq!(r.read_bits(7), Ok(0));
        assert_eq!(r.read_bit(), Err(Error::EOF));
    }
}
