//! Gorilla-style sample compression, as presented in:
//! http://www.vldb.org/pvldb/vol8/p1816-teller.pdf.
//!
//! Stream layout, big-endian bit order throughout:
//!
//! ```text
//! +--------+----------------+--------------+--------------------------------+
//! | num:16 | sample 0       | sample 1     | sample 2..                     |
//! |        | t:64 | v:64    | dt:64 | xor  | dod (see `dod`) | xor          |
//! +--------+----------------+--------------+--------------------------------+
//! ```
//!
//! The header holds the number of samples and is rewritten after every append.
//! Values are XORed with the previous one: a `0` bit means unchanged, `10`
//! reuses the previous leading/trailing zero window, `11` is followed by a
//! 5 bit leading zero count, a 6 bit significant bit count (64 stored as 0)
//! and the significant bits themselves.

use crate::codec::bit::{Bit, BufferedReader, BufferedWriter, Read, Write};
use crate::codec::{dod, Decoder, Encoder, Sample};
use crate::error::{Result, TsdbError};

/// CHUNK_HEADER_SIZE is the size in bytes of the sample count header.
pub const CHUNK_HEADER_SIZE: usize = 2;

/// Leading zeros are stored in 5 bits.
const MAX_LEADING_ZEROS: u32 = 31;

/// XorEncoder appends samples to a chunk stream.
#[derive(Debug, Clone)]
pub struct XorEncoder {
    bw: BufferedWriter,

    num: u16,
    t: u64,
    v: f64,
    t_delta: u64,

    leading: u32,
    trailing: u32,
}

impl Default for XorEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl XorEncoder {
    pub fn new() -> Self {
        Self {
            bw: BufferedWriter::from_vec(vec![0; CHUNK_HEADER_SIZE]),
            num: 0,
            t: 0,
            v: 0.0,
            t_delta: 0,
            leading: 0,
            trailing: 0,
        }
    }

    /// Number of samples appended so far.
    pub fn num_samples(&self) -> u16 {
        self.num
    }

    /// Number of bits written, header included.
    pub fn bit_len(&self) -> usize {
        self.bw.bit_len()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bw.into_bytes()
    }

    /// Delta between the last two appended timestamps.
    pub fn last_delta(&self) -> u64 {
        self.t_delta
    }

    /// fits reports whether appending at `t` keeps the stream lossless. Only a
    /// delta-of-delta outside the 32 bit literal range does not.
    pub fn fits(&self, t: u64) -> bool {
        if self.num < 2 {
            return true;
        }
        dod::fits(self.dod(t))
    }

    fn dod(&self, t: u64) -> i64 {
        t.wrapping_sub(self.t).wrapping_sub(self.t_delta) as i64
    }

    /// append encodes `(t, v)`. The count header wraps past `u16::MAX`, callers
    /// cut chunks well before that.
    pub fn append(&mut self, t: u64, v: f64) {
        match self.num {
            0 => {
                self.bw.write_bits(t, 64);
                self.bw.write_bits(v.to_bits(), 64);
            }
            1 => {
                let t_delta = t.wrapping_sub(self.t);
                self.bw.write_bits(t_delta, 64);
                self.t_delta = t_delta;

                self.write_v_delta(v);
            }
            _ => {
                let dod = self.dod(t);
                dod::write_dod(&mut self.bw, dod);
                self.t_delta = t.wrapping_sub(self.t);

                self.write_v_delta(v);
            }
        }

        self.num = self.num.wrapping_add(1);
        self.bw.as_mut_slice()[..CHUNK_HEADER_SIZE].copy_from_slice(&self.num.to_be_bytes());

        self.t = t;
        self.v = v;
    }

    fn write_v_delta(&mut self, v: f64) {
        let delta = v.to_bits() ^ self.v.to_bits();
        if delta == 0 {
            self.bw.write_bit(Bit::Zero);
            return;
        }
        self.bw.write_bit(Bit::One);

        let leading = delta.leading_zeros().min(MAX_LEADING_ZEROS);
        let trailing = delta.trailing_zeros();
        let sigbits = 64 - leading - trailing;

        if leading == self.leading && trailing == self.trailing {
            self.bw.write_bit(Bit::Zero);
            self.bw.write_bits(delta >> trailing, sigbits);
            return;
        }

        self.bw.write_bit(Bit::One);
        self.bw.write_bits(leading as u64, 5);
        // 64 significant bits do not fit in 6 bits and are written as 0. A
        // window of 0 bits never occurs since that is the unchanged case.
        self.bw.write_bits(sigbits as u64, 6);
        self.bw.write_bits(delta >> trailing, sigbits);

        self.leading = leading;
        self.trailing = trailing;
    }
}

impl Encoder<Sample> for XorEncoder {
    fn write(&mut self, s: Sample) {
        self.append(s.timestamp, s.value)
    }

    /// The raw stream. The last byte may be partially written and zero padded.
    fn bytes(&self) -> &[u8] {
        self.bw.as_slice()
    }
}

/// XorDecoder reconstructs the samples of a chunk stream.
#[derive(Debug)]
pub struct XorDecoder<'a> {
    br: BufferedReader<'a>,

    num: u16,
    read: u16,

    t: u64,
    t_delta: u64,
    v: u64,

    leading: u32,
    trailing: u32,

    err: Option<TsdbError>,
}

impl<'a> XorDecoder<'a> {
    pub fn new(b: &'a [u8]) -> Result<Self> {
        let mut br = BufferedReader::new(b);
        let num = br.read_bits(16)? as u16;

        Ok(Self {
            br,
            num,
            read: 0,
            t: 0,
            t_delta: 0,
            v: 0,
            leading: 0,
            trailing: 0,
            err: None,
        })
    }

    /// Number of samples declared by the header.
    pub fn count(&self) -> u16 {
        self.num
    }

    fn decode_next(&mut self) -> Result<()> {
        match self.read {
            0 => {
                self.t = self.br.read_bits(64)?;
                self.v = self.br.read_bits(64)?;
            }
            1 => {
                self.t_delta = self.br.read_bits(64)?;
                self.t = self.t.wrapping_add(self.t_delta);
                self.v = self.read_value()?;
            }
            _ => {
                let dod = dod::read_dod(&mut self.br)?;
                self.t_delta = self.t_delta.wrapping_add(dod as u64);
                self.t = self.t.wrapping_add(self.t_delta);
                self.v = self.read_value()?;
            }
        }

        Ok(())
    }

    fn read_value(&mut self) -> Result<u64> {
        if self.br.read_bit()? == Bit::Zero {
            return Ok(self.v);
        }

        if self.br.read_bit()? == Bit::One {
            let leading = self.br.read_bits(5)? as u32;
            let mut sigbits = self.br.read_bits(6)? as u32;
            if sigbits == 0 {
                sigbits = 64;
            }
            if leading + sigbits > 64 {
                return Err(self.corrupt());
            }

            self.leading = leading;
            self.trailing = 64 - leading - sigbits;
        }

        let sigbits = 64 - self.leading - self.trailing;
        let bits = self.br.read_bits(sigbits)?;
        Ok(self.v ^ (bits << self.trailing))
    }

    fn corrupt(&self) -> TsdbError {
        TsdbError::CorruptChunk {
            declared: self.num,
            decoded: self.read,
        }
    }
}

impl<'a> Decoder<Sample> for XorDecoder<'a> {
    fn next(&mut self) -> bool {
        if self.err.is_some() || self.read >= self.num {
            return false;
        }

        match self.decode_next() {
            Ok(()) => {
                self.read += 1;
                true
            }
            Err(TsdbError::Bit(_)) => {
                // Running out of bits before the declared count is a truncated chunk.
                self.err = Some(self.corrupt());
                false
            }
            Err(e) => {
                self.err = Some(e);
                false
            }
        }
    }

    fn read(&self) -> Sample {
        Sample::new(self.t, f64::from_bits(self.v))
    }

    fn err(&self) -> Option<&TsdbError> {
        self.err.as_ref()
    }
}

/// decode_chunk decodes every sample of a chunk stream. A stream holding fewer
/// samples than its header declares is an error, not a short result.
pub fn decode_chunk(b: &[u8]) -> Result<Vec<Sample>> {
    let mut dec = XorDecoder::new(b)?;
    let mut samples = Vec::with_capacity(dec.count() as usize);

    while dec.next() {
        samples.push(dec.read());
    }

    match dec.err.take() {
        Some(err) => Err(err),
        None => Ok(samples),
    }
}
