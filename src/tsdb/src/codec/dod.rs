//! Variable-length prefix code for timestamp delta-of-deltas.
//!
//! | dod                  | prefix | payload |
//! |----------------------|--------|---------|
//! | 0                    | `0`    | -       |
//! | [-63, 64]            | `10`   | 7 bits  |
//! | [-255, 256]          | `110`  | 9 bits  |
//! | [-2047, 2048]        | `1110` | 12 bits |
//! | otherwise            | `1111` | 32 bits |
//!
//! A bucket's prefix is its index + 1 one-bits followed by a zero, except the
//! last bucket which stops after four ones. Payloads are the low bits of the
//! two's complement value.

use crate::codec::bit::{Bit, Error, Read, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DodBucket {
    pub prefix: u64,
    pub prefix_len: u32,
    pub width: u32,
}

/// Buckets ordered smallest range first.
pub const DOD_BUCKETS: [DodBucket; 4] = [
    DodBucket {
        prefix: 0b10,
        prefix_len: 2,
        width: 7,
    },
    DodBucket {
        prefix: 0b110,
        prefix_len: 3,
        width: 9,
    },
    DodBucket {
        prefix: 0b1110,
        prefix_len: 4,
        width: 12,
    },
    DodBucket {
        prefix: 0b1111,
        prefix_len: 4,
        width: 32,
    },
];

/// bits_range reports whether `v` is in `[-(2^(nbits-1) - 1), 2^(nbits-1)]`.
pub fn bits_range(v: i64, nbits: u32) -> bool {
    let half = 1_i64 << (nbits - 1);
    -(half - 1) <= v && v <= half
}

/// fits reports whether `dod` can be written without losing bits.
pub fn fits(dod: i64) -> bool {
    bits_range(dod, DOD_BUCKETS[DOD_BUCKETS.len() - 1].width)
}

/// bucket returns the bucket `dod` is written with, `None` for zero.
pub fn bucket(dod: i64) -> Option<&'static DodBucket> {
    if dod == 0 {
        return None;
    }

    let last = &DOD_BUCKETS[DOD_BUCKETS.len() - 1];
    // Out of range values still take the widest bucket; callers check `fits` first.
    Some(
        DOD_BUCKETS
            .iter()
            .find(|b| bits_range(dod, b.width))
            .unwrap_or(last),
    )
}

/// encoded_len returns the number of bits `dod` occupies in the stream.
pub fn encoded_len(dod: i64) -> u32 {
    match bucket(dod) {
        None => 1,
        Some(b) => b.prefix_len + b.width,
    }
}

pub fn write_dod<W: Write>(w: &mut W, dod: i64) {
    match bucket(dod) {
        None => w.write_bit(Bit::Zero),
        Some(b) => {
            w.write_bits(b.prefix, b.prefix_len);
            w.write_bits(dod as u64, b.width);
        }
    }
}

pub fn read_dod<R: Read>(r: &mut R) -> Result<i64, Error> {
    if r.read_bit()? == Bit::Zero {
        return Ok(0);
    }

    let last = DOD_BUCKETS.len() - 1;
    for b in &DOD_BUCKETS[..last] {
        if r.read_bit()? == Bit::Zero {
            return read_payload(r, b.width);
        }
    }
    read_payload(r, DOD_BUCKETS[last].width)
}

fn read_payload<R: Read>(r: &mut R, width: u32) -> Result<i64, Error> {
    let bits = r.read_bits(width)? as i64;
    // Values above 2^(width-1) are negative.
    if bits > 1 << (width - 1) {
        Ok(bits - (1 << width))
    } else {
        Ok(bits)
    }
}
