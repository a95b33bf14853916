use std::hash::Hasher;

/// hash_key computes a hash of key. Hash is always non-zero.
pub fn hash_key(key: &[u8]) -> u64 {
    let mut h = xx_hasher();
    h.write(key);
    finish(h)
}

/// hash_parts computes the hash of the concatenation of `parts` without
/// materializing it. Equivalent to `hash_key(&parts.concat())`.
pub fn hash_parts<'a, I>(parts: I) -> u64
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut h = xx_hasher();
    for part in parts {
        h.write(part);
    }
    finish(h)
}

fn xx_hasher() -> twox_hash::XxHash64 {
    twox_hash::XxHash64::with_seed(0)
}

fn finish(h: twox_hash::XxHash64) -> u64 {
    let h = h.finish();
    if h == 0 {
        1
    } else {
        h
    }
}
