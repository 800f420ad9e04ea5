//! Byte-wise hashing of fixed-width records.
//!
//! Tables in this workspace never look at the meaning of a key, only at its raw bytes. Two keys
//! are equal iff their bytes are equal, and the hash of a key is a function of its bytes only.
use std::hash::Hasher;

use zwohash::ZwoHasher;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Computes the 64-bit FNV-1a hash of a byte string.
#[inline]
pub fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in bytes {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Mixes all input bits into all output bits.
///
/// This is the 64-bit finalizer of MurmurHash3. It is a bijection, so it never introduces
/// collisions on its own.
#[inline]
pub fn mix64(mut x: u64) -> u64 {
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    x ^= x >> 33;
    x
}

/// Computes a seeded hash of a byte string.
///
/// Different seeds yield independent looking hash functions over the same key bytes. The result
/// is finalized with [`mix64`] so that reducing it modulo a small bucket count is well
/// distributed.
#[inline]
pub fn seeded_hash(seed: u64, bytes: &[u8]) -> u64 {
    let mut hasher = ZwoHasher::default();
    hasher.write_u64(seed);
    hasher.write(bytes);
    mix64(hasher.finish() ^ seed)
}
