//! xxHash64-style byte mixer and the derived 128-bit digest.
//!
//! This is a byte-at-a-time variant: every input byte goes through the
//! xxHash64 single-byte round, and the 32-byte stripe lanes of the reference
//! algorithm are not used. Digests therefore match reference XXH64 only for
//! empty input.
//!
//! The 128-bit digest is *not* XXH128. Its low half is the 64-bit digest and
//! its high half is one extra mixing step applied to it, so it carries no
//! more entropy than the 64-bit digest. It is kept bit-for-bit for output
//! compatibility; see [`derive_xxh128`].

// XXH64 prime constants.
/// Multiplier applied after every byte round.
pub const PRIME64_1: u64 = 0x9E37_79B1_85EB_CA87;
/// First avalanche multiplier.
pub const PRIME64_2: u64 = 0xC2B2_AE3D_27D4_EB4F;
/// Second avalanche multiplier.
pub const PRIME64_3: u64 = 0x1656_67B1_9E37_79F9;
/// XOR constant of the 128-bit high half.
pub const PRIME64_4: u64 = 0x85EB_CA77_C2B2_AE63;
/// Byte multiplier and seed.
pub const PRIME64_5: u64 = 0x27D4_EB2F_1656_67C5;

/// Initial accumulator.
pub const XXH64_SEED: u64 = PRIME64_5;

/// Feed one byte into the accumulator.
#[inline(always)]
pub fn mix(acc: u64, byte: u8) -> u64 {
    (acc ^ (byte as u64).wrapping_mul(PRIME64_5))
        .rotate_left(11)
        .wrapping_mul(PRIME64_1)
}

/// Fold the total input length into the accumulator and avalanche it.
#[inline]
pub fn finalize(acc: u64, total_len: u64) -> u64 {
    let mut h64 = acc ^ total_len;
    h64 ^= h64 >> 33;
    h64 = h64.wrapping_mul(PRIME64_2);
    h64 ^= h64 >> 29;
    h64 = h64.wrapping_mul(PRIME64_3);
    h64 ^= h64 >> 32;
    h64
}

/// Derive the 128-bit digest from a finalized 64-bit digest.
///
/// Returns `(high, low)`.
#[inline]
pub fn derive_xxh128(xxh64: u64) -> (u64, u64) {
    let high = xxh64.wrapping_mul(PRIME64_1).rotate_left(31) ^ PRIME64_4;
    (high, xxh64)
}

/// Compute the 64-bit digest of a buffer.
pub fn xxh64(data: &[u8]) -> u64 {
    let acc = data.iter().fold(XXH64_SEED, |acc, &byte| mix(acc, byte));
    finalize(acc, data.len() as u64)
}

/// Compute the 128-bit digest of a buffer as `(high, low)`.
pub fn xxh128(data: &[u8]) -> (u64, u64) {
    derive_xxh128(xxh64(data))
}
