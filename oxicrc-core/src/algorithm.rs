//! Algorithm identifiers, selection sets and digest values.

use std::fmt;

/// A supported checksum or hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
    /// CRC-16/CCITT (MSB-first, initial 0xFFFF).
    Crc16,
    /// CRC-32/IEEE.
    Crc32,
    /// CRC-64/ECMA-182 (MSB-first, initial 0).
    Crc64,
    /// Byte-wise xxHash64.
    Xxh64,
    /// 128-bit digest derived from xxHash64.
    Xxh128,
}

impl Algorithm {
    /// Every algorithm, in report order.
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Crc16,
        Algorithm::Crc32,
        Algorithm::Crc64,
        Algorithm::Xxh64,
        Algorithm::Xxh128,
    ];

    /// Display label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Crc16 => "CRC-16",
            Self::Crc32 => "CRC-32",
            Self::Crc64 => "CRC-64",
            Self::Xxh64 => "xxH64",
            Self::Xxh128 => "xxH128",
        }
    }

    /// Lowercase identifier used in machine-readable output.
    pub fn id(self) -> &'static str {
        match self {
            Self::Crc16 => "crc16",
            Self::Crc32 => "crc32",
            Self::Crc64 => "crc64",
            Self::Xxh64 => "xxh64",
            Self::Xxh128 => "xxh128",
        }
    }

    /// Number of hex digits in the formatted digest.
    pub fn hex_width(self) -> usize {
        match self {
            Self::Crc16 => 4,
            Self::Crc32 => 8,
            Self::Crc64 | Self::Xxh64 => 16,
            Self::Xxh128 => 32,
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An immutable set of requested algorithms.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AlgorithmSet(u8);

impl AlgorithmSet {
    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every algorithm.
    pub const fn all() -> Self {
        Self(0b1_1111)
    }

    /// A set holding one algorithm.
    pub const fn single(algorithm: Algorithm) -> Self {
        Self(algorithm.bit())
    }

    /// Return a copy with `algorithm` added.
    #[must_use]
    pub const fn with(self, algorithm: Algorithm) -> Self {
        Self(self.0 | algorithm.bit())
    }

    /// Add an algorithm.
    pub fn insert(&mut self, algorithm: Algorithm) {
        self.0 |= algorithm.bit();
    }

    /// Check membership.
    pub const fn contains(self, algorithm: Algorithm) -> bool {
        self.0 & algorithm.bit() != 0
    }

    /// Whether no algorithm is selected.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of selected algorithms.
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the xxHash64 accumulator has to run. xxHash128 is derived
    /// from it, so either of the two needs it.
    pub const fn needs_xxh64(self) -> bool {
        self.contains(Algorithm::Xxh64) || self.contains(Algorithm::Xxh128)
    }

    /// Iterate in report order.
    pub fn iter(self) -> impl Iterator<Item = Algorithm> {
        Algorithm::ALL.into_iter().filter(move |&a| self.contains(a))
    }
}

impl FromIterator<Algorithm> for AlgorithmSet {
    fn from_iter<I: IntoIterator<Item = Algorithm>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl fmt::Debug for AlgorithmSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// A finalized digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Digest {
    /// CRC-16 value.
    Crc16(u16),
    /// CRC-32 value.
    Crc32(u32),
    /// CRC-64 value.
    Crc64(u64),
    /// xxHash64 value.
    Xxh64(u64),
    /// 128-bit digest as two 64-bit halves.
    Xxh128 {
        /// High 64 bits (printed first).
        high: u64,
        /// Low 64 bits; equal to the xxHash64 digest.
        low: u64,
    },
}

impl Digest {
    /// The algorithm that produced this digest.
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Self::Crc16(_) => Algorithm::Crc16,
            Self::Crc32(_) => Algorithm::Crc32,
            Self::Crc64(_) => Algorithm::Crc64,
            Self::Xxh64(_) => Algorithm::Xxh64,
            Self::Xxh128 { .. } => Algorithm::Xxh128,
        }
    }

    /// Fixed-width uppercase hex representation.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crc16(v) => write!(f, "{v:04X}"),
            Self::Crc32(v) => write!(f, "{v:08X}"),
            Self::Crc64(v) | Self::Xxh64(v) => write!(f, "{v:016X}"),
            Self::Xxh128 { high, low } => write!(f, "{high:016X}{low:016X}"),
        }
    }
}

/// The digests of one pass, in report order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DigestSet {
    digests: Vec<Digest>,
}

impl DigestSet {
    pub(crate) fn from_digests(mut digests: Vec<Digest>) -> Self {
        digests.sort_by_key(Digest::algorithm);
        Self { digests }
    }

    /// Look up the digest of one algorithm.
    pub fn get(&self, algorithm: Algorithm) -> Option<Digest> {
        self.digests
            .iter()
            .copied()
            .find(|d| d.algorithm() == algorithm)
    }

    /// Iterate in report order.
    pub fn iter(&self) -> impl Iterator<Item = &Digest> {
        self.digests.iter()
    }

    /// Number of digests.
    pub fn len(&self) -> usize {
        self.digests.len()
    }

    /// Whether the set holds no digests.
    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    /// The algorithms present.
    pub fn algorithms(&self) -> AlgorithmSet {
        self.digests.iter().map(Digest::algorithm).collect()
    }
}

impl<'a> IntoIterator for &'a DigestSet {
    type Item = &'a Digest;
    type IntoIter = std::slice::Iter<'a, Digest>;

    fn into_iter(self) -> Self::IntoIter {
        self.digests.iter()
    }
}
