//! CRC-32/IEEE with hardware acceleration.
//!
//! The polynomial is the ISO 3309 one (0x04C11DB7, reflected: 0xEDB88320)
//! used by ZIP, GZIP and PNG. The running accumulator uses the inverted
//! convention: start at [`CRC32_INIT`], feed any number of buffers through
//! [`Crc32Dispatcher::update`], and apply [`crc32_finalize`] exactly once at
//! the end.
//!
//! ## Backends
//!
//! | Backend | Target | Bulk path |
//! |---------|--------|-----------|
//! | [`Crc32Backend::ArmCrc`] | aarch64 + `crc` | `CRC32X` on 8-byte words, `CRC32B` tail |
//! | [`Crc32Backend::Pclmulqdq`] | x86_64 + `pclmulqdq` + `sse4.1` | carry-less folding (`crc32fast`) |
//! | [`Crc32Backend::Portable`] | everywhere | slicing-by-8, byte-at-a-time tail |
//!
//! The x86 SSE4.2 `crc32` instruction implements the Castagnoli polynomial
//! (CRC-32C) and produces different digests, so it is never used here.
//!
//! All backends are bit-identical. The backend is chosen once, when the
//! dispatcher is created.

use tracing::debug;

/// Initial CRC-32 accumulator.
pub const CRC32_INIT: u32 = 0xFFFF_FFFF;

/// Reflected CRC-32/IEEE polynomial.
const CRC32_POLY_REFLECTED: u32 = 0xEDB8_8320;

/// Pre-computed CRC-32 lookup tables for slicing-by-8.
/// Table 0 is the classic byte-at-a-time table.
const CRC32_TABLE_SLICE: [[u32; 256]; 8] = {
    let mut tables = [[0u32; 256]; 8];

    let mut i = 0usize;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ CRC32_POLY_REFLECTED;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        tables[0][i] = crc;
        i += 1;
    }

    let mut t = 1;
    while t < 8 {
        let mut i = 0usize;
        while i < 256 {
            let prev = tables[t - 1][i];
            tables[t][i] = tables[0][(prev & 0xFF) as usize] ^ (prev >> 8);
            i += 1;
        }
        t += 1;
    }

    tables
};

/// Apply the final inversion to a CRC-32 accumulator.
#[inline(always)]
pub fn crc32_finalize(crc: u32) -> u32 {
    crc ^ 0xFFFF_FFFF
}

/// Feed one byte through the CRC-32 table.
#[inline(always)]
fn table_step(crc: u32, byte: u8) -> u32 {
    CRC32_TABLE_SLICE[0][((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8)
}

/// Portable CRC-32 update using slicing-by-8.
///
/// Takes and returns the accumulator in its inverted internal state.
pub fn crc32_portable(mut crc: u32, data: &[u8]) -> u32 {
    let mut words = data.chunks_exact(8);

    for bytes in &mut words {
        let crc_xor = crc ^ u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);

        crc = CRC32_TABLE_SLICE[7][(crc_xor & 0xFF) as usize]
            ^ CRC32_TABLE_SLICE[6][((crc_xor >> 8) & 0xFF) as usize]
            ^ CRC32_TABLE_SLICE[5][((crc_xor >> 16) & 0xFF) as usize]
            ^ CRC32_TABLE_SLICE[4][(crc_xor >> 24) as usize]
            ^ CRC32_TABLE_SLICE[3][bytes[4] as usize]
            ^ CRC32_TABLE_SLICE[2][bytes[5] as usize]
            ^ CRC32_TABLE_SLICE[1][bytes[6] as usize]
            ^ CRC32_TABLE_SLICE[0][bytes[7] as usize];
    }

    for &byte in words.remainder() {
        crc = table_step(crc, byte);
    }

    crc
}

/// x86_64 CRC-32 using PCLMULQDQ carry-less multiplication.
#[cfg(target_arch = "x86_64")]
pub mod x86 {
    /// Check if PCLMULQDQ and SSE4.1 are available at runtime.
    #[inline]
    pub fn is_supported() -> bool {
        std::arch::is_x86_feature_detected!("pclmulqdq")
            && std::arch::is_x86_feature_detected!("sse4.1")
    }

    /// Compute CRC-32 by carry-less folding.
    ///
    /// `crc32fast` keeps its state non-inverted, so the accumulator is
    /// flipped on the way in and on the way out.
    #[inline]
    pub fn crc32_pclmulqdq(crc: u32, data: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new_with_initial(!crc);
        hasher.update(data);
        !hasher.finalize()
    }
}

/// aarch64 CRC-32 using the ARMv8 CRC32 extension.
#[cfg(target_arch = "aarch64")]
pub mod arm {
    use core::arch::aarch64::{__crc32b, __crc32d};

    /// Check if the CRC32 extension is available at runtime.
    #[inline]
    pub fn is_supported() -> bool {
        #[cfg(target_feature = "crc")]
        {
            true
        }
        #[cfg(not(target_feature = "crc"))]
        {
            std::arch::is_aarch64_feature_detected!("crc")
        }
    }

    /// Compute CRC-32 with `CRC32X` over 8-byte words and `CRC32B` over the
    /// trailing 0 to 7 bytes.
    ///
    /// # Safety
    ///
    /// The CPU must support the CRC32 extension ([`is_supported`]).
    #[target_feature(enable = "crc")]
    pub unsafe fn crc32_arm(mut crc: u32, data: &[u8]) -> u32 {
        let mut words = data.chunks_exact(8);

        for word in &mut words {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(word);
            // SAFETY: the crc target feature is enabled on this function.
            crc = unsafe { __crc32d(crc, u64::from_le_bytes(buf)) };
        }

        for &byte in words.remainder() {
            // SAFETY: as above.
            crc = unsafe { __crc32b(crc, byte) };
        }

        crc
    }

    /// Single-byte step through `CRC32B`.
    ///
    /// # Safety
    ///
    /// The CPU must support the CRC32 extension ([`is_supported`]).
    #[inline]
    #[target_feature(enable = "crc")]
    pub unsafe fn crc32_arm_byte(crc: u32, byte: u8) -> u32 {
        // SAFETY: the crc target feature is enabled on this function.
        unsafe { __crc32b(crc, byte) }
    }
}

/// Per-byte CRC-32 update used inside the single-pass loops.
///
/// Implementations are zero-sized strategies so the single-pass kernels can
/// be monomorphized per strategy instead of branching per byte.
pub trait Crc32Step {
    /// Feed one byte into the (inverted) accumulator.
    fn step(crc: u32, byte: u8) -> u32;
}

/// Table-driven byte step, available on every target.
#[derive(Debug, Clone, Copy)]
pub struct TableStep;

impl Crc32Step for TableStep {
    #[inline(always)]
    fn step(crc: u32, byte: u8) -> u32 {
        table_step(crc, byte)
    }
}

/// Hardware `CRC32B` byte step.
///
/// Only instantiated by the dispatcher after [`arm::is_supported`] returned
/// true.
#[cfg(target_arch = "aarch64")]
#[derive(Debug, Clone, Copy)]
pub struct ArmCrcStep;

#[cfg(target_arch = "aarch64")]
impl Crc32Step for ArmCrcStep {
    #[inline(always)]
    fn step(crc: u32, byte: u8) -> u32 {
        // SAFETY: this strategy is selected only on CPUs with the CRC32
        // extension.
        unsafe { arm::crc32_arm_byte(crc, byte) }
    }
}

/// The CRC-32 implementation bound at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crc32Backend {
    /// Slicing-by-8 software implementation.
    Portable,
    /// PCLMULQDQ folding on x86_64.
    #[cfg(target_arch = "x86_64")]
    Pclmulqdq,
    /// ARMv8 CRC32 instructions on aarch64.
    #[cfg(target_arch = "aarch64")]
    ArmCrc,
}

impl Crc32Backend {
    /// Pick the fastest backend the running CPU supports.
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if x86::is_supported() {
                return Self::Pclmulqdq;
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            if arm::is_supported() {
                return Self::ArmCrc;
            }
        }
        Self::Portable
    }

    /// Short name for logs and reports.
    pub fn name(self) -> &'static str {
        match self {
            Self::Portable => "portable",
            #[cfg(target_arch = "x86_64")]
            Self::Pclmulqdq => "pclmulqdq",
            #[cfg(target_arch = "aarch64")]
            Self::ArmCrc => "arm-crc32",
        }
    }

    /// Whether this backend uses dedicated CPU instructions.
    pub fn is_accelerated(self) -> bool {
        !matches!(self, Self::Portable)
    }
}

impl std::fmt::Display for Crc32Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime dispatcher for CRC-32.
///
/// Capability detection happens once in [`Crc32Dispatcher::new`]; every
/// later call goes straight to the bound backend.
#[derive(Debug, Clone, Copy)]
pub struct Crc32Dispatcher {
    backend: Crc32Backend,
}

impl Crc32Dispatcher {
    /// Create a dispatcher bound to the best available backend.
    pub fn new() -> Self {
        let backend = Crc32Backend::detect();
        debug!(backend = backend.name(), "selected CRC-32 backend");
        Self { backend }
    }

    /// Create a dispatcher that always uses the portable implementation.
    pub fn portable() -> Self {
        Self {
            backend: Crc32Backend::Portable,
        }
    }

    /// The bound backend.
    #[inline]
    pub fn backend(&self) -> Crc32Backend {
        self.backend
    }

    /// Whether the single-pass loops can use the hardware byte instruction.
    #[inline]
    pub fn has_hardware_byte_step(&self) -> bool {
        #[cfg(target_arch = "aarch64")]
        {
            self.backend == Crc32Backend::ArmCrc
        }
        #[cfg(not(target_arch = "aarch64"))]
        {
            false
        }
    }

    /// Update an inverted CRC-32 accumulator with `data`.
    #[inline]
    pub fn update(&self, crc: u32, data: &[u8]) -> u32 {
        match self.backend {
            Crc32Backend::Portable => crc32_portable(crc, data),
            #[cfg(target_arch = "x86_64")]
            Crc32Backend::Pclmulqdq => x86::crc32_pclmulqdq(crc, data),
            // SAFETY: ArmCrc is only bound after arm::is_supported().
            #[cfg(target_arch = "aarch64")]
            Crc32Backend::ArmCrc => unsafe { arm::crc32_arm(crc, data) },
        }
    }

    /// Compute the finalized CRC-32 of a buffer.
    #[inline]
    pub fn compute(&self, data: &[u8]) -> u32 {
        crc32_finalize(self.update(CRC32_INIT, data))
    }
}

impl Default for Crc32Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Update an inverted CRC-32 accumulator using a freshly detected backend.
///
/// Prefer holding a [`Crc32Dispatcher`] (or a
/// [`HashEngine`](crate::engine::HashEngine)) to detect only once.
pub fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    Crc32Dispatcher::new().update(crc, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pseudo_random(size: usize) -> Vec<u8> {
        let mut seed: u64 = 0x1234_5678_9ABC_DEF0;
        (0..size)
            .map(|_| {
                seed = seed
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                (seed >> 33) as u8
            })
            .collect()
    }

    #[test]
    fn test_portable_check_value() {
        let crc = crc32_portable(CRC32_INIT, b"123456789");
        assert_eq!(crc32_finalize(crc), 0xCBF43926);
    }

    #[test]
    fn test_portable_empty() {
        assert_eq!(crc32_finalize(crc32_portable(CRC32_INIT, b"")), 0);
    }

    #[test]
    fn test_portable_hello_world() {
        assert_eq!(Crc32Dispatcher::portable().compute(b"Hello, World!"), 0xEC4AC3D0);
    }

    #[test]
    fn test_slice8_matches_bytewise() {
        for size in [1, 7, 8, 9, 15, 16, 17, 31, 32, 63, 64, 127, 128] {
            let data = pseudo_random(size);
            let sliced = crc32_portable(CRC32_INIT, &data);
            let bytewise = data.iter().fold(CRC32_INIT, |crc, &b| TableStep::step(crc, b));
            assert_eq!(sliced, bytewise, "CRC mismatch for size {}", size);
        }
    }

    #[test]
    fn test_slice8_table_correctness() {
        assert_eq!(CRC32_TABLE_SLICE[0][0], 0x00000000);
        assert_eq!(CRC32_TABLE_SLICE[0][1], 0x77073096);
        assert_eq!(CRC32_TABLE_SLICE[0][255], 0x2D02EF8D);

        for t in 1..8 {
            for i in 0..256 {
                let prev = CRC32_TABLE_SLICE[t - 1][i];
                let expected = CRC32_TABLE_SLICE[0][(prev & 0xFF) as usize] ^ (prev >> 8);
                assert_eq!(CRC32_TABLE_SLICE[t][i], expected, "Table {} entry {} mismatch", t, i);
            }
        }
    }

    #[test]
    fn test_detected_matches_portable() {
        let detected = Crc32Dispatcher::new();
        let portable = Crc32Dispatcher::portable();

        for size in [0, 1, 7, 8, 9, 1000, 1_000_003] {
            let data = pseudo_random(size);
            assert_eq!(
                detected.compute(&data),
                portable.compute(&data),
                "CRC mismatch for size {} ({} vs portable)",
                size,
                detected.backend()
            );
        }
    }

    #[test]
    fn test_incremental_matches_single_call() {
        let dispatcher = Crc32Dispatcher::new();
        let data = pseudo_random(4099);
        let single = dispatcher.compute(&data);

        for chunk_size in [1, 7, 8, 16, 17, 64, 1000] {
            let mut crc = CRC32_INIT;
            for chunk in data.chunks(chunk_size) {
                crc = dispatcher.update(crc, chunk);
            }
            assert_eq!(
                crc32_finalize(crc),
                single,
                "Incremental CRC mismatch with chunk size {}",
                chunk_size
            );
        }
    }

    #[test]
    fn test_portable_dispatcher_is_not_accelerated() {
        let dispatcher = Crc32Dispatcher::portable();
        assert_eq!(dispatcher.backend(), Crc32Backend::Portable);
        assert!(!dispatcher.backend().is_accelerated());
        assert!(!dispatcher.has_hardware_byte_step());
    }

    #[test]
    fn test_free_function_matches_dispatcher() {
        let data = pseudo_random(257);
        assert_eq!(
            crc32_update(CRC32_INIT, &data),
            Crc32Dispatcher::portable().update(CRC32_INIT, &data)
        );
    }

    #[cfg(target_arch = "aarch64")]
    #[test]
    fn test_arm_byte_step_matches_table() {
        if !arm::is_supported() {
            return;
        }
        let data = pseudo_random(333);
        let hw = data.iter().fold(CRC32_INIT, |crc, &b| ArmCrcStep::step(crc, b));
        let sw = data.iter().fold(CRC32_INIT, |crc, &b| TableStep::step(crc, b));
        assert_eq!(hw, sw);
    }
}
