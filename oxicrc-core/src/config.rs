//! Run configuration.

use crate::algorithm::{Algorithm, AlgorithmSet};
use crate::dispatch::PassMode;

/// What to compute and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashConfig {
    /// Algorithms to report. Ignored in benchmark mode, which always runs
    /// all five.
    pub selection: AlgorithmSet,
    /// Loop shape for the selective path.
    pub mode: PassMode,
    /// Run the benchmark harness instead of a selective pass.
    pub benchmark: bool,
    /// Skip hardware detection and use the portable CRC-32.
    pub portable_crc32: bool,
}

impl HashConfig {
    /// CRC-32 only, multi-pass, hardware CRC-32 when available.
    pub const DEFAULT: Self = Self {
        selection: AlgorithmSet::single(Algorithm::Crc32),
        mode: PassMode::MultiPass,
        benchmark: false,
        portable_crc32: false,
    };

    /// Configuration for a selective run over `selection`.
    pub fn new(selection: AlgorithmSet) -> Self {
        Self {
            selection,
            ..Self::DEFAULT
        }
    }

    /// Configuration for a benchmark run.
    pub fn benchmark() -> Self {
        Self {
            selection: AlgorithmSet::all(),
            mode: PassMode::SinglePass,
            benchmark: true,
            portable_crc32: false,
        }
    }

    /// Set the pass mode.
    #[must_use]
    pub fn with_mode(mut self, mode: PassMode) -> Self {
        self.mode = mode;
        self
    }

    /// Force the portable CRC-32 backend.
    #[must_use]
    pub fn with_portable_crc32(mut self, portable: bool) -> Self {
        self.portable_crc32 = portable;
        self
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
