//! Pass dispatcher: one specialized loop per algorithm combination.
//!
//! ## Loop shapes
//!
//! - [`PassMode::MultiPass`]: CRC-32 runs once through the bulk
//!   [`Crc32Dispatcher`](crate::crc32::Crc32Dispatcher) path; every other
//!   algorithm gets its own full traversal. xxHash64 and xxHash128 share one.
//! - [`PassMode::SinglePass`]: one traversal updates every requested
//!   accumulator. CRC-32 goes through the per-byte step, trading bulk CRC-32
//!   speed for a single walk over memory.
//!
//! ## Specialization
//!
//! `fold_chunk` is generic over the CRC-32 byte step and four `const bool`
//! lane switches. Each combination is its own instantiation, so inside the
//! hot loop the disabled lanes are compiled out and no byte ever branches on
//! "is this algorithm enabled". The instantiation is picked once per pass.

use crate::algorithm::{Algorithm, AlgorithmSet, Digest, DigestSet};
use crate::crc32::{CRC32_INIT, Crc32Dispatcher, Crc32Step, TableStep, crc32_finalize};
use crate::engine::HashEngine;
use crate::error::{OxiCrcError, Result};
use crate::progress::{ProgressSink, progress_interval};
use crate::tables::{CRC16_INIT, CRC64_INIT, CrcTables};
use crate::xxhash;
use tracing::debug;

/// How the selective path walks the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassMode {
    /// Bulk CRC-32 plus one traversal per remaining algorithm.
    #[default]
    MultiPass,
    /// A single traversal updating every requested accumulator.
    SinglePass,
}

/// Running registers for every algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accumulators {
    crc16: u16,
    crc32: u32,
    crc64: u64,
    xxh64: u64,
}

impl Accumulators {
    /// Registers at their seed values.
    pub fn new() -> Self {
        Self {
            crc16: CRC16_INIT,
            crc32: CRC32_INIT,
            crc64: CRC64_INIT,
            xxh64: xxhash::XXH64_SEED,
        }
    }

    /// Finalize the register behind `algorithm`.
    pub fn digest(&self, algorithm: Algorithm, total_len: u64) -> Digest {
        match algorithm {
            Algorithm::Crc16 => Digest::Crc16(self.crc16),
            Algorithm::Crc32 => Digest::Crc32(crc32_finalize(self.crc32)),
            Algorithm::Crc64 => Digest::Crc64(self.crc64),
            Algorithm::Xxh64 => Digest::Xxh64(xxhash::finalize(self.xxh64, total_len)),
            Algorithm::Xxh128 => {
                let (high, low) = xxhash::derive_xxh128(xxhash::finalize(self.xxh64, total_len));
                Digest::Xxh128 { high, low }
            }
        }
    }

    /// Finalize every selected algorithm.
    pub fn finish(self, total_len: u64, selection: AlgorithmSet) -> DigestSet {
        let digests = selection
            .iter()
            .map(|algorithm| self.digest(algorithm, total_len))
            .collect();
        DigestSet::from_digests(digests)
    }
}

impl Default for Accumulators {
    fn default() -> Self {
        Self::new()
    }
}

/// Which accumulators a kernel updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Lanes {
    crc16: bool,
    crc32: bool,
    crc64: bool,
    xxh64: bool,
}

impl Lanes {
    fn for_selection(selection: AlgorithmSet) -> Self {
        Self {
            crc16: selection.contains(Algorithm::Crc16),
            crc32: selection.contains(Algorithm::Crc32),
            crc64: selection.contains(Algorithm::Crc64),
            xxh64: selection.needs_xxh64(),
        }
    }

    pub(crate) const CRC16: Self = Self {
        crc16: true,
        crc32: false,
        crc64: false,
        xxh64: false,
    };

    pub(crate) const CRC64: Self = Self {
        crc16: false,
        crc32: false,
        crc64: true,
        xxh64: false,
    };

    pub(crate) const XXH64: Self = Self {
        crc16: false,
        crc32: false,
        crc64: false,
        xxh64: true,
    };
}

/// A specialized loop updating a fixed set of accumulators over one chunk.
pub(crate) type ChunkKernel = fn(&CrcTables, &mut Accumulators, &[u8]);

fn fold_chunk<S: Crc32Step, const C16: bool, const C32: bool, const C64: bool, const XXH: bool>(
    tables: &CrcTables,
    acc: &mut Accumulators,
    chunk: &[u8],
) {
    let mut crc16 = acc.crc16;
    let mut crc32 = acc.crc32;
    let mut crc64 = acc.crc64;
    let mut xxh64 = acc.xxh64;

    for &byte in chunk {
        if C16 {
            crc16 = tables.crc16_step(crc16, byte);
        }
        if C32 {
            crc32 = S::step(crc32, byte);
        }
        if C64 {
            crc64 = tables.crc64_step(crc64, byte);
        }
        if XXH {
            xxh64 = xxhash::mix(xxh64, byte);
        }
    }

    acc.crc16 = crc16;
    acc.crc32 = crc32;
    acc.crc64 = crc64;
    acc.xxh64 = xxh64;
}

macro_rules! kernel_table {
    ($step:ty, $key:expr; $(($a:literal, $b:literal, $c:literal, $d:literal)),* $(,)?) => {
        match $key {
            $(($a, $b, $c, $d) => fold_chunk::<$step, $a, $b, $c, $d> as ChunkKernel,)*
        }
    };
}

fn select_kernel<S: Crc32Step>(lanes: Lanes) -> ChunkKernel {
    kernel_table!(S, (lanes.crc16, lanes.crc32, lanes.crc64, lanes.xxh64);
        (false, false, false, false),
        (false, false, false, true),
        (false, false, true, false),
        (false, false, true, true),
        (false, true, false, false),
        (false, true, false, true),
        (false, true, true, false),
        (false, true, true, true),
        (true, false, false, false),
        (true, false, false, true),
        (true, false, true, false),
        (true, false, true, true),
        (true, true, false, false),
        (true, true, false, true),
        (true, true, true, false),
        (true, true, true, true),
    )
}

/// Pick the kernel for `lanes`, using the hardware CRC-32 byte step when the
/// dispatcher has one.
pub(crate) fn kernel_for(crc32: &Crc32Dispatcher, lanes: Lanes) -> ChunkKernel {
    #[cfg(target_arch = "aarch64")]
    {
        if crc32.has_hardware_byte_step() {
            return select_kernel::<crate::crc32::ArmCrcStep>(lanes);
        }
    }
    #[cfg(not(target_arch = "aarch64"))]
    let _ = crc32;

    select_kernel::<TableStep>(lanes)
}

/// Run one traversal for a single algorithm and return its digest.
///
/// CRC-32 uses the bulk path; the others use their one-lane kernel.
pub(crate) fn single_algorithm(engine: &HashEngine, data: &[u8], algorithm: Algorithm) -> Digest {
    let mut acc = Accumulators::new();

    match algorithm {
        Algorithm::Crc32 => {
            acc.crc32 = engine.crc32_dispatcher().update(acc.crc32, data);
        }
        Algorithm::Crc16 => select_kernel::<TableStep>(Lanes::CRC16)(engine.tables(), &mut acc, data),
        Algorithm::Crc64 => select_kernel::<TableStep>(Lanes::CRC64)(engine.tables(), &mut acc, data),
        Algorithm::Xxh64 | Algorithm::Xxh128 => {
            select_kernel::<TableStep>(Lanes::XXH64)(engine.tables(), &mut acc, data)
        }
    }

    acc.digest(algorithm, data.len() as u64)
}

/// Hash `data` with every algorithm in `selection`.
///
/// The progress sink is only called in [`PassMode::SinglePass`].
pub fn run_pass(
    engine: &HashEngine,
    data: &[u8],
    selection: AlgorithmSet,
    mode: PassMode,
    progress: &mut dyn ProgressSink,
) -> Result<DigestSet> {
    if selection.is_empty() {
        return Err(OxiCrcError::EmptySelection);
    }
    if data.is_empty() {
        return Err(OxiCrcError::empty_buffer());
    }

    debug!(?selection, ?mode, len = data.len(), "starting pass");

    let acc = match mode {
        PassMode::MultiPass => multi_pass(engine, data, selection),
        PassMode::SinglePass => single_pass(engine, data, selection, progress),
    };

    Ok(acc.finish(data.len() as u64, selection))
}

fn multi_pass(engine: &HashEngine, data: &[u8], selection: AlgorithmSet) -> Accumulators {
    let lanes = Lanes::for_selection(selection);
    let mut acc = Accumulators::new();

    if lanes.crc32 {
        acc.crc32 = engine.crc32_dispatcher().update(acc.crc32, data);
    }

    let rest = [
        (lanes.crc16, Lanes::CRC16),
        (lanes.crc64, Lanes::CRC64),
        (lanes.xxh64, Lanes::XXH64),
    ];
    for (_, lane) in rest.into_iter().filter(|(enabled, _)| *enabled) {
        select_kernel::<TableStep>(lane)(engine.tables(), &mut acc, data);
    }

    acc
}

fn single_pass(
    engine: &HashEngine,
    data: &[u8],
    selection: AlgorithmSet,
    progress: &mut dyn ProgressSink,
) -> Accumulators {
    let kernel = kernel_for(engine.crc32_dispatcher(), Lanes::for_selection(selection));
    let total = data.len() as u64;
    let mut done = 0u64;
    let mut acc = Accumulators::new();

    for chunk in data.chunks(progress_interval(data.len())) {
        kernel(engine.tables(), &mut acc, chunk);
        done += chunk.len() as u64;
        progress.report(done, total);
    }

    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;

    fn sample(size: usize) -> Vec<u8> {
        (0..size).map(|i| (i * 7 + i / 13) as u8).collect()
    }

    fn every_subset() -> impl Iterator<Item = AlgorithmSet> {
        (1u8..32).map(|mask| {
            Algorithm::ALL
                .into_iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, a)| a)
                .collect::<AlgorithmSet>()
        })
    }

    #[test]
    fn test_check_values_both_modes() {
        let engine = HashEngine::new();
        for mode in [PassMode::MultiPass, PassMode::SinglePass] {
            let digests = run_pass(&engine, b"123456789", AlgorithmSet::all(), mode, &mut NoProgress)
                .unwrap();
            assert_eq!(digests.get(Algorithm::Crc16), Some(Digest::Crc16(0x29B1)));
            assert_eq!(digests.get(Algorithm::Crc32), Some(Digest::Crc32(0xCBF43926)));
            assert_eq!(
                digests.get(Algorithm::Crc64),
                Some(Digest::Crc64(0x6C40DF5F0B497347))
            );
            assert_eq!(
                digests.get(Algorithm::Xxh64),
                Some(Digest::Xxh64(0xFCBCA811732DB0BA))
            );
            assert_eq!(
                digests.get(Algorithm::Xxh128),
                Some(Digest::Xxh128 {
                    high: 0x564FB17CFCB7D25B,
                    low: 0xFCBCA811732DB0BA
                })
            );
        }
    }

    #[test]
    fn test_single_pass_matches_multi_pass_for_every_subset() {
        let engine = HashEngine::new();
        let data = sample(4133);
        for selection in every_subset() {
            let multi =
                run_pass(&engine, &data, selection, PassMode::MultiPass, &mut NoProgress).unwrap();
            let single =
                run_pass(&engine, &data, selection, PassMode::SinglePass, &mut NoProgress).unwrap();
            assert_eq!(multi, single, "mode mismatch for {:?}", selection);
            assert_eq!(multi.algorithms(), selection);
        }
    }

    #[test]
    fn test_portable_engine_matches_detected() {
        let detected = HashEngine::new();
        let portable = HashEngine::portable();
        let data = sample(10_007);
        for mode in [PassMode::MultiPass, PassMode::SinglePass] {
            let a = run_pass(&detected, &data, AlgorithmSet::all(), mode, &mut NoProgress).unwrap();
            let b = run_pass(&portable, &data, AlgorithmSet::all(), mode, &mut NoProgress).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_empty_selection_rejected() {
        let engine = HashEngine::new();
        let err = run_pass(
            &engine,
            b"data",
            AlgorithmSet::empty(),
            PassMode::SinglePass,
            &mut NoProgress,
        )
        .unwrap_err();
        assert!(matches!(err, OxiCrcError::EmptySelection));
    }

    #[test]
    fn test_empty_buffer_rejected() {
        let engine = HashEngine::new();
        let err = run_pass(
            &engine,
            b"",
            AlgorithmSet::all(),
            PassMode::MultiPass,
            &mut NoProgress,
        )
        .unwrap_err();
        assert!(matches!(err, OxiCrcError::EmptyInput { path: None }));
    }

    #[test]
    fn test_progress_only_in_single_pass() {
        let engine = HashEngine::new();
        let data = sample(1000);

        let mut calls = 0;
        let mut sink = |_: u64, _: u64| calls += 1;
        run_pass(&engine, &data, AlgorithmSet::all(), PassMode::MultiPass, &mut sink).unwrap();
        assert_eq!(calls, 0);

        let mut reports = Vec::new();
        let mut sink = |done: u64, total: u64| reports.push((done, total));
        run_pass(&engine, &data, AlgorithmSet::all(), PassMode::SinglePass, &mut sink).unwrap();
        assert_eq!(reports.len(), 100);
        assert_eq!(reports.last(), Some(&(1000, 1000)));
    }

    #[test]
    fn test_progress_final_report_with_uneven_tail() {
        let engine = HashEngine::new();
        let data = sample(1234);
        let mut reports = Vec::new();
        let mut sink = |done: u64, total: u64| reports.push((done, total));
        run_pass(
            &engine,
            &data,
            AlgorithmSet::single(Algorithm::Crc16),
            PassMode::SinglePass,
            &mut sink,
        )
        .unwrap();

        assert!(reports.windows(2).all(|w| w[0].0 <= w[1].0));
        assert!(reports.iter().all(|&(_, total)| total == 1234));
        assert_eq!(reports.last(), Some(&(1234, 1234)));
    }

    #[test]
    fn test_single_algorithm_matches_pass() {
        let engine = HashEngine::new();
        let data = sample(777);
        let all = run_pass(&engine, &data, AlgorithmSet::all(), PassMode::SinglePass, &mut NoProgress)
            .unwrap();
        for algorithm in Algorithm::ALL {
            assert_eq!(Some(single_algorithm(&engine, &data, algorithm)), all.get(algorithm));
        }
    }

    #[test]
    fn test_accumulators_finish_selects_only_requested() {
        let digests = Accumulators::new().finish(0, AlgorithmSet::single(Algorithm::Xxh128));
        assert_eq!(digests.len(), 1);
        assert_eq!(
            digests.get(Algorithm::Xxh128),
            Some(Digest::Xxh128 {
                high: 0x1AFFBEA02741DA61,
                low: 0xEF46DB3751D8E999
            })
        );
    }
}
