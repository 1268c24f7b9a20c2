//! The hash engine context.
//!
//! [`HashEngine`] owns everything the loops need that is computed once: the
//! CRC-16 and CRC-64 tables and the CRC-32 backend chosen by capability
//! detection. It is immutable after construction and is passed by reference
//! into every pass.

use crate::algorithm::{Algorithm, AlgorithmSet, Digest, DigestSet};
use crate::bench::{BenchmarkReport, run_benchmark};
use crate::config::HashConfig;
use crate::crc32::Crc32Dispatcher;
use crate::dispatch::{PassMode, run_pass, single_algorithm};
use crate::error::Result;
use crate::progress::ProgressSink;
use crate::tables::CrcTables;
use std::time::{Duration, Instant};

/// Tables plus the bound CRC-32 backend.
#[derive(Debug, Clone)]
pub struct HashEngine {
    tables: CrcTables,
    crc32: Crc32Dispatcher,
}

/// Result of [`HashEngine::execute`].
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// A selective pass.
    Digests {
        /// The requested digests.
        digests: DigestSet,
        /// Wall time of the pass.
        elapsed: Duration,
    },
    /// A benchmark run.
    Benchmark(BenchmarkReport),
}

impl HashEngine {
    /// Build the tables and detect the CRC-32 backend.
    pub fn new() -> Self {
        Self::with_crc32(Crc32Dispatcher::new())
    }

    /// Build an engine that never uses hardware CRC-32.
    pub fn portable() -> Self {
        Self::with_crc32(Crc32Dispatcher::portable())
    }

    /// Build an engine around a given CRC-32 dispatcher.
    pub fn with_crc32(crc32: Crc32Dispatcher) -> Self {
        Self {
            tables: CrcTables::new(),
            crc32,
        }
    }

    /// Build the engine a configuration asks for.
    pub fn from_config(config: &HashConfig) -> Self {
        if config.portable_crc32 {
            Self::portable()
        } else {
            Self::new()
        }
    }

    /// The CRC-16/CRC-64 tables.
    pub fn tables(&self) -> &CrcTables {
        &self.tables
    }

    /// The CRC-32 dispatcher.
    pub fn crc32_dispatcher(&self) -> &Crc32Dispatcher {
        &self.crc32
    }

    /// Compute one algorithm with its own traversal.
    pub fn digest(&self, algorithm: Algorithm, data: &[u8]) -> Digest {
        single_algorithm(self, data, algorithm)
    }

    /// Hash `data` with every algorithm in `selection`.
    ///
    /// See [`run_pass`].
    pub fn run_pass(
        &self,
        data: &[u8],
        selection: AlgorithmSet,
        mode: PassMode,
        progress: &mut dyn ProgressSink,
    ) -> Result<DigestSet> {
        run_pass(self, data, selection, mode, progress)
    }

    /// Time every algorithm over `data`.
    ///
    /// See [`run_benchmark`].
    pub fn run_benchmark(&self, data: &[u8]) -> Result<BenchmarkReport> {
        run_benchmark(self, data)
    }

    /// Run whatever `config` asks for.
    pub fn execute(
        &self,
        config: &HashConfig,
        data: &[u8],
        progress: &mut dyn ProgressSink,
    ) -> Result<RunOutcome> {
        if config.benchmark {
            return self.run_benchmark(data).map(RunOutcome::Benchmark);
        }

        let start = Instant::now();
        let digests = self.run_pass(data, config.selection, config.mode, progress)?;
        Ok(RunOutcome::Digests {
            digests,
            elapsed: start.elapsed(),
        })
    }
}

impl Default for HashEngine {
    fn default() -> Self {
        Self::new()
    }
}
