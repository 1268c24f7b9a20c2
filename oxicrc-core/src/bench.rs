//! Benchmark harness: one independently timed traversal per algorithm.
//!
//! Every algorithm always runs, in report order, each over the whole buffer
//! on its own. Only the traversal (and finalization) is timed; the engine's
//! tables are built before the harness starts. Digests are reported next to
//! the timings so a benchmark run can be checked against a normal run.

use crate::algorithm::{Algorithm, Digest};
use crate::dispatch::single_algorithm;
use crate::engine::HashEngine;
use crate::error::{OxiCrcError, Result};
use std::hint::black_box;
use std::time::{Duration, Instant};
use tracing::debug;

const MIB: f64 = 1024.0 * 1024.0;

/// Timing of one algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkResult {
    /// Final digest of the timed traversal.
    pub digest: Digest,
    /// Wall time of the traversal.
    pub elapsed: Duration,
    /// MiB per second, or `None` if the traversal was too fast to time.
    pub throughput_mib_s: Option<f64>,
}

impl BenchmarkResult {
    /// The timed algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.digest.algorithm()
    }
}

/// All per-algorithm timings of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkReport {
    /// Input size in bytes.
    pub bytes: u64,
    /// One entry per algorithm, in report order.
    pub results: Vec<BenchmarkResult>,
    /// Wall time of the whole run.
    pub total_elapsed: Duration,
}

impl BenchmarkReport {
    /// Look up the result of one algorithm.
    pub fn get(&self, algorithm: Algorithm) -> Option<&BenchmarkResult> {
        self.results.iter().find(|r| r.algorithm() == algorithm)
    }
}

/// Input size in MiB divided by elapsed seconds.
pub fn throughput_mib_s(bytes: u64, elapsed: Duration) -> Option<f64> {
    let secs = elapsed.as_secs_f64();
    (secs > 0.0).then(|| bytes as f64 / MIB / secs)
}

/// Time every algorithm over `data`.
pub fn run_benchmark(engine: &HashEngine, data: &[u8]) -> Result<BenchmarkReport> {
    if data.is_empty() {
        return Err(OxiCrcError::empty_buffer());
    }

    let bytes = data.len() as u64;
    let run_start = Instant::now();

    let results = Algorithm::ALL
        .into_iter()
        .map(|algorithm| {
            let start = Instant::now();
            let digest = black_box(single_algorithm(engine, black_box(data), algorithm));
            let elapsed = start.elapsed();

            debug!(%algorithm, ?elapsed, "benchmark traversal done");
            BenchmarkResult {
                digest,
                elapsed,
                throughput_mib_s: throughput_mib_s(bytes, elapsed),
            }
        })
        .collect();

    Ok(BenchmarkReport {
        bytes,
        results,
        total_elapsed: run_start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throughput() {
        let one_mib = 1024 * 1024;
        assert_eq!(throughput_mib_s(one_mib, Duration::from_secs(1)), Some(1.0));
        assert_eq!(throughput_mib_s(one_mib, Duration::from_millis(500)), Some(2.0));
        assert_eq!(throughput_mib_s(one_mib, Duration::ZERO), None);
    }

    #[test]
    fn test_runs_every_algorithm_in_order() {
        let engine = HashEngine::new();
        let report = run_benchmark(&engine, b"123456789").unwrap();
        let order: Vec<_> = report.results.iter().map(BenchmarkResult::algorithm).collect();
        assert_eq!(order, Algorithm::ALL.to_vec());
        assert_eq!(report.bytes, 9);
        assert!(report.total_elapsed >= report.results[0].elapsed);
    }

    #[test]
    fn test_reports_check_values() {
        let engine = HashEngine::new();
        let report = run_benchmark(&engine, b"123456789").unwrap();
        assert_eq!(report.get(Algorithm::Crc16).map(|r| r.digest), Some(Digest::Crc16(0x29B1)));
        assert_eq!(
            report.get(Algorithm::Crc32).map(|r| r.digest),
            Some(Digest::Crc32(0xCBF43926))
        );
    }

    #[test]
    fn test_empty_rejected() {
        let engine = HashEngine::new();
        assert!(matches!(
            run_benchmark(&engine, b""),
            Err(OxiCrcError::EmptyInput { .. })
        ));
    }
}
