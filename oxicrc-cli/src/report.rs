//! Result formatting: the human report and its JSON mirror.

use crate::utils::format_size;
use oxicrc_core::{BenchmarkReport, BenchmarkResult, Digest, DigestSet, MappedInput, RunOutcome};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

/// Describes the input file in the report header.
pub struct InputSummary {
    pub file: String,
    pub directory: String,
    pub size: u64,
}

impl InputSummary {
    pub fn from_input(input: &MappedInput) -> Self {
        let directory = input
            .directory()
            .map(|dir| absolute_display(&dir))
            .unwrap_or_else(|| ".".to_string());

        Self {
            file: input.file_name().unwrap_or_default(),
            directory,
            size: input.len() as u64,
        }
    }
}

fn absolute_display(dir: &Path) -> String {
    std::fs::canonicalize(dir)
        .unwrap_or_else(|_| dir.to_path_buf())
        .display()
        .to_string()
}

/// Padded label column, e.g. `"xxH64 "`.
fn label(digest: &Digest) -> String {
    format!("{:<6}", digest.algorithm().label())
}

fn format_digest_line(digest: &Digest) -> String {
    format!("{}: {}", label(digest), digest)
}

fn format_benchmark_line(result: &BenchmarkResult) -> String {
    let throughput = match result.throughput_mib_s {
        Some(mib_s) => format!("{mib_s:.2}"),
        None => "--".to_string(),
    };
    format!(
        "{}: {} @ {} MB/s ({:.6} s)",
        label(&result.digest),
        result.digest,
        throughput,
        result.elapsed.as_secs_f64()
    )
}

/// Render the full human-readable report.
pub fn render_text(summary: &InputSummary, outcome: &RunOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "File  : {}", summary.file);
    let _ = writeln!(out, "Path  : {}", summary.directory);
    let _ = writeln!(out, "Size  : {}", format_size(summary.size));
    out.push('\n');

    let elapsed = match outcome {
        RunOutcome::Digests { digests, elapsed } => {
            for digest in digests {
                let _ = writeln!(out, "{}", format_digest_line(digest));
            }
            *elapsed
        }
        RunOutcome::Benchmark(report) => {
            for result in &report.results {
                let _ = writeln!(out, "{}", format_benchmark_line(result));
            }
            report.total_elapsed
        }
    };

    out.push('\n');
    let _ = writeln!(out, "Time  : {:.6} s", elapsed.as_secs_f64());
    out
}

#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub file: String,
    pub path: String,
    pub size: u64,
    pub mode: &'static str,
    pub crc32_backend: &'static str,
    pub digests: Vec<JsonDigest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<Vec<JsonBenchmark>>,
    pub elapsed_secs: f64,
}

#[derive(Debug, Serialize)]
pub struct JsonDigest {
    pub algorithm: &'static str,
    pub hex: String,
}

#[derive(Debug, Serialize)]
pub struct JsonBenchmark {
    pub algorithm: &'static str,
    pub elapsed_secs: f64,
    pub throughput_mib_s: Option<f64>,
}

impl JsonDigest {
    fn from_digest(digest: &Digest) -> Self {
        Self {
            algorithm: digest.algorithm().id(),
            hex: digest.to_hex(),
        }
    }
}

fn digests_json(digests: &DigestSet) -> Vec<JsonDigest> {
    digests.iter().map(JsonDigest::from_digest).collect()
}

fn benchmark_json(report: &BenchmarkReport) -> (Vec<JsonDigest>, Vec<JsonBenchmark>) {
    let digests = report
        .results
        .iter()
        .map(|r| JsonDigest::from_digest(&r.digest))
        .collect();
    let timings = report
        .results
        .iter()
        .map(|r| JsonBenchmark {
            algorithm: r.algorithm().id(),
            elapsed_secs: r.elapsed.as_secs_f64(),
            throughput_mib_s: r.throughput_mib_s,
        })
        .collect();
    (digests, timings)
}

impl JsonReport {
    pub fn new(
        summary: InputSummary,
        mode: &'static str,
        crc32_backend: &'static str,
        outcome: &RunOutcome,
    ) -> Self {
        let (digests, benchmark, elapsed): (_, _, Duration) = match outcome {
            RunOutcome::Digests { digests, elapsed } => (digests_json(digests), None, *elapsed),
            RunOutcome::Benchmark(report) => {
                let (digests, timings) = benchmark_json(report);
                (digests, Some(timings), report.total_elapsed)
            }
        };

        Self {
            file: summary.file,
            path: summary.directory,
            size: summary.size,
            mode,
            crc32_backend,
            digests,
            benchmark,
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }
}
