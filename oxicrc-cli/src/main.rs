//! OxiCRC CLI - multi-algorithm checksums
//!
//! Computes CRC-16, CRC-32, CRC-64, xxHash64 and xxHash128 over a file, or
//! benchmarks all of them.

mod report;
mod utils;

use clap::Parser;
use oxicrc_core::{
    Algorithm, AlgorithmSet, HashConfig, HashEngine, MappedInput, NoProgress, PassMode,
};
use report::{InputSummary, JsonReport, render_text};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use utils::{IndicatifProgress, create_progress_bar};

/// Environment variable overriding the `-v` log level.
const LOG_ENV: &str = "OXICRC_LOG";

#[derive(Parser)]
#[command(name = "oxicrc")]
#[command(
    author,
    version,
    about = "Multi-algorithm checksum tool - CRC-16/32/64 and xxHash"
)]
#[command(long_about = "
OxiCRC computes CRC-16/CCITT-FALSE, CRC-32/IEEE, CRC-64/ECMA-182, xxHash64
and xxHash128 over a memory-mapped file. CRC-32 alone is computed when no
algorithm is selected.

Examples:
  oxicrc disk.img
  oxicrc --crc16 --crc64 disk.img
  oxicrc -a -s disk.img
  oxicrc -b disk.img
  oxicrc --json --x128 disk.img
")]
struct Cli {
    /// File to hash
    file: PathBuf,

    /// CRC-16/CCITT-FALSE
    #[arg(long, visible_alias = "c16")]
    crc16: bool,

    /// CRC-32/IEEE
    #[arg(long, visible_alias = "c32")]
    crc32: bool,

    /// CRC-64/ECMA-182
    #[arg(long, visible_alias = "c64")]
    crc64: bool,

    /// xxHash64
    #[arg(long)]
    x64: bool,

    /// xxHash128
    #[arg(long)]
    x128: bool,

    /// All algorithms
    #[arg(short, long)]
    all: bool,

    /// Compute every selected algorithm in one traversal
    #[arg(short, long)]
    single: bool,

    /// Time each algorithm separately (always runs all five)
    #[arg(short, long)]
    benchmark: bool,

    /// Use the portable CRC-32 even when hardware support is present
    #[arg(long)]
    portable: bool,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Output as JSON (machine-readable)
    #[arg(long)]
    json: bool,

    /// More log output on stderr (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// CRC-32 alone unless any algorithm flag is given.
    fn selection(&self) -> AlgorithmSet {
        if self.all {
            return AlgorithmSet::all();
        }

        let flags = [
            (self.crc16, Algorithm::Crc16),
            (self.crc32, Algorithm::Crc32),
            (self.crc64, Algorithm::Crc64),
            (self.x64, Algorithm::Xxh64),
            (self.x128, Algorithm::Xxh128),
        ];
        let selection: AlgorithmSet = flags
            .into_iter()
            .filter_map(|(enabled, algorithm)| enabled.then_some(algorithm))
            .collect();

        if selection.is_empty() {
            AlgorithmSet::single(Algorithm::Crc32)
        } else {
            selection
        }
    }

    fn config(&self) -> HashConfig {
        if self.benchmark {
            return HashConfig::benchmark().with_portable_crc32(self.portable);
        }

        let mode = if self.single {
            PassMode::SinglePass
        } else {
            PassMode::MultiPass
        };
        HashConfig::new(self.selection())
            .with_mode(mode)
            .with_portable_crc32(self.portable)
    }

    fn mode_name(&self) -> &'static str {
        if self.benchmark {
            "benchmark"
        } else if self.single {
            "single-pass"
        } else {
            "multi-pass"
        }
    }

    fn show_progress(&self) -> bool {
        self.single && !self.benchmark && !self.no_progress && !self.json
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    // Ignore a second init attempt; only one subscriber can be global.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.config();
    let input = MappedInput::open(&cli.file)?;
    let engine = HashEngine::from_config(&config);
    let backend = engine.crc32_dispatcher().backend();
    debug!(%backend, mode = cli.mode_name(), "hashing {}", cli.file.display());

    let data = input.as_bytes();
    let outcome = if cli.show_progress() {
        let mut progress =
            IndicatifProgress::new(create_progress_bar(data.len() as u64, true));
        let outcome = engine.execute(&config, data, &mut progress);
        progress.finish();
        outcome?
    } else {
        engine.execute(&config, data, &mut NoProgress)?
    };

    let summary = InputSummary::from_input(&input);
    if cli.json {
        let report = JsonReport::new(summary, cli.mode_name(), backend.name(), &outcome);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&summary, &outcome));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("valid arguments")
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_selection_is_crc32() {
        let cli = parse(&["oxicrc", "file.bin"]);
        assert_eq!(cli.selection(), AlgorithmSet::single(Algorithm::Crc32));
        assert_eq!(cli.config().mode, PassMode::MultiPass);
    }

    #[test]
    fn test_explicit_flags_replace_default() {
        let cli = parse(&["oxicrc", "--crc16", "--c64", "file.bin"]);
        let selection = cli.selection();
        assert!(selection.contains(Algorithm::Crc16));
        assert!(selection.contains(Algorithm::Crc64));
        assert!(!selection.contains(Algorithm::Crc32));
    }

    #[test]
    fn test_all_and_single() {
        let cli = parse(&["oxicrc", "-a", "-s", "file.bin"]);
        assert_eq!(cli.selection(), AlgorithmSet::all());
        assert_eq!(cli.config().mode, PassMode::SinglePass);
    }

    #[test]
    fn test_benchmark_config() {
        let cli = parse(&["oxicrc", "-b", "--portable", "file.bin"]);
        let config = cli.config();
        assert!(config.benchmark);
        assert!(config.portable_crc32);
        assert!(!cli.show_progress());
    }

    #[test]
    fn test_verbose_count() {
        let cli = parse(&["oxicrc", "-vv", "file.bin"]);
        assert_eq!(cli.verbose, 2);
    }
}
