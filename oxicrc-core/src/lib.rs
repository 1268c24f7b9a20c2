//! # OxiCRC Core
//!
//! Streaming multi-algorithm checksum engine.
//!
//! This crate computes CRC-16/CCITT-FALSE, CRC-32/IEEE, CRC-64/ECMA-182,
//! an xxHash64-style byte mixer and a 128-bit digest derived from it, over a
//! single in-memory buffer:
//!
//! - [`tables`]: CRC-16 and CRC-64 lookup tables
//! - [`crc32`]: CRC-32 with hardware backends and a portable fallback
//! - [`xxhash`]: xxHash64 mixer and the derived 128-bit digest
//! - [`dispatch`]: multi-pass and single-pass loops over a selection
//! - [`bench`]: per-algorithm timing harness
//! - [`engine`]: the [`HashEngine`] context tying it together
//! - [`input`]: memory-mapped input files
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ CLI                                                     │
//! │     argument parsing, progress bar, report formatting  │
//! ├─────────────────────────────────────────────────────────┤
//! │ Engine                                                  │
//! │     HashEngine, pass dispatcher, benchmark harness     │
//! ├─────────────────────────────────────────────────────────┤
//! │ Primitives                                              │
//! │     CRC tables, CRC-32 backends, xxHash mixer          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxicrc_core::{Algorithm, AlgorithmSet, HashEngine, NoProgress, PassMode};
//!
//! let engine = HashEngine::new();
//! let selection = AlgorithmSet::single(Algorithm::Crc32).with(Algorithm::Crc16);
//! let digests = engine
//!     .run_pass(b"123456789", selection, PassMode::SinglePass, &mut NoProgress)
//!     .unwrap();
//!
//! assert_eq!(digests.get(Algorithm::Crc32).unwrap().to_hex(), "CBF43926");
//! assert_eq!(digests.get(Algorithm::Crc16).unwrap().to_hex(), "29B1");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod algorithm;
pub mod bench;
pub mod config;
pub mod crc32;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod input;
pub mod progress;
pub mod tables;
pub mod xxhash;

// Re-exports for convenience
pub use algorithm::{Algorithm, AlgorithmSet, Digest, DigestSet};
pub use bench::{BenchmarkReport, BenchmarkResult};
pub use config::HashConfig;
pub use crc32::{Crc32Backend, Crc32Dispatcher};
pub use dispatch::{Accumulators, PassMode};
pub use engine::{HashEngine, RunOutcome};
pub use error::{OxiCrcError, Result};
pub use input::MappedInput;
pub use progress::{NoProgress, ProgressSink};
pub use tables::CrcTables;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::algorithm::{Algorithm, AlgorithmSet, Digest, DigestSet};
    pub use crate::config::HashConfig;
    pub use crate::dispatch::PassMode;
    pub use crate::engine::{HashEngine, RunOutcome};
    pub use crate::error::{OxiCrcError, Result};
    pub use crate::input::MappedInput;
    pub use crate::progress::{NoProgress, ProgressSink};
}
