//! Memory-mapped input files.
//!
//! The engine hashes a contiguous byte slice. [`MappedInput`] provides one for
//! a file on disk by mapping it read-only, so the whole file is visible to the
//! hash loops without an intermediate copy.
//!
//! # Example
//!
//! ```no_run
//! use oxicrc_core::input::MappedInput;
//! use oxicrc_core::HashEngine;
//! use oxicrc_core::Algorithm;
//!
//! let input = MappedInput::open("disk.img")?;
//! let engine = HashEngine::new();
//! println!("{}", engine.digest(Algorithm::Crc32, input.as_bytes()));
//! # Ok::<(), oxicrc_core::OxiCrcError>(())
//! ```
//!
//! # Safety
//!
//! Memory-mapped files can change under the mapping if another process
//! writes to them. The mapping is read-only; digests of a file that is being
//! modified concurrently are unspecified.

use crate::error::{OxiCrcError, Result};
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug)]
enum Backing {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

/// A non-empty input buffer, usually a memory-mapped file.
#[derive(Debug)]
pub struct MappedInput {
    backing: Backing,
    path: Option<PathBuf>,
}

impl MappedInput {
    /// Map the file at `path` read-only.
    ///
    /// # Errors
    ///
    /// Returns [`OxiCrcError::Io`] if the file cannot be opened or mapped,
    /// and [`OxiCrcError::EmptyInput`] if it has zero length.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;

        // Zero-length files cannot be mapped on every platform.
        if file.metadata()?.len() == 0 {
            return Err(OxiCrcError::empty_file(path));
        }

        // SAFETY: read-only mapping; concurrent modification only affects the
        // bytes observed, never memory safety of the slice we hand out.
        let mmap = unsafe { Mmap::map(&file)? };
        debug!(path = %path.display(), len = mmap.len(), "mapped input");

        Ok(Self {
            backing: Backing::Mapped(mmap),
            path: Some(path.to_path_buf()),
        })
    }

    /// Wrap an in-memory buffer.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(OxiCrcError::empty_buffer());
        }
        Ok(Self {
            backing: Backing::Owned(bytes),
            path: None,
        })
    }

    /// The full input.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.backing {
            Backing::Mapped(mmap) => mmap,
            Backing::Owned(bytes) => bytes,
        }
    }

    /// Input length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Always `false`: empty inputs are rejected on construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Path of the mapped file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Final path component, for display.
    pub fn file_name(&self) -> Option<String> {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// Directory containing the file, `"."` for a bare file name.
    pub fn directory(&self) -> Option<PathBuf> {
        let path = self.path.as_deref()?;
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => Some(parent.to_path_buf()),
            _ => Some(PathBuf::from(".")),
        }
    }
}

impl AsRef<[u8]> for MappedInput {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
