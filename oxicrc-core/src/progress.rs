//! Progress reporting hook for single-pass hashing.

/// Receives `(bytes_done, bytes_total)` updates while a single pass runs.
///
/// `bytes_done` never decreases between calls and the last call of a pass
/// always has `bytes_done == bytes_total`.
pub trait ProgressSink {
    /// Called roughly once per percent of input consumed.
    fn report(&mut self, bytes_done: u64, bytes_total: u64);
}

impl<F: FnMut(u64, u64)> ProgressSink for F {
    fn report(&mut self, bytes_done: u64, bytes_total: u64) {
        self(bytes_done, bytes_total)
    }
}

/// A sink that ignores every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _bytes_done: u64, _bytes_total: u64) {}
}

/// Bytes between two progress reports: one percent of the input, at least 1.
#[inline]
pub fn progress_interval(len: usize) -> usize {
    (len / 100).max(1)
}
