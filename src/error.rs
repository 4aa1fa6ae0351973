//! Error types for cut-point generation.

use std::collections::TryReserveError;

/// Errors that can occur while generating cut points.
///
/// Degenerate inputs (no values, a single bin, no viable split position) are
/// not errors; they produce an empty cut-point sequence instead.
#[derive(Debug, thiserror::Error)]
pub enum CutError {
    /// `max_bins` was zero while the input still contained values.
    #[error("max_bins must be nonzero when values are present")]
    ZeroBins,

    /// Sizing the splitting-range table overflowed `usize`.
    #[error("splitting-range table size overflows usize ({ranges} ranges)")]
    TableSizeOverflow {
        /// Number of splitting ranges that was requested.
        ranges: usize,
    },

    /// The splitting-range table could not be allocated.
    #[error("failed to allocate splitting-range table: {0}")]
    Allocation(#[from] TryReserveError),
}
