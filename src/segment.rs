//! Splitting the sorted value sequence into splittable and unsplittable ranges.
//!
//! A sorted feature column decomposes into long runs of equal values that are
//! too heavy to cut through ("unsplittable runs") and the stretches of
//! distinct-valued items between them ("splitting ranges"). Ordered by start
//! index, the splitting ranges and the unsplittable runs exactly tile the
//! non-missing values. Cut points are only ever placed inside splitting
//! ranges, so everything downstream (quota assignment, cut finalization)
//! operates on the table built here.

use crate::error::CutError;

// ============================================================================
// Missing-value filter and sorter
// ============================================================================

/// Remove NaN entries from `values` in place, preserving the order of the
/// remaining items. Returns `true` if any NaN was removed.
pub(crate) fn compact_non_missing(values: &mut Vec<f64>) -> bool {
    let before = values.len();
    values.retain(|v| !v.is_nan());
    values.len() != before
}

/// Sort the compacted values ascending. NaNs must already be removed.
pub(crate) fn sort_values(values: &mut [f64]) {
    values.sort_unstable_by(f64::total_cmp);
}

// ============================================================================
// Bin-count and run-length parameters
// ============================================================================

/// Effective maximum bin count once a missing bin may be needed.
///
/// When missing values are present, bin index 0 is reserved for them and all
/// other indexes shift up by one. If the requested maximum was an exact power
/// of two of at least 16, that shift would push the index space past a
/// storage-friendly boundary (257 values instead of 256, say), so the maximum
/// drops by one. Requests below 16 are left alone: shrinking a handful of
/// bins would change the binning itself, not just its storage.
pub(crate) fn effective_max_bins(had_missing: bool, max_bins: usize) -> usize {
    if had_missing && max_bins >= 16 && max_bins.is_power_of_two() {
        max_bins - 1
    } else {
        max_bins
    }
}

/// Minimum length an equal-value run must reach to count as unsplittable.
///
/// The ceiling guarantees every splitting range can host at least one cut
/// even in the worst-case distribution of run lengths; `div_ceil` computes
/// it exactly in integers, with no rounding hazard.
pub(crate) fn average_length(
    count: usize,
    effective_max_bins: usize,
    min_instances_per_bin: usize,
) -> usize {
    count.div_ceil(effective_max_bins).max(min_instances_per_bin)
}

// ============================================================================
// SplittingRange
// ============================================================================

bitflags::bitflags! {
    /// Position of a splitting range within the sequence of ranges.
    ///
    /// A lone range is both `FIRST` and `LAST`; interior ranges carry no flag.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct RangePosition: u8 {
        const FIRST = 0b01;
        const LAST = 0b10;
    }
}

/// One contiguous stretch of splittable items, bounded on each side by an
/// unsplittable run or the end of the data.
///
/// All positions are indexes into the sorted value buffer, so the record
/// stays valid regardless of how the buffer was allocated.
#[derive(Debug, Clone)]
pub(crate) struct SplittingRange {
    /// Index of the first splittable item.
    pub start: usize,
    /// Number of splittable items; zero when two unsplittable runs abut.
    pub splittable_count: usize,
    /// Length of the unsplittable run before this range (0 at the sequence
    /// start).
    pub prior_unsplittable: usize,
    /// Length of the unsplittable run after this range (0 at the sequence
    /// end).
    pub subsequent_unsplittable: usize,
    /// Larger of the two neighboring run lengths.
    pub unsplittable_either_side_max: usize,
    /// Smaller of the two neighboring run lengths.
    pub unsplittable_either_side_min: usize,
    /// Number of cut points this range will contribute.
    pub assigned_cuts: usize,
    /// First/last position flags.
    pub position: RangePosition,
}

impl SplittingRange {
    /// Maximum number of cuts this range can host.
    ///
    /// Each interior segment between two cuts must hold at least
    /// `min_instances_per_bin` splittable items. An end backed by an
    /// unsplittable run contributes a free cut slot: the run itself supplies
    /// the instances for the bin on that side.
    pub fn cut_capacity(&self, min_instances_per_bin: usize) -> usize {
        let backed_sides = usize::from(self.prior_unsplittable > 0)
            + usize::from(self.subsequent_unsplittable > 0);
        (self.splittable_count / min_instances_per_bin + backed_sides).saturating_sub(1)
    }
}

// ============================================================================
// Range segmentation
// ============================================================================

/// Raw range geometry produced by the segmentation walk, before flags and
/// quota are attached.
struct RangeSeed {
    start: usize,
    splittable_count: usize,
    prior_unsplittable: usize,
    subsequent_unsplittable: usize,
}

/// Walk the sorted values once, invoking `emit` for every splitting range.
///
/// Returns `true` if at least one unsplittable run was found. The same walk
/// drives both the counting pass (to size the table up front) and the fill
/// pass, so the two can never disagree.
///
/// A leading splittable stretch is only emitted if it holds at least
/// `min_instances_per_bin` items; shorter leading stretches cannot anchor a
/// cut and are folded away. The same rule applies to a trailing stretch that
/// is not closed off by an unsplittable run.
fn walk_ranges(
    values: &[f64],
    avg_length: usize,
    min_instances_per_bin: usize,
    mut emit: impl FnMut(RangeSeed),
) -> bool {
    let count = values.len();
    let mut found_run = false;
    let mut splittable_start = 0usize;
    let mut run_start = 0usize;
    let mut prior_run = 0usize;

    for i in 1..count {
        if values[i] != values[i - 1] {
            let run_len = i - run_start;
            if run_len >= avg_length {
                found_run = true;
                if splittable_start != 0
                    || run_start - splittable_start >= min_instances_per_bin
                {
                    emit(RangeSeed {
                        start: splittable_start,
                        splittable_count: run_start - splittable_start,
                        prior_unsplittable: prior_run,
                        subsequent_unsplittable: run_len,
                    });
                }
                prior_run = run_len;
                splittable_start = i;
            }
            run_start = i;
        }
    }

    // The final run is never closed by a value change, so handle it here.
    let run_len = count - run_start;
    if run_len >= avg_length {
        found_run = true;
        if splittable_start != 0 || run_start - splittable_start >= min_instances_per_bin {
            emit(RangeSeed {
                start: splittable_start,
                splittable_count: run_start - splittable_start,
                prior_unsplittable: prior_run,
                subsequent_unsplittable: run_len,
            });
        }
    } else if found_run {
        let tail = count - splittable_start;
        if tail >= min_instances_per_bin {
            emit(RangeSeed {
                start: splittable_start,
                splittable_count: tail,
                prior_unsplittable: prior_run,
                subsequent_unsplittable: 0,
            });
        }
    }

    found_run
}

/// Build the splitting-range table for a sorted, NaN-free value buffer.
///
/// Returns `Ok(None)` when no viable cut position exists anywhere, which the
/// caller reports as zero cut points. The table and its companion order
/// vector are sized with checked arithmetic and fallible reservation so an
/// infeasible allocation surfaces as an error instead of an abort.
///
/// Preconditions: `values.len() >= 2 * min_instances_per_bin` and
/// `avg_length >= min_instances_per_bin >= 1`.
pub(crate) fn segment_values(
    values: &[f64],
    avg_length: usize,
    min_instances_per_bin: usize,
) -> Result<Option<Vec<SplittingRange>>, CutError> {
    debug_assert!(min_instances_per_bin >= 1);
    debug_assert!(values.len() / 2 >= min_instances_per_bin);
    debug_assert!(avg_length >= min_instances_per_bin);

    // Counting pass: size the table before materializing any record.
    let mut range_count = 0usize;
    let found_run = walk_ranges(values, avg_length, min_instances_per_bin, |_| {
        range_count += 1;
    });

    if !found_run {
        // One range covering everything. A cut needs min_instances_per_bin
        // items on each side, so a boundary between distinct values must
        // exist inside the window [min, n - min]; with sorted values that
        // reduces to comparing the window's two ends.
        let count = values.len();
        if values[min_instances_per_bin - 1] == values[count - min_instances_per_bin] {
            return Ok(None);
        }
        let range = SplittingRange {
            start: 0,
            splittable_count: count,
            prior_unsplittable: 0,
            subsequent_unsplittable: 0,
            unsplittable_either_side_max: 0,
            unsplittable_either_side_min: 0,
            assigned_cuts: 1,
            position: RangePosition::FIRST | RangePosition::LAST,
        };
        return Ok(Some(vec![range]));
    }

    if range_count == 0 {
        return Ok(None);
    }

    // The table and the order vector used for sorting are sized together.
    let record_bytes = std::mem::size_of::<SplittingRange>() + std::mem::size_of::<usize>();
    if range_count.checked_mul(record_bytes).is_none() {
        return Err(CutError::TableSizeOverflow {
            ranges: range_count,
        });
    }
    let mut ranges: Vec<SplittingRange> = Vec::new();
    ranges.try_reserve_exact(range_count)?;

    // Fill pass: same walk, now materializing records.
    walk_ranges(values, avg_length, min_instances_per_bin, |seed| {
        let position = if seed.start == 0 {
            RangePosition::FIRST
        } else {
            RangePosition::empty()
        };
        ranges.push(SplittingRange {
            start: seed.start,
            splittable_count: seed.splittable_count,
            prior_unsplittable: seed.prior_unsplittable,
            subsequent_unsplittable: seed.subsequent_unsplittable,
            unsplittable_either_side_max: seed
                .prior_unsplittable
                .max(seed.subsequent_unsplittable),
            unsplittable_either_side_min: seed
                .prior_unsplittable
                .min(seed.subsequent_unsplittable),
            assigned_cuts: 1,
            position,
        });
    });
    debug_assert_eq!(ranges.len(), range_count);

    if let Some(last) = ranges.last_mut() {
        last.position |= RangePosition::LAST;
    }

    Ok(Some(ranges))
}

// ============================================================================
// Tests
// ============================================================================
