//! Quantile cut-point generation.
//!
//! [`generate_quantile_cuts`] is the top of the pipeline: it filters missing
//! values out of the caller's buffer, sorts what remains, segments the sorted
//! sequence into splitting ranges, assigns each range a cut quota, and turns
//! the quotas into concrete boundary values.

use log::{debug, trace, warn};

use crate::error::CutError;
use crate::quota::assign_cut_quotas;
use crate::random::SeededIndexSource;
use crate::segment::{
    average_length, compact_non_missing, effective_max_bins, segment_values, sort_values,
    SplittingRange,
};

// ============================================================================
// CutOutput
// ============================================================================

/// Result of quantile cut-point generation.
#[derive(Debug, Clone, PartialEq)]
pub struct CutOutput {
    /// Strictly increasing cut values. Each cut is the inclusive lower bound
    /// of the bin above it.
    pub cut_points: Vec<f64>,
    /// Whether the input contained NaN entries.
    pub had_missing: bool,
    /// Smallest non-missing value, or 0.0 when there were none.
    pub min_value: f64,
    /// Largest non-missing value, or 0.0 when there were none.
    pub max_value: f64,
}

impl CutOutput {
    fn empty(had_missing: bool) -> Self {
        Self {
            cut_points: Vec::new(),
            had_missing,
            min_value: 0.0,
            max_value: 0.0,
        }
    }

    fn no_cuts(had_missing: bool, min_value: f64, max_value: f64) -> Self {
        Self {
            cut_points: Vec::new(),
            had_missing,
            min_value,
            max_value,
        }
    }
}

// ============================================================================
// Generation
// ============================================================================

/// Compute quantile-style cut points for one feature's values.
///
/// `values` is the caller's buffer; NaN entries are compacted out in place
/// and the remainder is sorted ascending. The resulting cut points respect
/// `max_bins` (at most `effective_max_bins - 1` cuts) and
/// `min_instances_per_bin` (every induced bin holds at least that many
/// non-missing items), and never fall inside a run of equal values.
///
/// The same seed, values, and parameters reproduce the same cut points
/// bit for bit; the seed only influences which of several equally fair
/// layouts is chosen.
///
/// Degenerate inputs (no values, `max_bins <= 1`, too few items for a single
/// cut, no boundary between distinct values) produce an empty cut-point
/// sequence, not an error.
///
/// # Errors
///
/// `max_bins == 0` with a non-empty buffer, or failure to size or allocate
/// the internal splitting-range table.
pub fn generate_quantile_cuts(
    seed: u64,
    values: &mut Vec<f64>,
    max_bins: usize,
    min_instances_per_bin: usize,
) -> Result<CutOutput, CutError> {
    trace!(
        "generate_quantile_cuts: seed={} count={} max_bins={} min_instances_per_bin={}",
        seed,
        values.len(),
        max_bins,
        min_instances_per_bin
    );

    if max_bins == 0 && !values.is_empty() {
        warn!("generate_quantile_cuts: max_bins is 0 but values are present");
        return Err(CutError::ZeroBins);
    }

    let had_missing = compact_non_missing(values);
    if values.is_empty() {
        return Ok(finish(CutOutput::empty(had_missing)));
    }

    sort_values(values);
    let min_value = values[0];
    let max_value = values[values.len() - 1];

    if max_bins <= 1 {
        // A single bin has no boundaries.
        return Ok(finish(CutOutput::no_cuts(had_missing, min_value, max_value)));
    }

    let min_instances_per_bin = min_instances_per_bin.max(1);
    let count = values.len();
    if count / 2 < min_instances_per_bin {
        // A single cut already needs the minimum on both sides.
        return Ok(finish(CutOutput::no_cuts(had_missing, min_value, max_value)));
    }

    let effective_bins = effective_max_bins(had_missing, max_bins);
    let budget = effective_bins - 1;
    let avg_length = average_length(count, effective_bins, min_instances_per_bin);

    let Some(mut ranges) = segment_values(values, avg_length, min_instances_per_bin)? else {
        return Ok(finish(CutOutput::no_cuts(had_missing, min_value, max_value)));
    };

    let mut rng = SeededIndexSource::from_seed(seed);
    assign_cut_quotas(&mut ranges, budget, min_instances_per_bin, &mut rng);

    let cut_points = finalize_cut_values(values, &ranges, min_instances_per_bin, budget);
    debug_assert!(cut_points.len() <= budget);
    debug_assert!(cut_points.windows(2).all(|w| w[0] < w[1]));

    Ok(finish(CutOutput {
        cut_points,
        had_missing,
        min_value,
        max_value,
    }))
}

fn finish(output: CutOutput) -> CutOutput {
    debug!(
        "generate_quantile_cuts: {} cuts, had_missing={}",
        output.cut_points.len(),
        output.had_missing
    );
    output
}

// ============================================================================
// Cut value finalization
// ============================================================================

/// Turn per-range quotas into concrete cut values, in ascending order.
///
/// The ranges tile the sorted buffer in start order, so concatenating each
/// range's cuts yields a globally ascending sequence. Within a range, cuts
/// aim for even spacing over the splittable items, clamped to the legal
/// window: an end that is not backed by an unsplittable run must keep
/// `min_instances_per_bin` items outside the outermost cut, and consecutive
/// cuts must keep that many items between them. A cut whose ideal spot lands
/// inside a short run of equal values is nudged to the nearest legal
/// boundary; if none exists in its window the cut is dropped rather than
/// misplaced.
fn finalize_cut_values(
    values: &[f64],
    ranges: &[SplittingRange],
    min_instances_per_bin: usize,
    budget: usize,
) -> Vec<f64> {
    let total: usize = ranges.iter().map(|r| r.assigned_cuts).sum();
    let mut cut_points = Vec::with_capacity(total.min(budget));

    for range in ranges {
        let quota = range.assigned_cuts;
        if quota == 0 {
            continue;
        }
        let base = range.start;
        let splittable = range.splittable_count;

        let lo_edge = if range.prior_unsplittable > 0 {
            0
        } else {
            min_instances_per_bin
        };
        let hi_edge = if range.subsequent_unsplittable > 0 {
            splittable
        } else {
            splittable.saturating_sub(min_instances_per_bin)
        };

        let mut prev: Option<usize> = None;
        for j in 1..=quota {
            // Even spacing over the splittable mass, rounded to nearest.
            let ideal = ((j as u128 * splittable as u128 + (quota as u128 + 1) / 2)
                / (quota as u128 + 1)) as usize;

            let lo = match prev {
                Some(p) => lo_edge.max(p + min_instances_per_bin),
                None => lo_edge,
            };
            // Reserve room for the cuts still to come.
            let hi = hi_edge.saturating_sub((quota - j) * min_instances_per_bin);
            if lo > hi {
                continue;
            }

            let Some(offset) = nearest_boundary(values, base, ideal.clamp(lo, hi), lo, hi)
            else {
                continue;
            };

            let below = values[base + offset - 1];
            let above = values[base + offset];
            cut_points.push(cut_between(below, above));
            prev = Some(offset);
        }
    }

    cut_points
}

/// Find the offset closest to `ideal` within `[lo, hi]` whose boundary sits
/// between two distinct values. Ties between equally near candidates resolve
/// to the higher offset.
fn nearest_boundary(
    values: &[f64],
    base: usize,
    ideal: usize,
    lo: usize,
    hi: usize,
) -> Option<usize> {
    let distinct_at = |offset: usize| {
        let g = base + offset;
        debug_assert!(g >= 1 && g < values.len());
        values[g - 1] != values[g]
    };

    for distance in 0.. {
        let up = ideal + distance;
        let up_ok = up <= hi;
        if up_ok && distinct_at(up) {
            return Some(up);
        }
        let down_ok = distance <= ideal && ideal - distance >= lo;
        if down_ok && distinct_at(ideal - distance) {
            return Some(ideal - distance);
        }
        if !up_ok && !down_ok {
            return None;
        }
    }
    unreachable!()
}

/// Value strictly between two adjacent distinct values.
///
/// Halving each operand avoids overflow for extreme magnitudes. If rounding
/// collapses the midpoint onto the lower value, the upper value itself is
/// used: cuts are inclusive lower bounds of the bin above, so the upper
/// value is always a correct separator.
fn cut_between(below: f64, above: f64) -> f64 {
    debug_assert!(below < above);
    let mid = below / 2.0 + above / 2.0;
    if mid > below {
        mid
    } else {
        above
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cut_between_midpoint() {
        assert_eq!(cut_between(1.0, 2.0), 1.5);
        assert_eq!(cut_between(-2.0, 2.0), 0.0);
    }

    #[test]
    fn test_cut_between_adjacent_floats() {
        let below = 1.0f64;
        let above = f64::from_bits(below.to_bits() + 1);
        let cut = cut_between(below, above);
        assert!(cut > below);
        assert!(cut <= above);
    }

    #[test]
    fn test_cut_between_extreme_magnitudes() {
        let cut = cut_between(f64::MIN, f64::MAX);
        assert!(cut.is_finite());
    }

    #[test]
    fn test_empty_input() {
        let mut values = Vec::new();
        let output = generate_quantile_cuts(0, &mut values, 4, 1).unwrap();
        assert!(output.cut_points.is_empty());
        assert!(!output.had_missing);
        assert_eq!(output.min_value, 0.0);
        assert_eq!(output.max_value, 0.0);
    }

    #[test]
    fn test_zero_bins_with_values_is_error() {
        let mut values = vec![1.0, 2.0];
        let err = generate_quantile_cuts(0, &mut values, 0, 1).unwrap_err();
        assert!(matches!(err, CutError::ZeroBins));
    }

    #[test]
    fn test_zero_bins_without_values_is_ok() {
        let mut values = Vec::new();
        let output = generate_quantile_cuts(0, &mut values, 0, 1).unwrap();
        assert!(output.cut_points.is_empty());
    }

    #[test]
    fn test_single_bin_reports_min_max() {
        let mut values = vec![3.0, 1.0, 2.0];
        let output = generate_quantile_cuts(0, &mut values, 1, 1).unwrap();
        assert!(output.cut_points.is_empty());
        assert_eq!(output.min_value, 1.0);
        assert_eq!(output.max_value, 3.0);
    }

    #[test]
    fn test_quartering_cuts() {
        let mut values: Vec<f64> = (1..=100).map(f64::from).collect();
        let output = generate_quantile_cuts(42, &mut values, 4, 1).unwrap();
        assert_eq!(output.cut_points.len(), 3);
        assert!(output.cut_points.windows(2).all(|w| w[0] < w[1]));
        // Quartile boundaries land near 25, 50, 75.
        assert!((output.cut_points[0] - 25.5).abs() < 2.0);
        assert!((output.cut_points[1] - 50.5).abs() < 2.0);
        assert!((output.cut_points[2] - 75.5).abs() < 2.0);
        assert_eq!(output.min_value, 1.0);
        assert_eq!(output.max_value, 100.0);
    }

    #[test]
    fn test_all_identical_yields_no_cuts() {
        let mut values = vec![5.0; 100];
        let output = generate_quantile_cuts(0, &mut values, 4, 1).unwrap();
        assert!(output.cut_points.is_empty());
        assert_eq!(output.min_value, 5.0);
        assert_eq!(output.max_value, 5.0);
    }

    #[test]
    fn test_too_few_items_for_minimum() {
        let mut values = vec![1.0, 2.0, 3.0];
        let output = generate_quantile_cuts(0, &mut values, 4, 2).unwrap();
        assert!(output.cut_points.is_empty());
    }

    #[test]
    fn test_cuts_fall_between_distinct_values() {
        let mut values = vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 3.0, 3.0, 3.0];
        let output = generate_quantile_cuts(9, &mut values, 3, 1).unwrap();
        assert_eq!(output.cut_points, vec![1.5, 2.5]);
    }
}
