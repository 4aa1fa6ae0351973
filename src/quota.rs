//! Distributing the cut-point budget across splitting ranges.
//!
//! The budget is `effective_max_bins - 1` cuts in total. Three invariants
//! hold on every path out of [`assign_cut_quotas`]:
//!
//! 1. While the budget allows, every splitting range keeps at least one cut.
//!    Every range the segmenter materializes can host one: its boundary with
//!    a neighboring unsplittable run (or its own splittable mass, for a range
//!    at the sequence edge) supplies the per-bin instance minimum.
//! 2. When the budget cannot cover one cut per range, the ranges flanked by
//!    the longest unsplittable runs win. Failing to separate a long run
//!    burns the most contiguous bin capacity, so those separations go first.
//! 3. No range is ever assigned more cuts than its capacity, and the total
//!    never exceeds the budget.
//!
//! Every tie between equally deserving ranges is resolved through the fair
//! randomized orderings, never through table position.

use crate::ordering::{order_by_splittable_ascending, order_by_unsplittable_descending};
use crate::random::IndexSource;
use crate::segment::SplittingRange;

/// Populate `assigned_cuts` for every range. `budget` is the total number of
/// cut points available; ranges arrive with the guaranteed quota of 1 already
/// set by the segmenter.
pub(crate) fn assign_cut_quotas(
    ranges: &mut [SplittingRange],
    budget: usize,
    min_instances_per_bin: usize,
    rng: &mut dyn IndexSource,
) {
    if ranges.is_empty() || budget == 0 {
        for range in ranges.iter_mut() {
            range.assigned_cuts = 0;
        }
        return;
    }

    // Both orderings are computed up front so the random stream is consumed
    // in a fixed pattern regardless of which branches run below.
    let by_unsplittable = order_by_unsplittable_descending(ranges, rng);
    let by_splittable = order_by_splittable_ascending(ranges, rng);

    // Scarcity: more ranges than cuts. The guaranteed cut survives only for
    // the ranges with the heaviest unsplittable neighbors.
    if ranges.len() > budget {
        for (pos, &idx) in by_unsplittable.iter().enumerate() {
            ranges[idx].assigned_cuts = usize::from(pos < budget);
        }
        return;
    }

    // Surplus: spread the remaining cuts proportionally to splittable mass.
    // Walking in ascending-splittable order means rounding is settled against
    // the small ranges first, while each share is recomputed against the
    // remaining budget and mass so no cut is lost to truncation drift.
    let mut remaining_budget = budget - ranges.len();
    let mut remaining_mass: u128 = ranges.iter().map(|r| r.splittable_count as u128).sum();
    for &idx in &by_splittable {
        if remaining_budget == 0 {
            break;
        }
        let range = &mut ranges[idx];
        let share = if remaining_mass == 0 {
            0
        } else {
            let ideal = (remaining_budget as u128 * range.splittable_count as u128
                + remaining_mass / 2)
                / remaining_mass;
            ideal as usize
        };
        let headroom = range
            .cut_capacity(min_instances_per_bin)
            .saturating_sub(range.assigned_cuts);
        let extra = share.min(headroom).min(remaining_budget);
        range.assigned_cuts += extra;
        remaining_budget -= extra;
        remaining_mass -= range.splittable_count as u128;
    }

    // Capacity caps can strand budget in the proportional pass. Hand the
    // leftovers out one at a time, heaviest unsplittable neighbors first,
    // until either the budget or all headroom is gone.
    while remaining_budget > 0 {
        let mut granted = false;
        for &idx in &by_unsplittable {
            if remaining_budget == 0 {
                break;
            }
            let range = &mut ranges[idx];
            if range.assigned_cuts < range.cut_capacity(min_instances_per_bin) {
                range.assigned_cuts += 1;
                remaining_budget -= 1;
                granted = true;
            }
        }
        if !granted {
            break;
        }
    }

    debug_assert!(ranges.iter().map(|r| r.assigned_cuts).sum::<usize>() <= budget);
}

// ============================================================================
// Tests
// ============================================================================
