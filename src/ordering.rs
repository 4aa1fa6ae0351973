//! Fair randomized ordering of splitting ranges.
//!
//! Quota assignment walks the ranges in priority order, but many ranges share
//! the same priority key. Visiting equal-key ranges in table order would give
//! one end of the feature's distribution a systematic advantage, so ties are
//! shuffled with the seeded index source instead. To keep the result
//! reproducible, the pre-shuffle order must itself be deterministic: the sort
//! is keyed on `(primary key, original index)`, which is a total order, and
//! only the equal-primary-key blocks are then shuffled in place.

use std::cmp::Reverse;

use crate::random::IndexSource;
use crate::segment::SplittingRange;

/// Indexes of `ranges` ordered ascending by splittable item count, ties
/// shuffled.
pub(crate) fn order_by_splittable_ascending(
    ranges: &[SplittingRange],
    rng: &mut dyn IndexSource,
) -> Vec<usize> {
    fair_order(ranges, rng, |r| r.splittable_count)
}

/// Indexes of `ranges` ordered descending by the neighboring unsplittable run
/// lengths (largest side first, then smallest side), ties shuffled.
pub(crate) fn order_by_unsplittable_descending(
    ranges: &[SplittingRange],
    rng: &mut dyn IndexSource,
) -> Vec<usize> {
    fair_order(ranges, rng, |r| {
        Reverse((
            r.unsplittable_either_side_max,
            r.unsplittable_either_side_min,
        ))
    })
}

fn fair_order<K: Ord + Copy>(
    ranges: &[SplittingRange],
    rng: &mut dyn IndexSource,
    key: impl Fn(&SplittingRange) -> K,
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..ranges.len()).collect();
    // The secondary index key makes the pre-shuffle order a total order, so
    // an unstable sort is already deterministic.
    order.sort_unstable_by_key(|&i| (key(&ranges[i]), i));
    shuffle_equal_key_blocks(&mut order, rng, |&i| key(&ranges[i]));
    order
}

/// Shuffle every maximal block of adjacent entries that share a key.
fn shuffle_equal_key_blocks<T, K: PartialEq>(
    items: &mut [T],
    rng: &mut dyn IndexSource,
    key: impl Fn(&T) -> K,
) {
    let mut block_start = 0;
    for i in 1..items.len() {
        if key(&items[i]) != key(&items[block_start]) {
            shuffle_block(&mut items[block_start..i], rng);
            block_start = i;
        }
    }
    if !items.is_empty() {
        shuffle_block(&mut items[block_start..], rng);
    }
}

/// Forward Fisher-Yates: position i takes a uniform draw from the remaining
/// suffix. A length-1 block draws nothing, so fully distinct keys consume no
/// randomness.
fn shuffle_block<T>(block: &mut [T], rng: &mut dyn IndexSource) {
    let mut i = 0;
    let mut remaining = block.len();
    while remaining > 1 {
        let j = rng.next_index(remaining);
        block.swap(i, i + j);
        i += 1;
        remaining -= 1;
    }
}

// ============================================================================
// Tests
// ============================================================================
