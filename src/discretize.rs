//! Mapping raw values to bin indices.

/// Map each value to its bin index given ascending cut points.
///
/// Each cut is the inclusive lower bound of the bin above it, so the bin
/// index of a value is the number of cut points at or below it. When
/// `had_missing` is true, bin 0 is reserved for NaN and every other index
/// shifts up by one; otherwise NaN maps to the sentinel `-1`.
///
/// `cut_points` must be strictly increasing; this is checked by assertion in
/// debug builds only.
pub fn discretize(had_missing: bool, cut_points: &[f64], values: &[f64]) -> Vec<i64> {
    debug_assert!(
        cut_points.windows(2).all(|w| w[0] < w[1]),
        "cut points must be strictly increasing"
    );

    let missing_bin: i64 = if had_missing { 0 } else { -1 };
    let shift: i64 = i64::from(had_missing);

    values
        .iter()
        .map(|&value| {
            if value.is_nan() {
                missing_bin
            } else {
                lower_bound_bin(cut_points, value) as i64 + shift
            }
        })
        .collect()
}

/// Number of cut points at or below `value`.
///
/// Half-open binary search: the invariant is that every cut below `lo` is
/// `<= value` and every cut at or past `hi` is `> value`, so the loop
/// terminates with a single well-defined index even when `value` equals a
/// cut point exactly.
#[inline]
fn lower_bound_bin(cut_points: &[f64], value: f64) -> usize {
    let mut lo = 0usize;
    let mut hi = cut_points.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if cut_points[mid] <= value {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_cuts_no_missing() {
        let bins = discretize(false, &[], &[1.0, 2.0, f64::NAN]);
        assert_eq!(bins, vec![0, 0, -1]);
    }

    #[test]
    fn test_no_cuts_with_missing() {
        let bins = discretize(true, &[], &[1.0, f64::NAN, 2.0]);
        assert_eq!(bins, vec![1, 0, 1]);
    }

    #[test]
    fn test_basic_binning() {
        let cuts = [10.0, 20.0, 30.0];
        let values = [5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 35.0];
        let bins = discretize(false, &cuts, &values);
        // Cuts are inclusive lower bounds: 10.0 lands in bin 1.
        assert_eq!(bins, vec![0, 1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn test_missing_shifts_indices() {
        let cuts = [10.0, 20.0];
        let values = [5.0, f64::NAN, 15.0, 25.0];
        let bins = discretize(true, &cuts, &values);
        assert_eq!(bins, vec![1, 0, 2, 3]);
    }

    #[test]
    fn test_value_below_all_cuts() {
        let cuts = [0.0];
        assert_eq!(discretize(false, &cuts, &[-1e300]), vec![0]);
    }

    #[test]
    fn test_value_above_all_cuts() {
        let cuts = [0.0];
        assert_eq!(discretize(false, &cuts, &[1e300]), vec![1]);
    }

    #[test]
    fn test_boundary_exactly_on_cut() {
        // A value equal to a cut always goes to the bin above.
        let cuts = [1.0, 2.0, 3.0, 4.0, 5.0];
        for (i, &cut) in cuts.iter().enumerate() {
            let bins = discretize(false, &cuts, &[cut]);
            assert_eq!(bins[0], (i + 1) as i64, "cut {} mapped wrongly", cut);
        }
    }

    #[test]
    fn test_empty_values() {
        assert!(discretize(false, &[1.0], &[]).is_empty());
    }
}
