//! Cumulative weighted selection.
//!
//! The caller draws `r` uniformly from `[0, total)` (see [`total_weight`]) and
//! passes it in, which keeps the rule itself free of any random source.

/// Sum of the positive, finite weights.
pub fn total_weight(weights: &[f32]) -> f32 {
    weights
        .iter()
        .filter(|w| w.is_finite() && **w > 0.0)
        .sum()
}

/// Index of the first entry whose running sum reaches `draw`.
///
/// Entries with zero (or invalid) weight never match. Returns `None` when
/// nothing matches: an empty or all-zero list, or a draw at or past the
/// accumulated total because of rounding.
pub fn pick_weighted(weights: &[f32], draw: f32) -> Option<usize> {
    let mut cumulative = 0.0f32;
    for (i, &w) in weights.iter().enumerate() {
        if !w.is_finite() || w <= 0.0 {
            continue;
        }
        cumulative += w;
        if cumulative >= draw {
            return Some(i);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_by_cumulative_weight() {
        let weights = [1.0, 2.0, 1.0];
        assert_eq!(total_weight(&weights), 4.0);
        assert_eq!(pick_weighted(&weights, 0.0), Some(0));
        assert_eq!(pick_weighted(&weights, 1.0), Some(0));
        assert_eq!(pick_weighted(&weights, 1.5), Some(1));
        assert_eq!(pick_weighted(&weights, 3.0), Some(1));
        assert_eq!(pick_weighted(&weights, 3.99), Some(2));
    }

    #[test]
    fn test_zero_weights_are_skipped() {
        let weights = [0.0, 1.0, 0.0];
        assert_eq!(pick_weighted(&weights, 0.0), Some(1));
        assert_eq!(pick_weighted(&weights, 0.5), Some(1));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(pick_weighted(&[], 0.0), None);
        assert_eq!(pick_weighted(&[0.0, 0.0], 0.0), None);
        assert_eq!(pick_weighted(&[1.0, 1.0], 2.5), None);
        assert_eq!(total_weight(&[0.0, -1.0, f32::NAN]), 0.0);
    }
}
