/// Combined Positive Score: the percentage of positive objects among positive plus nuclear
/// objects.
///
/// Returns `0.0` when both counts are zero rather than dividing by zero.
///
/// # Examples
///
/// ```
/// use cps_analyzer::score::combined_positive_score;
///
/// assert_eq!(combined_positive_score(1, 3), 25.0);
/// assert_eq!(combined_positive_score(0, 0), 0.0);
/// ```
pub fn combined_positive_score(positive: usize, nuclei: usize) -> f64 {
    let total = positive + nuclei;
    if total == 0 {
        return 0.0;
    }
    100.0 * positive as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_float_eq(a: f64, b: f64) {
        assert!(
            (a - b).abs() < 1e-6,
            "Assertion failed: expected {}, got {}",
            b,
            a
        );
    }

    #[test]
    fn zero_total_is_zero() {
        assert_eq!(combined_positive_score(0, 0), 0.0);
    }

    #[test]
    fn only_positive_is_hundred() {
        for p in [1, 2, 17, 10_000] {
            assert_float_eq(combined_positive_score(p, 0), 100.0);
        }
    }

    #[test]
    fn only_nuclei_is_zero() {
        for n in [1, 5, 999] {
            assert_float_eq(combined_positive_score(0, n), 0.0);
        }
    }

    #[test]
    fn ratio() {
        assert_float_eq(combined_positive_score(1, 1), 50.0);
        assert_float_eq(combined_positive_score(1, 2), 100.0 / 3.0);
        assert_float_eq(combined_positive_score(7, 13), 35.0);
        assert_float_eq(combined_positive_score(123, 456), 100.0 * 123.0 / 579.0);
    }

    #[test]
    fn stays_within_percentage_bounds() {
        for p in 0..20 {
            for n in 0..20 {
                let cps = combined_positive_score(p, n);
                assert!((0.0..=100.0).contains(&cps));
            }
        }
    }
}
