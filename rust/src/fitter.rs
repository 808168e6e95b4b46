//! Method-of-moments fit of a three-point estimate to Beta shape parameters.

use crate::activity::Activity;

/// Shape returned for degenerate ranges and non-positive numerators.
pub const FALLBACK_SHAPE: (f64, f64) = (2.0, 2.0);

/// Lower bound applied to both shape parameters.
pub const MIN_SHAPE: f64 = 0.5;

const EPS: f64 = 1e-6;

/// Beta shape parameters for one activity, bounded to `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedDistribution {
    pub alpha: f64,
    pub beta: f64,
    pub lower: f64,
    pub upper: f64,
}

impl FittedDistribution {
    pub fn fit(activity: &Activity) -> Self {
        let (alpha, beta) = alpha_beta_from_pert(activity.a, activity.m, activity.b);
        Self {
            alpha,
            beta,
            lower: activity.a,
            upper: activity.b,
        }
    }

    /// Maps a unit-interval draw onto `[lower, upper]`.
    #[inline]
    pub fn rescale(&self, unit: f64) -> f64 {
        self.lower + unit * (self.upper - self.lower)
    }
}

/// Converts PERT `(a, m, b)` to `(alpha, beta)`.
///
/// Targets mean `(a + 4m + b) / 6` and variance `((b - a) / 6)^2`. Never fails:
/// a range narrower than the variance epsilon, or a non-positive numerator,
/// yields [`FALLBACK_SHAPE`], and both outputs are floored at [`MIN_SHAPE`].
pub fn alpha_beta_from_pert(a: f64, m: f64, b: f64) -> (f64, f64) {
    let mean = (a + 4.0 * m + b) / 6.0;
    let variance = (b - a).powi(2) / 36.0;
    if variance <= EPS {
        return FALLBACK_SHAPE;
    }

    let numerator = (mean - a) * (2.0 * mean - a - b);
    if numerator <= 0.0 {
        return FALLBACK_SHAPE;
    }

    let alpha = numerator / variance;
    let beta = alpha * (b - mean) / (mean - a).max(EPS);
    (alpha.max(MIN_SHAPE), beta.max(MIN_SHAPE))
}

/// Fits every activity, preserving order.
pub fn fit_all(activities: &[Activity]) -> Vec<FittedDistribution> {
    activities.iter().map(FittedDistribution::fit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn degenerate_range_falls_back() {
        assert_eq!(alpha_beta_from_pert(5.0, 5.0, 5.0), (2.0, 2.0));
        assert_eq!(alpha_beta_from_pert(5.0, 5.0, 5.0005), (2.0, 2.0));
    }

    #[test]
    fn symmetric_estimate_has_zero_numerator() {
        assert_eq!(alpha_beta_from_pert(0.0, 5.0, 10.0), FALLBACK_SHAPE);
    }

    #[test]
    fn right_skewed_estimate_falls_back() {
        // mean 10.5 sits below the midpoint 11.5, so the numerator is negative
        assert_eq!(alpha_beta_from_pert(8.0, 10.0, 15.0), FALLBACK_SHAPE);
    }

    #[test]
    fn left_skewed_estimate() {
        let (alpha, beta) = alpha_beta_from_pert(0.0, 8.0, 10.0);
        // mean 7, variance 100/36, numerator 28
        let expected_alpha = 28.0 / (100.0 / 36.0);
        assert!((alpha - expected_alpha).abs() < 1e-9);
        assert!((beta - expected_alpha * 3.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn fitted_distribution_rescales_to_range() {
        let fitted = FittedDistribution::fit(&Activity::new(10.0, 14.0, 25.0, 0.0));
        assert_eq!(fitted.rescale(0.0), 10.0);
        assert_eq!(fitted.rescale(1.0), 25.0);
        assert!((fitted.rescale(0.5) - 17.5).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn shapes_never_below_floor(
            a in -1.0e4f64..1.0e4,
            left in 1.0e-3f64..1.0e3,
            right in 1.0e-3f64..1.0e3,
        ) {
            let m = a + left;
            let b = m + right;
            let (alpha, beta) = alpha_beta_from_pert(a, m, b);
            prop_assert!(alpha >= MIN_SHAPE, "alpha {} for ({}, {}, {})", alpha, a, m, b);
            prop_assert!(beta >= MIN_SHAPE, "beta {} for ({}, {}, {})", beta, a, m, b);
            prop_assert!(alpha.is_finite() && beta.is_finite());
        }

        #[test]
        fn equal_bounds_always_symmetric(a in -1.0e6f64..1.0e6) {
            prop_assert_eq!(alpha_beta_from_pert(a, a, a), (2.0, 2.0));
        }
    }
}
