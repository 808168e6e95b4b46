//! Project activities and their three-point duration estimates.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// One project activity: optimistic `a`, most-likely `m`, pessimistic `b`
/// durations and a cost per unit of duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub a: f64,
    pub m: f64,
    pub b: f64,
    pub cost_rate: f64,
}

impl Activity {
    pub const fn new(a: f64, m: f64, b: f64, cost_rate: f64) -> Self {
        Self { a, m, b, cost_rate }
    }

    /// PERT expected duration `(a + 4m + b) / 6`.
    pub fn pert_mean(&self) -> f64 {
        (self.a + 4.0 * self.m + self.b) / 6.0
    }

    /// PERT standard deviation `(b - a) / 6`.
    pub fn pert_std_dev(&self) -> f64 {
        (self.b - self.a) / 6.0
    }

    /// Checks `a <= m <= b`, finiteness and a non-negative cost rate.
    /// `index` is only used to label the error.
    pub fn validate(&self, index: usize) -> Result<()> {
        let invalid = |reason: String| SimulationError::InvalidActivity { index, reason };

        if ![self.a, self.m, self.b, self.cost_rate]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(invalid(format!("non-finite value in {:?}", self)));
        }
        if self.a > self.m || self.m > self.b {
            return Err(invalid(format!(
                "estimates must satisfy a <= m <= b, got ({}, {}, {})",
                self.a, self.m, self.b
            )));
        }
        if self.cost_rate < 0.0 {
            return Err(invalid(format!("negative cost rate {}", self.cost_rate)));
        }
        Ok(())
    }
}

/// The three-activity reference project: A and B in parallel, then C.
pub fn reference_project() -> Vec<Activity> {
    vec![
        Activity::new(8.0, 10.0, 15.0, 1000.0),
        Activity::new(5.0, 7.0, 12.0, 5000.0),
        Activity::new(10.0, 14.0, 25.0, 1500.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pert_figures() {
        let act = Activity::new(8.0, 10.0, 15.0, 1000.0);
        assert!((act.pert_mean() - 63.0 / 6.0).abs() < 1e-12);
        assert!((act.pert_std_dev() - 7.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn reference_project_is_valid() {
        for (i, act) in reference_project().iter().enumerate() {
            act.validate(i).unwrap();
        }
    }

    #[test]
    fn rejects_unordered_estimates() {
        let err = Activity::new(10.0, 8.0, 15.0, 1.0).validate(3).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidActivity { index: 3, .. }));
    }

    #[test]
    fn rejects_nan_and_negative_cost() {
        assert!(Activity::new(f64::NAN, 1.0, 2.0, 1.0).validate(0).is_err());
        assert!(Activity::new(1.0, 1.0, 2.0, -5.0).validate(0).is_err());
    }

    #[test]
    fn degenerate_range_is_valid() {
        Activity::new(4.0, 4.0, 4.0, 0.0).validate(0).unwrap();
    }
}
