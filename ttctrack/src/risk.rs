//! Time-to-collision and risk classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Collision risk of a tracked object, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    None,
    Caution,
    Warning,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskLevel::None => "none",
            RiskLevel::Caution => "caution",
            RiskLevel::Warning => "warning",
        };
        f.write_str(name)
    }
}

/// Thresholds turning a filtered `(distance, velocity)` into TTC and risk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskPolicy {
    pub distance_threshold: f32,
    pub ttc_threshold: f32,
    pub velocity_deadband: f32,
    pub ttc_sentinel: f32,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            distance_threshold: 15.0,
            ttc_threshold: 2.5,
            velocity_deadband: 0.1,
            ttc_sentinel: 99.9,
        }
    }
}

impl RiskPolicy {
    /// Seconds until the distance reaches zero at the current closing rate.
    ///
    /// Only defined while closing faster than the deadband; otherwise the
    /// sentinel is returned.
    pub fn time_to_collision(&self, distance: f32, velocity: f32) -> f32 {
        if velocity < -self.velocity_deadband {
            distance / velocity.abs()
        } else {
            self.ttc_sentinel
        }
    }

    /// Warning dominates caution regardless of distance
    pub fn classify(&self, distance: f32, ttc: f32) -> RiskLevel {
        if ttc < self.ttc_threshold {
            RiskLevel::Warning
        } else if distance < self.distance_threshold {
            RiskLevel::Caution
        } else {
            RiskLevel::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_ttc_only_when_closing() {
        let policy = RiskPolicy::default();
        assert_abs_diff_eq!(policy.time_to_collision(20.0, -10.0), 2.0, epsilon = 1e-6);
        assert_eq!(policy.time_to_collision(20.0, 0.0), 99.9);
        assert_eq!(policy.time_to_collision(20.0, 5.0), 99.9);
        // Inside the deadband
        assert_eq!(policy.time_to_collision(20.0, -0.1), 99.9);
        assert_eq!(policy.time_to_collision(20.0, -0.05), 99.9);
        assert!(policy.time_to_collision(20.0, -0.11) < 99.9 * 2.0);
    }

    #[test]
    fn test_ttc_sign_discipline() {
        let policy = RiskPolicy::default();
        for v in [-30.0, -5.0, -0.2, -0.1, 0.0, 0.1, 3.0] {
            let ttc = policy.time_to_collision(12.0, v);
            if v < -policy.velocity_deadband {
                assert!(ttc.is_finite() && ttc > 0.0);
                assert_abs_diff_eq!(ttc, 12.0 / -v, epsilon = 1e-4);
            } else {
                assert_eq!(ttc, policy.ttc_sentinel);
            }
        }
    }

    #[test]
    fn test_classification() {
        let policy = RiskPolicy::default();
        assert_eq!(policy.classify(17.6, 99.9), RiskLevel::None);
        assert_eq!(policy.classify(14.9, 99.9), RiskLevel::Caution);
        assert_eq!(policy.classify(15.0, 99.9), RiskLevel::None);
        assert_eq!(policy.classify(40.0, 2.0), RiskLevel::Warning);
        assert_eq!(policy.classify(5.0, 1.0), RiskLevel::Warning);
        assert_eq!(policy.classify(5.0, 2.5), RiskLevel::Caution);
    }

    #[test]
    fn test_levels_are_ordered() {
        assert!(RiskLevel::None < RiskLevel::Caution);
        assert!(RiskLevel::Caution < RiskLevel::Warning);
        assert_eq!(RiskLevel::Warning.to_string(), "warning");
    }
}
