//! Construction-time tracker configuration

use crate::error::{Result, TrackingError};
use crate::kalman::FilterParams;
use crate::risk::RiskPolicy;
use serde::{Deserialize, Serialize};

/// Configuration for longitudinal tracking
///
/// All values are fixed when the `TrackManager` is built; there is no reload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Frame rate of the detection stream; the filter time step is `1 / fps`
    pub fps: f32,
    /// Maximum bottom-center distance (pixels) for a track to claim a detection
    pub gate_distance: f32,
    /// Consecutive unmatched frames tolerated before a track is dropped
    pub max_missed: u32,
    /// Process noise variances for [distance, velocity]
    pub process_noise: [f32; 2],
    /// Measurement noise variance of the geometric distance estimate
    pub measurement_noise: f32,
    /// Scale of the identity error covariance a new filter starts with
    pub initial_covariance: f32,
    /// Distance (meters) below which a track is flagged as caution
    pub distance_threshold: f32,
    /// Time-to-collision (seconds) below which a track is flagged as warning
    pub ttc_threshold: f32,
    /// Closing speed (m/s) that must be exceeded before TTC is computed
    pub velocity_deadband: f32,
    /// TTC reported when the object is not closing
    pub ttc_sentinel: f32,
    /// Distance reported for footprints at or above the horizon row
    pub distance_sentinel: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            gate_distance: 50.0,
            max_missed: 5,
            process_noise: [1e-2, 1e-1],
            measurement_noise: 1.0,
            initial_covariance: 1.0,
            distance_threshold: 15.0,
            ttc_threshold: 2.5,
            velocity_deadband: 0.1,
            ttc_sentinel: 99.9,
            distance_sentinel: 999.0,
        }
    }
}

impl TrackerConfig {
    /// Reject non-finite or non-positive constants
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("fps", self.fps),
            ("gate_distance", self.gate_distance),
            ("process_noise[0]", self.process_noise[0]),
            ("process_noise[1]", self.process_noise[1]),
            ("measurement_noise", self.measurement_noise),
            ("initial_covariance", self.initial_covariance),
            ("distance_threshold", self.distance_threshold),
            ("ttc_threshold", self.ttc_threshold),
            ("ttc_sentinel", self.ttc_sentinel),
            ("distance_sentinel", self.distance_sentinel),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(TrackingError::invalid_input(format!(
                    "{} must be finite and positive, got {}",
                    name, value
                )));
            }
        }
        if !self.velocity_deadband.is_finite() || self.velocity_deadband < 0.0 {
            return Err(TrackingError::invalid_input(format!(
                "velocity_deadband must be finite and non-negative, got {}",
                self.velocity_deadband
            )));
        }
        Ok(())
    }

    /// Time step between frames in seconds
    pub fn dt(&self) -> f32 {
        1.0 / self.fps
    }

    pub fn filter_params(&self) -> FilterParams {
        FilterParams {
            dt: self.dt(),
            process_noise: self.process_noise,
            measurement_noise: self.measurement_noise,
            initial_covariance: self.initial_covariance,
        }
    }

    pub fn risk_policy(&self) -> RiskPolicy {
        RiskPolicy {
            distance_threshold: self.distance_threshold,
            ttc_threshold: self.ttc_threshold,
            velocity_deadband: self.velocity_deadband,
            ttc_sentinel: self.ttc_sentinel,
        }
    }
}
