//! Longitudinal Kalman filter for a single tracked object
//!
//! State is `[z, v]`: distance along the optical axis (meters) and relative
//! velocity (m/s, negative when the object is approaching). Only `z` is
//! measured.

use nalgebra::{Matrix2, RowVector2, Vector2};

/// Noise and timing parameters shared by every filter of a tracker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    /// Time step between updates in seconds
    pub dt: f32,
    /// Process noise variances for [z, v]
    pub process_noise: [f32; 2],
    /// Measurement noise variance for z
    pub measurement_noise: f32,
    /// Scale of the identity initial error covariance
    pub initial_covariance: f32,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            dt: 1.0 / 30.0,
            process_noise: [1e-2, 1e-1],
            measurement_noise: 1.0,
            initial_covariance: 1.0,
        }
    }
}

/// Constant-velocity filter over `[distance, velocity]`
#[derive(Debug, Clone, PartialEq)]
pub struct LongitudinalFilter {
    x: Vector2<f32>, // State vector
    p: Matrix2<f32>, // State covariance matrix
    f: Matrix2<f32>, // State transition matrix
    h: RowVector2<f32>, // Observation matrix
    q: Matrix2<f32>, // Process noise covariance
    r: f32,          // Observation noise variance
}

impl LongitudinalFilter {
    /// Seed the filter with a first distance measurement and zero velocity
    pub fn new(initial_distance: f32, params: &FilterParams) -> Self {
        Self {
            x: Vector2::new(initial_distance, 0.0),
            p: Matrix2::identity() * params.initial_covariance,
            // z' = z + v * dt, v' = v
            f: Matrix2::new(1.0, params.dt, 0.0, 1.0),
            h: RowVector2::new(1.0, 0.0),
            q: Matrix2::new(params.process_noise[0], 0.0, 0.0, params.process_noise[1]),
            r: params.measurement_noise,
        }
    }

    /// Propagate the state one time step
    pub fn predict(&mut self) {
        // x = F * x
        self.x = self.f * self.x;

        // P = F * P * F^T + Q
        self.p = self.f * self.p * self.f.transpose() + self.q;
    }

    /// Fold in a distance measurement
    pub fn correct(&mut self, measured_distance: f32) {
        // Residual: y = z - H * x
        let y = measured_distance - (self.h * self.x)[0];

        // Innovation variance: S = H * P * H^T + R, scalar since only z is observed
        let s = (self.h * self.p * self.h.transpose())[0] + self.r;

        // Kalman gain: K = P * H^T / S
        let k: Vector2<f32> = self.p * self.h.transpose() / s;

        self.x += k * y;

        // P = (I - K * H) * P
        self.p = (Matrix2::identity() - k * self.h) * self.p;
    }

    /// Predict then correct; returns `(distance, velocity)`
    pub fn update(&mut self, measured_distance: f32) -> (f32, f32) {
        self.predict();
        self.correct(measured_distance);
        self.state()
    }

    /// Current `(distance, velocity)` estimate
    pub fn state(&self) -> (f32, f32) {
        (self.x[0], self.x[1])
    }

    pub fn distance(&self) -> f32 {
        self.x[0]
    }

    pub fn velocity(&self) -> f32 {
        self.x[1]
    }

    pub fn covariance(&self) -> &Matrix2<f32> {
        &self.p
    }
}
