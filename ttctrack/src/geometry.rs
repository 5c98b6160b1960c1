//! Flat-ground back-projection of image rows to metric distance

use crate::error::{Result, TrackingError};
use serde::{Deserialize, Serialize};

/// Pinhole camera constants, calibrated elsewhere
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraGeometry {
    /// Focal length in pixels
    pub focal_length: f32,
    /// Camera height above the ground plane in meters
    pub camera_height: f32,
    /// Optical center (cx, cy) in pixels
    pub optical_center: (f32, f32),
}

impl Default for CameraGeometry {
    /// Generic 1280x720 dashcam: ~1100 px focal length, mounted at 1.6 m,
    /// horizon slightly below the image center
    fn default() -> Self {
        Self {
            focal_length: 1100.0,
            camera_height: 1.6,
            optical_center: (640.0, 410.0),
        }
    }
}

impl CameraGeometry {
    pub fn new(focal_length: f32, camera_height: f32, optical_center: (f32, f32)) -> Result<Self> {
        let geometry = Self {
            focal_length,
            camera_height,
            optical_center,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.focal_length.is_finite() || self.focal_length <= 0.0 {
            return Err(TrackingError::invalid_input(format!(
                "focal length must be finite and positive, got {}",
                self.focal_length
            )));
        }
        if !self.camera_height.is_finite() || self.camera_height <= 0.0 {
            return Err(TrackingError::invalid_input(format!(
                "camera height must be finite and positive, got {}",
                self.camera_height
            )));
        }
        let (cx, cy) = self.optical_center;
        if !cx.is_finite() || !cy.is_finite() {
            return Err(TrackingError::invalid_input(format!(
                "optical center must be finite, got ({}, {})",
                cx, cy
            )));
        }
        Ok(())
    }
}

/// Maps a detection's ground-contact row to a longitudinal distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryModel {
    camera: CameraGeometry,
    distance_sentinel: f32,
}

impl GeometryModel {
    pub fn new(camera: CameraGeometry, distance_sentinel: f32) -> Result<Self> {
        camera.validate()?;
        Ok(Self {
            camera,
            distance_sentinel,
        })
    }

    pub fn camera(&self) -> &CameraGeometry {
        &self.camera
    }

    pub fn distance_sentinel(&self) -> f32 {
        self.distance_sentinel
    }

    /// `Z = f * H / (y - cy)`.
    ///
    /// Rows at or above the horizon have no ground intersection in front of
    /// the camera and yield the distance sentinel.
    pub fn estimate_distance(&self, bottom_y: f32) -> f32 {
        let horizon = self.camera.optical_center.1;
        if !bottom_y.is_finite() || bottom_y <= horizon {
            return self.distance_sentinel;
        }
        let pixel_offset = bottom_y - horizon;
        (self.camera.focal_length * self.camera.camera_height) / pixel_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn model() -> GeometryModel {
        GeometryModel::new(CameraGeometry::new(1100.0, 1.6, (640.0, 360.0)).unwrap(), 999.0)
            .unwrap()
    }

    #[test]
    fn test_distance_formula() {
        let m = model();
        assert_abs_diff_eq!(m.estimate_distance(460.0), 17.6, epsilon = 1e-4);
        assert_abs_diff_eq!(m.estimate_distance(720.0), 1760.0 / 360.0, epsilon = 1e-4);
    }

    #[test]
    fn test_horizon_sentinel() {
        let m = model();
        assert_eq!(m.estimate_distance(360.0), 999.0);
        assert_eq!(m.estimate_distance(100.0), 999.0);
        assert_eq!(m.estimate_distance(f32::NAN), 999.0);
    }

    #[test]
    fn test_distance_strictly_decreasing_below_horizon() {
        let m = model();
        let mut previous = f32::INFINITY;
        for row in 361..720 {
            let d = m.estimate_distance(row as f32);
            assert!(d < previous, "row {} gave {} after {}", row, d, previous);
            previous = d;
        }
    }

    #[test]
    fn test_rejects_degenerate_camera() {
        assert!(CameraGeometry::new(0.0, 1.6, (640.0, 360.0)).is_err());
        assert!(CameraGeometry::new(1100.0, -1.0, (640.0, 360.0)).is_err());
        assert!(CameraGeometry::new(1100.0, 1.6, (f32::NAN, 360.0)).is_err());
        let bad = CameraGeometry {
            focal_length: f32::INFINITY,
            ..Default::default()
        };
        assert!(GeometryModel::new(bad, 999.0).is_err());
    }
}
