//! Bird's-eye (inverse perspective) projection for visualization
//!
//! The source trapezoid is derived from constant ratios of the frame size, so
//! the homography only changes when the frame size does. Nothing here feeds
//! back into distance estimation.

use crate::bbox::Point;
use crate::error::{Result, TrackingError};
use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use nalgebra::{Matrix3, SMatrix, SVector};
use serde::{Deserialize, Serialize};

/// Trapezoid ratios and output size of the top-down view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopDownConfig {
    pub output_width: u32,
    pub output_height: u32,
    /// Row of the trapezoid's top edge, as a fraction of frame height
    pub top_ratio: f32,
    /// Row of the trapezoid's bottom edge, as a fraction of frame height
    pub bottom_ratio: f32,
    /// Columns of the top edge corners, as fractions of frame width
    pub top_left_ratio: f32,
    pub top_right_ratio: f32,
}

impl Default for TopDownConfig {
    fn default() -> Self {
        Self {
            output_width: 400,
            output_height: 400,
            top_ratio: 0.55,
            bottom_ratio: 0.95,
            top_left_ratio: 0.45,
            top_right_ratio: 0.55,
        }
    }
}

impl TopDownConfig {
    pub fn validate(&self) -> Result<()> {
        if self.output_width == 0 || self.output_height == 0 {
            return Err(TrackingError::invalid_input(format!(
                "top-down output size must be non-zero, got {}x{}",
                self.output_width, self.output_height
            )));
        }
        let rows_ok = 0.0 <= self.top_ratio
            && self.top_ratio < self.bottom_ratio
            && self.bottom_ratio <= 1.0;
        let cols_ok = 0.0 <= self.top_left_ratio
            && self.top_left_ratio < self.top_right_ratio
            && self.top_right_ratio <= 1.0;
        if !rows_ok || !cols_ok {
            return Err(TrackingError::invalid_input(
                "top-down trapezoid ratios must be ordered within [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Warps camera frames into a fixed-size top-down rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopDownProjector {
    config: TopDownConfig,
}

impl TopDownProjector {
    pub fn new(config: TopDownConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TopDownConfig {
        &self.config
    }

    /// Trapezoid corners in the frame: top-left, top-right, bottom-right, bottom-left
    pub fn source_points(&self, width: u32, height: u32) -> [(f32, f32); 4] {
        let (w, h) = (width as f32, height as f32);
        let c = &self.config;
        [
            (w * c.top_left_ratio, h * c.top_ratio),
            (w * c.top_right_ratio, h * c.top_ratio),
            (w, h * c.bottom_ratio),
            (0.0, h * c.bottom_ratio),
        ]
    }

    /// Output rectangle corners in the same order as `source_points`
    pub fn destination_points(&self) -> [(f32, f32); 4] {
        let (w, h) = (
            self.config.output_width as f32,
            self.config.output_height as f32,
        );
        [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)]
    }

    /// Homography mapping frame pixels to top-down pixels
    pub fn homography(&self, width: u32, height: u32) -> Result<Matrix3<f32>> {
        if width == 0 || height == 0 {
            return Err(TrackingError::invalid_input(format!(
                "cannot project an empty {}x{} frame",
                width, height
            )));
        }
        solve_homography(
            &self.source_points(width, height),
            &self.destination_points(),
        )
        .ok_or_else(|| TrackingError::projection("degenerate source trapezoid"))
    }

    /// Warp a frame into the top-down rectangle; returns the view and the homography used
    pub fn project_topdown(&self, frame: &RgbImage) -> Result<(RgbImage, Matrix3<f32>)> {
        let homography = self.homography(frame.width(), frame.height())?;
        let projection = Projection::from_matrix(row_major(&homography))
            .ok_or_else(|| TrackingError::projection("homography is not invertible"))?;

        let mut topdown = RgbImage::new(self.config.output_width, self.config.output_height);
        warp_into(
            frame,
            &projection,
            Interpolation::Bilinear,
            Rgb([0, 0, 0]),
            &mut topdown,
        );
        log::debug!(
            "Projected {}x{} frame to {}x{} top-down view",
            frame.width(),
            frame.height(),
            topdown.width(),
            topdown.height()
        );
        Ok((topdown, homography))
    }
}

/// Map an image point through a homography; `None` when it lands at infinity
pub fn project_point(homography: &Matrix3<f32>, point: Point) -> Option<Point> {
    let p = homography * nalgebra::Vector3::new(point.x, point.y, 1.0);
    if p[2].abs() < f32::EPSILON {
        return None;
    }
    Some(Point::new(p[0] / p[2], p[1] / p[2]))
}

/// Direct linear solve for the 8 free homography coefficients (h33 = 1)
fn solve_homography(src: &[(f32, f32); 4], dst: &[(f32, f32); 4]) -> Option<Matrix3<f32>> {
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for (i, (&(x, y), &(u, v))) in src.iter().zip(dst.iter()).enumerate() {
        let (x, y, u, v) = (x as f64, y as f64, u as f64, v as f64);
        let r = 2 * i;
        a[(r, 0)] = x;
        a[(r, 1)] = y;
        a[(r, 2)] = 1.0;
        a[(r, 6)] = -u * x;
        a[(r, 7)] = -u * y;
        b[r] = u;

        a[(r + 1, 3)] = x;
        a[(r + 1, 4)] = y;
        a[(r + 1, 5)] = 1.0;
        a[(r + 1, 6)] = -v * x;
        a[(r + 1, 7)] = -v * y;
        b[r + 1] = v;
    }

    let h = a.lu().solve(&b)?;
    if h.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(Matrix3::new(
        h[0] as f32,
        h[1] as f32,
        h[2] as f32,
        h[3] as f32,
        h[4] as f32,
        h[5] as f32,
        h[6] as f32,
        h[7] as f32,
        1.0,
    ))
}

fn row_major(m: &Matrix3<f32>) -> [f32; 9] {
    [
        m[(0, 0)],
        m[(0, 1)],
        m[(0, 2)],
        m[(1, 0)],
        m[(1, 1)],
        m[(1, 2)],
        m[(2, 0)],
        m[(2, 1)],
        m[(2, 2)],
    ]
}
