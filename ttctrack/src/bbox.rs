//! Detection boxes, bottom-center anchors and input validation

use crate::error::{Result, TrackingError};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned box in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// Image-plane point in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean pixel distance
    pub fn distance(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Ground-contact proxy: horizontal midpoint of the bottom edge
    pub fn bottom_center(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2.0, self.y2)
    }

    /// Bottom edge image row
    pub fn bottom_y(&self) -> f32 {
        self.y2
    }

    pub fn to_bounds(&self) -> [f32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Check the box contract: finite, non-negative, `x1 < x2`, `y1 < y2`
    pub fn validate(&self) -> Result<()> {
        let bounds = self.to_bounds();
        if bounds.iter().any(|v| !v.is_finite()) {
            return Err(TrackingError::invalid_input(format!(
                "non-finite box coordinates {}",
                self
            )));
        }
        if bounds.iter().any(|v| *v < 0.0) {
            return Err(TrackingError::invalid_input(format!(
                "negative box coordinates {}",
                self
            )));
        }
        if self.x1 >= self.x2 || self.y1 >= self.y2 {
            return Err(TrackingError::invalid_input(format!("inverted box {}", self)));
        }
        Ok(())
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Box({}, {}, {}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

/// One detected object in one frame, as handed over by the detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub score: f32,
    pub class_id: u32,
}

impl Detection {
    pub fn new(bbox: BoundingBox, score: f32, class_id: u32) -> Self {
        Self {
            bbox,
            score,
            class_id,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bbox.validate()?;
        if !(0.0..=1.0).contains(&self.score) {
            return Err(TrackingError::invalid_input(format!(
                "score {} outside [0, 1]",
                self.score
            )));
        }
        Ok(())
    }
}

/// Convert detector rows `[x1, y1, x2, y2, score, class_id]` into detections.
///
/// Every row is validated; the first bad row fails the whole batch.
pub fn detections_from_rows(rows: ArrayView2<f32>) -> Result<Vec<Detection>> {
    if rows.nrows() > 0 && rows.ncols() != 6 {
        return Err(TrackingError::invalid_input(format!(
            "expected 6 columns [x1, y1, x2, y2, score, class_id], got {}",
            rows.ncols()
        )));
    }

    rows.outer_iter()
        .enumerate()
        .map(|(i, row)| {
            let class = row[5];
            let in_range = class >= 0.0 && f64::from(class) <= f64::from(u32::MAX);
            if !class.is_finite() || !in_range || class.fract() != 0.0 {
                return Err(TrackingError::invalid_input(format!(
                    "row {}: class id {} is not an integer in the u32 range",
                    i, class
                )));
            }
            let det = Detection::new(
                BoundingBox::new(row[0], row[1], row[2], row[3]),
                row[4],
                class as u32,
            );
            det.validate()
                .map_err(|e| TrackingError::invalid_input(format!("row {}: {}", i, e)))?;
            Ok(det)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_bottom_center() {
        let bbox = BoundingBox::new(100.0, 200.0, 140.0, 260.0);
        let anchor = bbox.bottom_center();
        assert_eq!(anchor, Point::new(120.0, 260.0));
        assert_eq!(bbox.bottom_y(), 260.0);
        assert_eq!(bbox.width(), 40.0);
        assert_eq!(bbox.height(), 60.0);
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_abs_diff_eq!(a.distance(&b), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_box_validation() {
        assert!(BoundingBox::new(0.0, 0.0, 10.0, 10.0).validate().is_ok());
        assert!(BoundingBox::new(10.0, 0.0, 5.0, 10.0).validate().is_err());
        assert!(BoundingBox::new(0.0, 10.0, 10.0, 10.0).validate().is_err());
        assert!(BoundingBox::new(-1.0, 0.0, 10.0, 10.0).validate().is_err());
        assert!(BoundingBox::new(0.0, 0.0, f32::NAN, 10.0).validate().is_err());
        assert!(BoundingBox::new(0.0, 0.0, f32::INFINITY, 10.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_detection_score_range() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(Detection::new(bbox, 0.0, 2).validate().is_ok());
        assert!(Detection::new(bbox, 1.0, 2).validate().is_ok());
        assert!(Detection::new(bbox, 1.5, 2).validate().is_err());
        assert!(Detection::new(bbox, f32::NAN, 2).validate().is_err());
    }

    #[test]
    fn test_detections_from_rows() {
        let rows = array![
            [10.0, 10.0, 50.0, 80.0, 0.9, 2.0],
            [60.0, 60.0, 100.0, 100.0, 0.6, 7.0],
        ];
        let dets = detections_from_rows(rows.view()).unwrap();
        assert_eq!(dets.len(), 2);
        assert_eq!(dets[0].class_id, 2);
        assert_eq!(dets[1].bbox, BoundingBox::new(60.0, 60.0, 100.0, 100.0));
    }

    #[test]
    fn test_detections_from_rows_rejects_bad_shape() {
        let rows = array![[10.0, 10.0, 50.0, 80.0, 0.9]];
        assert!(matches!(
            detections_from_rows(rows.view()),
            Err(TrackingError::InvalidInput(_))
        ));

        let rows = array![[10.0, 10.0, 50.0, 80.0, 0.9, 2.5]];
        assert!(detections_from_rows(rows.view()).is_err());
    }

    #[test]
    fn test_detections_from_rows_rejects_class_past_u32() {
        // 2^32 is the nearest f32 to u32::MAX and must not saturate
        let rows = array![[10.0, 10.0, 50.0, 80.0, 0.9, 4_294_967_296.0]];
        assert!(matches!(
            detections_from_rows(rows.view()),
            Err(TrackingError::InvalidInput(_))
        ));

        let rows = array![[10.0, 10.0, 50.0, 80.0, 0.9, 4_294_967_040.0]];
        let dets = detections_from_rows(rows.view()).unwrap();
        assert_eq!(dets[0].class_id, 4_294_967_040);
    }

    #[test]
    fn test_detections_from_empty_rows() {
        let rows = ndarray::Array2::<f32>::zeros((0, 5));
        assert!(detections_from_rows(rows.view()).unwrap().is_empty());
    }
}
