//! Frame records consumed from the detector and reports produced per frame

use serde::{Deserialize, Serialize};
use std::fmt;
use ttctrack::{BoundingBox, Detection, RiskLevel, TrackSnapshot};

/// Road users the detector is asked for, by COCO class id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleClass {
    Car,
    Motorcycle,
    Bus,
    Truck,
    Other(u32),
}

impl VehicleClass {
    /// COCO ids of car, motorcycle, bus, truck
    pub const DEFAULT_CLASS_IDS: [u32; 4] = [2, 3, 5, 7];

    pub fn from_class_id(id: u32) -> Self {
        match id {
            2 => Self::Car,
            3 => Self::Motorcycle,
            5 => Self::Bus,
            7 => Self::Truck,
            other => Self::Other(other),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::Car => "car".to_string(),
            Self::Motorcycle => "motorcycle".to_string(),
            Self::Bus => "bus".to_string(),
            Self::Truck => "truck".to_string(),
            Self::Other(id) => format!("class_{}", id),
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// One detection as written by the detector: `bbox` is `[x1, y1, x2, y2]` in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub bbox: [f32; 4],
    pub score: f32,
    pub class_id: u32,
}

impl From<&DetectionRecord> for Detection {
    fn from(record: &DetectionRecord) -> Self {
        let [x1, y1, x2, y2] = record.bbox;
        Detection::new(BoundingBox::new(x1, y1, x2, y2), record.score, record.class_id)
    }
}

/// All detections of one video frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub frame: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<f64>,
    #[serde(default)]
    pub detections: Vec<DetectionRecord>,
}

/// Tracking result for one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameReport {
    pub frame: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<f64>,
    /// Detections left after the pre-filter
    pub detections_kept: usize,
    /// Live tracks in id order
    pub tracks: Vec<TrackSnapshot>,
    pub cautions: usize,
    pub warnings: usize,
    /// Time spent in filtering and tracking, microseconds
    pub elapsed_us: u64,
}

impl FrameReport {
    /// Highest risk among the tracks of this frame
    pub fn max_risk(&self) -> RiskLevel {
        self.tracks
            .iter()
            .map(|t| t.risk)
            .max()
            .unwrap_or(RiskLevel::None)
    }

    /// Warning track with the smallest TTC
    pub fn most_urgent(&self) -> Option<&TrackSnapshot> {
        self.tracks
            .iter()
            .filter(|t| t.risk == RiskLevel::Warning)
            .min_by(|a, b| a.ttc.total_cmp(&b.ttc))
    }
}
