//! Detection pre-filter applied before tracking

use crate::types::VehicleClass;
use serde::{Deserialize, Serialize};
use ttctrack::Detection;

/// Which detections are handed to the tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionFilterConfig {
    /// Minimum detector confidence
    pub min_confidence: f32,
    /// Allowed class ids; empty keeps every class
    pub classes: Vec<u32>,
}

impl Default for DetectionFilterConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            classes: VehicleClass::DEFAULT_CLASS_IDS.to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DetectionFilter {
    config: DetectionFilterConfig,
}

impl DetectionFilter {
    pub fn new(config: DetectionFilterConfig) -> Self {
        Self { config }
    }

    pub fn accepts(&self, detection: &Detection) -> bool {
        // NaN scores are not filtered here; the tracker rejects them
        if detection.score < self.config.min_confidence {
            return false;
        }
        self.config.classes.is_empty() || self.config.classes.contains(&detection.class_id)
    }

    pub fn apply(&self, detections: Vec<Detection>) -> Vec<Detection> {
        detections.into_iter().filter(|d| self.accepts(d)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttctrack::BoundingBox;

    fn det(score: f32, class_id: u32) -> Detection {
        Detection::new(BoundingBox::new(0.0, 0.0, 10.0, 10.0), score, class_id)
    }

    #[test]
    fn test_default_keeps_confident_vehicles() {
        let filter = DetectionFilter::new(DetectionFilterConfig::default());
        assert!(filter.accepts(&det(0.9, 2)));
        assert!(filter.accepts(&det(0.5, 7)));
        assert!(!filter.accepts(&det(0.49, 2)));
        // person
        assert!(!filter.accepts(&det(0.9, 0)));
    }

    #[test]
    fn test_empty_class_list_keeps_all() {
        let filter = DetectionFilter::new(DetectionFilterConfig {
            min_confidence: 0.3,
            classes: Vec::new(),
        });
        let kept = filter.apply(vec![det(0.9, 0), det(0.2, 2), det(0.4, 15)]);
        assert_eq!(kept.len(), 2);
    }
}
