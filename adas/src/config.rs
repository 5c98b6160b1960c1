//! Driver configuration loaded from JSON

use crate::error::{AdasError, Result};
use crate::filter::DetectionFilterConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use ttctrack::{CameraGeometry, TopDownConfig, TrackerConfig};

/// Everything needed to build a `FramePipeline`
///
/// Missing sections fall back to the dashcam defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdasConfig {
    pub camera: CameraGeometry,
    pub tracker: TrackerConfig,
    pub detection_filter: DetectionFilterConfig,
    pub topdown: TopDownConfig,
}

impl AdasConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            AdasError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.camera.validate()?;
        self.tracker.validate()?;
        self.topdown.validate()?;
        let min = self.detection_filter.min_confidence;
        if !(0.0..=1.0).contains(&min) {
            return Err(AdasError::config(format!(
                "detection_filter.min_confidence must be in [0, 1], got {}",
                min
            )));
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
