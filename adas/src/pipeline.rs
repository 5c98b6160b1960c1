//! Frame pipeline: detection pre-filter followed by longitudinal tracking
//!
//! Per frame:
//! - Drop detections outside the confidence / class allow-list
//! - Run the `TrackManager` update
//! - Log tracks escalating to warning

use crate::config::AdasConfig;
use crate::error::Result;
use crate::filter::DetectionFilter;
use crate::types::{FrameRecord, FrameReport, VehicleClass};
use std::collections::HashMap;
use std::time::Instant;
use ttctrack::{Detection, RiskLevel, TrackManager};

/// Running totals over a session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineStats {
    pub frames_processed: u64,
    pub frames_skipped: u64,
    pub detections_in: u64,
    pub detections_kept: u64,
    pub peak_tracks: usize,
    /// Number of times a track entered the warning level
    pub warning_events: u64,
    total_elapsed_us: u64,
}

impl PipelineStats {
    pub fn mean_elapsed_us(&self) -> f64 {
        if self.frames_processed == 0 {
            0.0
        } else {
            self.total_elapsed_us as f64 / self.frames_processed as f64
        }
    }
}

pub struct FramePipeline {
    filter: DetectionFilter,
    tracker: TrackManager,
    /// Risk seen for each live track on its previous frame
    last_risk: HashMap<u32, RiskLevel>,
    stats: PipelineStats,
}

impl FramePipeline {
    pub fn new(config: &AdasConfig) -> Result<Self> {
        config.validate()?;
        let tracker = TrackManager::new(config.tracker.clone(), config.camera)?;
        Ok(Self {
            filter: DetectionFilter::new(config.detection_filter.clone()),
            tracker,
            last_risk: HashMap::new(),
            stats: PipelineStats::default(),
        })
    }

    /// Filter and track one frame.
    ///
    /// A frame the tracker rejects leaves the tracks untouched and is counted
    /// as skipped before the error is returned.
    pub fn process(&mut self, record: &FrameRecord) -> Result<FrameReport> {
        let start = Instant::now();

        let detections: Vec<Detection> = record.detections.iter().map(Detection::from).collect();
        let n_in = detections.len();
        let kept = self.filter.apply(detections);

        let table = match self.tracker.update(&kept, record.frame) {
            Ok(table) => table,
            Err(e) => {
                self.stats.frames_skipped += 1;
                return Err(e.into());
            }
        };

        let mut cautions = 0;
        let mut warnings = 0;
        for (id, snap) in &table {
            match snap.risk {
                RiskLevel::Caution => cautions += 1,
                RiskLevel::Warning => warnings += 1,
                RiskLevel::None => {}
            }
            let previous = self.last_risk.get(id).copied().unwrap_or(RiskLevel::None);
            if snap.risk == RiskLevel::Warning && previous != RiskLevel::Warning {
                self.stats.warning_events += 1;
                log::warn!(
                    "Frame {}: COLLISION WARNING track {} ({}) at {:.1}m, closing {:.1}m/s, TTC {:.2}s",
                    record.frame,
                    id,
                    VehicleClass::from_class_id(snap.class_id),
                    snap.distance,
                    -snap.velocity,
                    snap.ttc
                );
            }
        }
        self.last_risk = table.iter().map(|(id, s)| (*id, s.risk)).collect();

        let elapsed_us = start.elapsed().as_micros() as u64;
        self.stats.frames_processed += 1;
        self.stats.detections_in += n_in as u64;
        self.stats.detections_kept += kept.len() as u64;
        self.stats.peak_tracks = self.stats.peak_tracks.max(table.len());
        self.stats.total_elapsed_us += elapsed_us;

        log::debug!(
            "Frame {}: {}/{} detections kept, {} tracks ({} caution, {} warning) in {}us",
            record.frame,
            kept.len(),
            n_in,
            table.len(),
            cautions,
            warnings,
            elapsed_us
        );

        Ok(FrameReport {
            frame: record.frame,
            timestamp_ms: record.timestamp_ms,
            detections_kept: kept.len(),
            tracks: table.into_values().collect(),
            cautions,
            warnings,
            elapsed_us,
        })
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    pub fn tracker(&self) -> &TrackManager {
        &self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DetectionRecord;
    use approx::assert_abs_diff_eq;

    fn record(frame: u64, detections: Vec<DetectionRecord>) -> FrameRecord {
        FrameRecord {
            frame,
            timestamp_ms: Some(frame as f64 * 33.3),
            detections,
        }
    }

    fn car(bottom: f32) -> DetectionRecord {
        DetectionRecord {
            bbox: [600.0, bottom - 60.0, 680.0, bottom],
            score: 0.9,
            class_id: 2,
        }
    }

    #[test]
    fn test_filters_before_tracking() {
        let mut pipeline = FramePipeline::new(&AdasConfig::default()).unwrap();
        let person = DetectionRecord {
            bbox: [100.0, 400.0, 140.0, 500.0],
            score: 0.95,
            class_id: 0,
        };
        let report = pipeline.process(&record(0, vec![car(510.0), person])).unwrap();
        assert_eq!(report.detections_kept, 1);
        assert_eq!(report.tracks.len(), 1);
        // Default horizon row is 410: 1100 * 1.6 / 100
        assert_abs_diff_eq!(report.tracks[0].distance, 17.6, epsilon = 1e-3);
        assert_eq!(report.max_risk(), RiskLevel::None);
        assert_eq!(pipeline.stats().detections_in, 2);
        assert_eq!(pipeline.stats().detections_kept, 1);
    }

    #[test]
    fn test_invalid_frame_is_skipped() {
        let mut pipeline = FramePipeline::new(&AdasConfig::default()).unwrap();
        pipeline.process(&record(0, vec![car(510.0)])).unwrap();

        let inverted = DetectionRecord {
            bbox: [680.0, 450.0, 600.0, 510.0],
            score: 0.9,
            class_id: 2,
        };
        assert!(pipeline.process(&record(1, vec![inverted])).is_err());
        assert_eq!(pipeline.stats().frames_skipped, 1);
        assert_eq!(pipeline.stats().frames_processed, 1);
        assert_eq!(pipeline.tracker().track(0).unwrap().missed_count, 0);
    }

    #[test]
    fn test_warning_counted_once_per_escalation() {
        let mut pipeline = FramePipeline::new(&AdasConfig::default()).unwrap();
        // Closing at 1 m/frame from 40 m down to 6 m
        for frame in 0..35u64 {
            let distance = 40.0 - frame as f32;
            let bottom = 410.0 + 1760.0 / distance;
            pipeline.process(&record(frame, vec![car(bottom)])).unwrap();
        }
        let stats = pipeline.stats();
        assert_eq!(stats.frames_processed, 35);
        assert_eq!(stats.warning_events, 1);
        assert_eq!(stats.peak_tracks, 1);
    }
}
