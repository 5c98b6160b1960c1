//! A single tracked object and the snapshot handed to consumers

use crate::bbox::{BoundingBox, Detection};
use crate::kalman::{FilterParams, LongitudinalFilter};
use crate::risk::{RiskLevel, RiskPolicy};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a live track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackState {
    /// Matched in the latest frame
    Active,
    /// Unmatched, still within the miss tolerance
    Coasting,
}

/// Persistent track owned by the `TrackManager`
#[derive(Debug, Clone)]
pub struct Track {
    /// track id, never reused
    pub id: u32,
    /// class of the detection that created the track
    pub class_id: u32,
    /// last matched detection box
    pub bbox: BoundingBox,
    /// score of the last matched detection
    pub score: f32,
    filter: LongitudinalFilter,
    ttc: f32,
    /// consecutive frames without a matched detection
    pub missed_count: u32,
    /// number of detections folded in, including the one that created it
    pub hits: u32,
    /// number of frames the track has been alive
    pub age: u32,
    pub first_frame: u64,
    pub last_matched_frame: u64,
}

impl Track {
    /// Start a track from an unclaimed detection and its distance measurement
    pub fn new(
        id: u32,
        detection: &Detection,
        measured_distance: f32,
        frame: u64,
        params: &FilterParams,
        ttc_sentinel: f32,
    ) -> Self {
        Self {
            id,
            class_id: detection.class_id,
            bbox: detection.bbox,
            score: detection.score,
            filter: LongitudinalFilter::new(measured_distance, params),
            ttc: ttc_sentinel,
            missed_count: 0,
            hits: 1,
            age: 1,
            first_frame: frame,
            last_matched_frame: frame,
        }
    }

    /// Matched path: predict/correct the filter and refresh TTC
    pub fn update(
        &mut self,
        detection: &Detection,
        measured_distance: f32,
        frame: u64,
        policy: &RiskPolicy,
    ) {
        let (distance, velocity) = self.filter.update(measured_distance);
        self.ttc = policy.time_to_collision(distance, velocity);
        self.bbox = detection.bbox;
        self.score = detection.score;
        self.missed_count = 0;
        self.hits += 1;
        self.age += 1;
        self.last_matched_frame = frame;
    }

    /// Unmatched path: the filter is left untouched
    pub fn mark_missed(&mut self, policy: &RiskPolicy) {
        self.missed_count += 1;
        self.age += 1;
        // TTC stays a function of the current estimate
        let (distance, velocity) = self.filter.state();
        self.ttc = policy.time_to_collision(distance, velocity);
    }

    pub fn state(&self) -> TrackState {
        if self.missed_count == 0 {
            TrackState::Active
        } else {
            TrackState::Coasting
        }
    }

    pub fn distance(&self) -> f32 {
        self.filter.distance()
    }

    pub fn velocity(&self) -> f32 {
        self.filter.velocity()
    }

    pub fn ttc(&self) -> f32 {
        self.ttc
    }

    pub fn filter(&self) -> &LongitudinalFilter {
        &self.filter
    }

    pub fn snapshot(&self, policy: &RiskPolicy) -> TrackSnapshot {
        let distance = self.distance();
        TrackSnapshot {
            id: self.id,
            class_id: self.class_id,
            bbox: self.bbox,
            score: self.score,
            distance,
            velocity: self.velocity(),
            ttc: self.ttc,
            risk: policy.classify(distance, self.ttc),
            state: self.state(),
            missed_count: self.missed_count,
            hits: self.hits,
            age: self.age,
            last_matched_frame: self.last_matched_frame,
        }
    }
}

/// Owned copy of a track's public state for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSnapshot {
    pub id: u32,
    pub class_id: u32,
    pub bbox: BoundingBox,
    pub score: f32,
    /// filtered distance (meters)
    pub distance: f32,
    /// filtered relative velocity (m/s, negative when closing)
    pub velocity: f32,
    /// time to collision (seconds), or the sentinel when not closing
    pub ttc: f32,
    pub risk: RiskLevel,
    pub state: TrackState,
    pub missed_count: u32,
    pub hits: u32,
    pub age: u32,
    pub last_matched_frame: u64,
}
