//! Track table and the per-frame update state machine

use crate::association::{AssociationStrategy, GreedyCentroidMatcher};
use crate::bbox::{detections_from_rows, Detection, Point};
use crate::config::TrackerConfig;
use crate::error::{Result, TrackingError};
use crate::geometry::{CameraGeometry, GeometryModel};
use crate::kalman::FilterParams;
use crate::risk::RiskPolicy;
use crate::track::{Track, TrackSnapshot};
use ndarray::ArrayView2;
use std::collections::BTreeMap;

/// Per-frame output: track id to an owned snapshot. Ids absent from the
/// table have been terminated.
pub type TrackTable = BTreeMap<u32, TrackSnapshot>;

/// Every `u32` value is handed out at most once per manager
const MAX_TRACK_IDS: u64 = u32::MAX as u64 + 1;

/// Owns all live tracks and drives create / update / coast / terminate
pub struct TrackManager {
    config: TrackerConfig,
    geometry: GeometryModel,
    filter_params: FilterParams,
    policy: RiskPolicy,
    matcher: Box<dyn AssociationStrategy>,
    /// Keyed by id; ids are assigned increasingly so iteration is insertion order
    tracklets: BTreeMap<u32, Track>,
    /// Wider than the id type so exhaustion is detected instead of wrapping
    next_track_id: u64,
    n_frames: u64,
}

impl TrackManager {
    /// Tracker with the default greedy nearest bottom-center association
    pub fn new(config: TrackerConfig, camera: CameraGeometry) -> Result<Self> {
        let matcher = GreedyCentroidMatcher::new(config.gate_distance);
        Self::with_strategy(config, camera, Box::new(matcher))
    }

    pub fn with_strategy(
        config: TrackerConfig,
        camera: CameraGeometry,
        matcher: Box<dyn AssociationStrategy>,
    ) -> Result<Self> {
        config.validate()?;
        let geometry = GeometryModel::new(camera, config.distance_sentinel)?;
        log::info!(
            "Track manager ready: f={}px H={}m horizon={}px fps={} gate={}px max_missed={}",
            camera.focal_length,
            camera.camera_height,
            camera.optical_center.1,
            config.fps,
            config.gate_distance,
            config.max_missed
        );
        Ok(Self {
            filter_params: config.filter_params(),
            policy: config.risk_policy(),
            geometry,
            matcher,
            config,
            tracklets: BTreeMap::new(),
            next_track_id: 0,
            n_frames: 0,
        })
    }

    /// Process one frame of detections and return the resulting track table.
    ///
    /// The detections are validated up front: a contract violation fails the
    /// call with `InvalidInput` before any track is touched. `IdsExhausted` is
    /// likewise returned before mutation when the frame would need an id past
    /// `u32::MAX`.
    pub fn update(&mut self, detections: &[Detection], frame_number: u64) -> Result<TrackTable> {
        for (i, det) in detections.iter().enumerate() {
            det.validate().map_err(|e| {
                TrackingError::invalid_input(format!(
                    "frame {} detection {}: {}",
                    frame_number, i, e
                ))
            })?;
        }

        // Step 1: bottom-center anchors
        let det_anchors: Vec<Point> = detections.iter().map(|d| d.bbox.bottom_center()).collect();
        let track_ids: Vec<u32> = self.tracklets.keys().copied().collect();
        let track_anchors: Vec<Point> = self
            .tracklets
            .values()
            .map(|t| t.bbox.bottom_center())
            .collect();

        // Step 2: association
        let matching = self.matcher.associate(&track_anchors, &det_anchors);
        log::debug!(
            "Frame {}: {} detections, {} tracks, {} matches",
            frame_number,
            detections.len(),
            track_ids.len(),
            matching.matches.len()
        );

        // Step 3: keep in-range, first-come pairs; nothing is mutated yet
        let mut claimed = vec![false; detections.len()];
        let mut matched = vec![false; track_ids.len()];
        let mut accepted = Vec::with_capacity(matching.matches.len());
        for &(track_idx, det_idx) in &matching.matches {
            if track_idx >= track_ids.len() || det_idx >= detections.len() {
                continue;
            }
            if claimed[det_idx] || matched[track_idx] {
                continue;
            }
            claimed[det_idx] = true;
            matched[track_idx] = true;
            accepted.push((track_ids[track_idx], det_idx));
        }

        let n_new = claimed.iter().filter(|c| !**c).count() as u64;
        if self.next_track_id + n_new > MAX_TRACK_IDS {
            return Err(TrackingError::IdsExhausted);
        }

        for (track_id, det_idx) in accepted {
            let det = &detections[det_idx];
            let measured = self.geometry.estimate_distance(det.bbox.bottom_y());
            if let Some(track) = self.tracklets.get_mut(&track_id) {
                track.update(det, measured, frame_number, &self.policy);
                log::debug!(
                    "  track {} matched: z_meas={:.2}m z={:.2}m v={:.2}m/s ttc={:.2}s",
                    track_id,
                    measured,
                    track.distance(),
                    track.velocity(),
                    track.ttc()
                );
            }
        }

        // Step 4: unmatched tracks coast or terminate
        for (track_idx, track_id) in track_ids.iter().enumerate() {
            if matched[track_idx] {
                continue;
            }
            let expired = match self.tracklets.get_mut(track_id) {
                Some(track) => {
                    track.mark_missed(&self.policy);
                    track.missed_count > self.config.max_missed
                }
                None => false,
            };
            if expired {
                self.tracklets.remove(track_id);
                log::debug!(
                    "  track {} terminated after {} missed frames",
                    track_id,
                    self.config.max_missed + 1
                );
            }
        }

        // Step 5: unclaimed detections spawn tracks
        for (det_idx, det) in detections.iter().enumerate() {
            if claimed[det_idx] {
                continue;
            }
            let measured = self.geometry.estimate_distance(det.bbox.bottom_y());
            // Bounded by the MAX_TRACK_IDS check above
            let id = self.next_track_id as u32;
            self.tracklets.insert(
                id,
                Track::new(
                    id,
                    det,
                    measured,
                    frame_number,
                    &self.filter_params,
                    self.config.ttc_sentinel,
                ),
            );
            self.next_track_id += 1;
            log::debug!(
                "  new track {} for detection {} (class {}, score {:.2}, z={:.2}m)",
                id,
                det_idx,
                det.class_id,
                det.score,
                measured
            );
        }

        self.n_frames += 1;

        // Step 6: owned copy of the table
        Ok(self.tracks())
    }

    /// Same as `update` for detector output rows `[x1, y1, x2, y2, score, class_id]`
    pub fn update_array(&mut self, rows: ArrayView2<f32>, frame_number: u64) -> Result<TrackTable> {
        let detections = detections_from_rows(rows)?;
        self.update(&detections, frame_number)
    }

    /// Snapshot of every live track
    pub fn tracks(&self) -> TrackTable {
        self.tracklets
            .iter()
            .map(|(id, track)| (*id, track.snapshot(&self.policy)))
            .collect()
    }

    pub fn track(&self, track_id: u32) -> Result<TrackSnapshot> {
        self.tracklets
            .get(&track_id)
            .map(|t| t.snapshot(&self.policy))
            .ok_or(TrackingError::NotFound(track_id))
    }

    /// Drop a track; its id is not handed out again
    pub fn remove_track(&mut self, track_id: u32) -> Result<TrackSnapshot> {
        self.tracklets
            .remove(&track_id)
            .map(|t| t.snapshot(&self.policy))
            .ok_or(TrackingError::NotFound(track_id))
    }

    /// Drop every track; id assignment continues where it left off
    pub fn clear(&mut self) {
        self.tracklets.clear();
    }

    pub fn num_tracks(&self) -> usize {
        self.tracklets.len()
    }

    /// Number of successfully processed frames
    pub fn frame_count(&self) -> u64 {
        self.n_frames
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn geometry(&self) -> &GeometryModel {
        &self.geometry
    }

    pub fn risk_policy(&self) -> &RiskPolicy {
        &self.policy
    }
}
