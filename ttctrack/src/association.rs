//! Frame-to-frame association of tracks and detections
//!
//! Matching works on bottom-center anchors. The shipped strategy is greedy
//! and order dependent: a detection claimed by an earlier track is never
//! reconsidered, so crossing objects may swap identities. Other strategies can
//! be plugged into the `TrackManager` through `AssociationStrategy`.

use crate::bbox::Point;

/// Result of associating track anchors with detection anchors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matching {
    /// Matches as (track_idx, detection_idx) pairs, in track order
    pub matches: Vec<(usize, usize)>,
    /// Indices of tracks left without a detection
    pub unmatched_tracks: Vec<usize>,
    /// Indices of detections no track claimed
    pub unmatched_detections: Vec<usize>,
}

/// Capability: given track anchors and detection anchors, return a one-to-one partial matching
pub trait AssociationStrategy: Send {
    fn associate(&self, tracks: &[Point], detections: &[Point]) -> Matching;
}

/// Greedy nearest bottom-center matching with a pixel gate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreedyCentroidMatcher {
    /// Matches must be strictly closer than this (pixels)
    pub gate_distance: f32,
}

impl GreedyCentroidMatcher {
    pub fn new(gate_distance: f32) -> Self {
        Self { gate_distance }
    }
}

impl Default for GreedyCentroidMatcher {
    fn default() -> Self {
        Self::new(50.0)
    }
}

impl AssociationStrategy for GreedyCentroidMatcher {
    fn associate(&self, tracks: &[Point], detections: &[Point]) -> Matching {
        let mut claimed = vec![false; detections.len()];
        let mut matching = Matching::default();

        for (track_idx, anchor) in tracks.iter().enumerate() {
            let mut best_dist = self.gate_distance;
            let mut best_idx = None;

            for (det_idx, candidate) in detections.iter().enumerate() {
                if claimed[det_idx] {
                    continue;
                }
                let dist = anchor.distance(candidate);
                // Strict comparison keeps the first minimum on ties
                if dist < best_dist {
                    best_dist = dist;
                    best_idx = Some(det_idx);
                }
            }

            match best_idx {
                Some(det_idx) => {
                    claimed[det_idx] = true;
                    matching.matches.push((track_idx, det_idx));
                    log::debug!(
                        "  track[{}] -> det[{}] ({:.1}px)",
                        track_idx,
                        det_idx,
                        best_dist
                    );
                }
                None => matching.unmatched_tracks.push(track_idx),
            }
        }

        matching.unmatched_detections = claimed
            .iter()
            .enumerate()
            .filter(|(_, c)| !**c)
            .map(|(i, _)| i)
            .collect();
        matching
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_empty_inputs() {
        let m = GreedyCentroidMatcher::default();
        let result = m.associate(&[], &[p(1.0, 1.0)]);
        assert!(result.matches.is_empty());
        assert_eq!(result.unmatched_detections, vec![0]);

        let result = m.associate(&[p(1.0, 1.0)], &[]);
        assert_eq!(result.unmatched_tracks, vec![0]);
        assert!(result.unmatched_detections.is_empty());
    }

    #[test]
    fn test_nearest_within_gate() {
        let m = GreedyCentroidMatcher::default();
        let tracks = [p(100.0, 400.0), p(500.0, 400.0)];
        let dets = [p(505.0, 402.0), p(300.0, 400.0), p(98.0, 405.0)];
        let result = m.associate(&tracks, &dets);
        assert_eq!(result.matches, vec![(0, 2), (1, 0)]);
        assert!(result.unmatched_tracks.is_empty());
        assert_eq!(result.unmatched_detections, vec![1]);
    }

    #[test]
    fn test_gate_is_strict() {
        let m = GreedyCentroidMatcher::new(50.0);
        let result = m.associate(&[p(0.0, 0.0)], &[p(30.0, 40.0)]);
        assert!(result.matches.is_empty());
        assert_eq!(result.unmatched_tracks, vec![0]);
        assert_eq!(result.unmatched_detections, vec![0]);

        let result = m.associate(&[p(0.0, 0.0)], &[p(30.0, 39.9)]);
        assert_eq!(result.matches, vec![(0, 0)]);
    }

    #[test]
    fn test_first_minimum_wins_tie() {
        let m = GreedyCentroidMatcher::default();
        let result = m.associate(&[p(100.0, 100.0)], &[p(90.0, 100.0), p(110.0, 100.0)]);
        assert_eq!(result.matches, vec![(0, 0)]);
        assert_eq!(result.unmatched_detections, vec![1]);
    }

    #[test]
    fn test_earlier_track_claims_first() {
        // Track 1 is closer to the detection, but track 0 is visited first
        let m = GreedyCentroidMatcher::default();
        let tracks = [p(100.0, 100.0), p(125.0, 100.0)];
        let dets = [p(120.0, 100.0)];
        let result = m.associate(&tracks, &dets);
        assert_eq!(result.matches, vec![(0, 0)]);
        assert_eq!(result.unmatched_tracks, vec![1]);
    }
}
