//! Monocular longitudinal tracking and collision-risk estimation
//!
//! Turns per-frame 2-D detections into persistent tracks carrying a filtered
//! distance, closing velocity, time-to-collision (TTC) and risk level.
//!
//! - `geometry`: flat-ground back-projection of the box bottom row to meters
//! - `kalman`: per-track `[distance, velocity]` Kalman filter
//! - `association`: greedy nearest bottom-center matching
//! - `tracker`: the `TrackManager` lifecycle and per-frame update
//! - `topdown`: bird's-eye warp for visualization
//!
//! ```rust,ignore
//! use ttctrack::{BoundingBox, CameraGeometry, Detection, TrackManager, TrackerConfig};
//!
//! let camera = CameraGeometry::new(1100.0, 1.6, (640.0, 360.0))?;
//! let mut tracker = TrackManager::new(TrackerConfig::default(), camera)?;
//!
//! let detections = [Detection::new(BoundingBox::new(600.0, 400.0, 680.0, 460.0), 0.9, 2)];
//! let table = tracker.update(&detections, 0)?;
//! assert!((table[&0].distance - 17.6).abs() < 1e-3);
//! ```

pub mod association;
pub mod bbox;
pub mod config;
pub mod error;
pub mod geometry;
pub mod kalman;
pub mod risk;
pub mod topdown;
pub mod track;
pub mod tracker;

pub use association::{AssociationStrategy, GreedyCentroidMatcher, Matching};
pub use bbox::{detections_from_rows, BoundingBox, Detection, Point};
pub use config::TrackerConfig;
pub use error::{Result, TrackingError};
pub use geometry::{CameraGeometry, GeometryModel};
pub use kalman::{FilterParams, LongitudinalFilter};
pub use risk::{RiskLevel, RiskPolicy};
pub use topdown::{project_point, TopDownConfig, TopDownProjector};
pub use track::{Track, TrackSnapshot, TrackState};
pub use tracker::{TrackManager, TrackTable};
