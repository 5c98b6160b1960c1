//! Forward collision warning driver
//!
//! Wraps the `ttctrack` engine for dashcam use: detections recorded by an
//! external detector are filtered to vehicle classes, tracked, and reported
//! per frame with distance, closing speed, TTC and risk level.
//!
//! ```ignore
//! use lane_collision_adas::{AdasConfig, FramePipeline, run_replay};
//! use std::io::{stdin, stdout};
//!
//! let mut pipeline = FramePipeline::new(&AdasConfig::default())?;
//! let stats = run_replay(stdin().lock(), stdout().lock(), &mut pipeline)?;
//! println!("{} warning events", stats.warning_events);
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod render;
pub mod replay;
pub mod types;

pub use config::AdasConfig;
pub use error::{AdasError, Result};
pub use filter::{DetectionFilter, DetectionFilterConfig};
pub use pipeline::{FramePipeline, PipelineStats};
pub use render::render_topdown;
pub use replay::run_replay;
pub use types::{DetectionRecord, FrameRecord, FrameReport, VehicleClass};
