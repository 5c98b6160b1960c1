//! Offline replay of recorded detections
//!
//! Input is JSON Lines, one `FrameRecord` per line. Output is one
//! `FrameReport` per processed frame, also as JSON Lines.

use crate::error::{AdasError, Result};
use crate::pipeline::{FramePipeline, PipelineStats};
use crate::types::FrameRecord;
use std::io::{BufRead, Write};
use ttctrack::TrackingError;

/// Feed every record from `reader` through `pipeline`, writing reports to `writer`.
///
/// Blank lines are ignored. A line that is not a valid `FrameRecord` aborts the
/// replay; a frame whose detections the tracker rejects is logged and skipped.
pub fn run_replay<R: BufRead, W: Write>(
    reader: R,
    mut writer: W,
    pipeline: &mut FramePipeline,
) -> Result<PipelineStats> {
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let record: FrameRecord = serde_json::from_str(&line)
            .map_err(|e| AdasError::invalid_record(line_no, e.to_string()))?;

        match pipeline.process(&record) {
            Ok(report) => {
                serde_json::to_writer(&mut writer, &report)?;
                writer.write_all(b"\n")?;
            }
            Err(AdasError::Tracking(TrackingError::InvalidInput(msg))) => {
                log::warn!("Skipping frame {} (line {}): {}", record.frame, line_no, msg);
            }
            Err(e) => return Err(e),
        }
    }
    writer.flush()?;

    let stats = pipeline.stats().clone();
    log::info!(
        "Replay finished: {} frames processed, {} skipped, {} warning events, peak {} tracks, {:.1}us/frame",
        stats.frames_processed,
        stats.frames_skipped,
        stats.warning_events,
        stats.peak_tracks,
        stats.mean_elapsed_us()
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdasConfig;
    use crate::types::FrameReport;

    fn pipeline() -> FramePipeline {
        FramePipeline::new(&AdasConfig::default()).unwrap()
    }

    #[test]
    fn test_replay_writes_one_report_per_frame() {
        let input = concat!(
            r#"{"frame": 0, "detections": [{"bbox": [600, 450, 680, 510], "score": 0.9, "class_id": 2}]}"#,
            "\n\n",
            r#"{"frame": 1, "detections": [{"bbox": [601, 451, 681, 511], "score": 0.9, "class_id": 2}]}"#,
            "\n",
            r#"{"frame": 2}"#,
            "\n",
        );
        let mut out = Vec::new();
        let mut pipeline = pipeline();
        let stats = run_replay(input.as_bytes(), &mut out, &mut pipeline).unwrap();
        assert_eq!(stats.frames_processed, 3);

        let reports: Vec<FrameReport> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[1].tracks[0].id, 0);
        assert_eq!(reports[1].tracks[0].hits, 2);
        assert_eq!(reports[2].tracks[0].missed_count, 1);
    }

    #[test]
    fn test_malformed_line_aborts() {
        let input = "{\"frame\": 0}\nnot json\n{\"frame\": 2}\n";
        let mut out = Vec::new();
        let err = run_replay(input.as_bytes(), &mut out, &mut pipeline()).unwrap_err();
        assert!(matches!(err, AdasError::InvalidRecord { line: 2, .. }));
    }

    #[test]
    fn test_rejected_frame_is_skipped() {
        let input = concat!(
            r#"{"frame": 0, "detections": [{"bbox": [680, 450, 600, 510], "score": 0.9, "class_id": 2}]}"#,
            "\n",
            r#"{"frame": 1, "detections": [{"bbox": [600, 450, 680, 510], "score": 0.9, "class_id": 2}]}"#,
            "\n",
        );
        let mut out = Vec::new();
        let stats = run_replay(input.as_bytes(), &mut out, &mut pipeline()).unwrap();
        assert_eq!(stats.frames_skipped, 1);
        assert_eq!(stats.frames_processed, 1);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
