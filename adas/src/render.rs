//! Bird's-eye rendering of a still dashcam frame

use crate::error::Result;
use std::path::Path;
use ttctrack::{TopDownConfig, TopDownProjector};

/// Warp the image at `input` to the top-down view and save it to `output`.
///
/// The output format follows the extension of `output`. Returns the size of
/// the written image.
pub fn render_topdown(input: &Path, output: &Path, config: TopDownConfig) -> Result<(u32, u32)> {
    let projector = TopDownProjector::new(config)?;
    let frame = image::open(input)?.to_rgb8();
    log::info!(
        "Loaded {} ({}x{})",
        input.display(),
        frame.width(),
        frame.height()
    );

    let (warped, homography) = projector.project_topdown(&frame)?;
    log::info!("Road-plane homography:{}", homography);

    warped.save(output)?;
    log::info!(
        "Wrote top-down view to {} ({}x{})",
        output.display(),
        warped.width(),
        warped.height()
    );
    Ok(warped.dimensions())
}
