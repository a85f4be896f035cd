//! Images task: lossless recompression straight to the distribution root.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::{Category, TaskReport, collect_inputs, output_path};
use crate::config::BuildConfig;
use crate::context::PageContext;
use crate::utils::path::ensure_parent;

/// Re-encode PNG/JPEG images; copy every other format verbatim. Images need
/// no bundling step, so output bypasses the intermediate root.
pub fn run(config: &BuildConfig, _ctx: &PageContext) -> Result<TaskReport> {
    let inputs = collect_inputs(config, Category::Images)?;

    for input in &inputs {
        let output = output_path(config, Category::Images, input)?;
        ensure_parent(&output)?;
        compress(input, &output)
            .with_context(|| format!("failed to process {}", input.display()))?;
    }

    Ok(TaskReport {
        files: inputs.len(),
    })
}

/// Recompress a single image, falling back to a byte copy for formats the
/// re-encoder does not cover (SVG, GIF, ICO, ...).
fn compress(input: &Path, output: &Path) -> Result<()> {
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let format = match ext.as_deref() {
        Some("png") => Some(image::ImageFormat::Png),
        Some("jpg") | Some("jpeg") => Some(image::ImageFormat::Jpeg),
        _ => None,
    };

    match format {
        Some(format) => {
            let img = image::open(input)?;
            img.save_with_format(output, format)?;
        }
        None => {
            fs::copy(input, output)?;
        }
    }
    Ok(())
}
