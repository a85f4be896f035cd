//! Fonts task: verbatim copy straight to the distribution root.

use anyhow::{Context, Result};
use std::fs;

use super::{Category, TaskReport, collect_inputs, output_path};
use crate::config::BuildConfig;
use crate::context::PageContext;
use crate::utils::path::ensure_parent;

/// Copy every matched font file, preserving relative paths. Fonts are already
/// compressed containers; no transform applies.
pub fn run(config: &BuildConfig, _ctx: &PageContext) -> Result<TaskReport> {
    let inputs = collect_inputs(config, Category::Fonts)?;

    for input in &inputs {
        let output = output_path(config, Category::Fonts, input)?;
        ensure_parent(&output)?;
        fs::copy(input, &output)
            .with_context(|| format!("failed to copy {}", input.display()))?;
    }

    Ok(TaskReport {
        files: inputs.len(),
    })
}
