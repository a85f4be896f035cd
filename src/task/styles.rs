//! Styles task: Sass -> CSS into the intermediate root.

use anyhow::{Context, Result, anyhow};
use std::fs;

use super::{Category, TaskReport, collect_inputs, output_path};
use crate::config::BuildConfig;
use crate::context::PageContext;
use crate::utils::path::ensure_parent;

/// Compile every matched stylesheet with expanded (non-compressed) formatting.
/// Syntax errors abort the task; minification happens later in the bundler.
pub fn run(config: &BuildConfig, _ctx: &PageContext) -> Result<TaskReport> {
    let inputs = collect_inputs(config, Category::Styles)?;
    let options = grass::Options::default().style(grass::OutputStyle::Expanded);

    for input in &inputs {
        let css = grass::from_path(input, &options)
            .map_err(|e| anyhow!(e.to_string()))
            .with_context(|| format!("failed to compile {}", input.display()))?;

        let output = output_path(config, Category::Styles, input)?.with_extension("css");
        ensure_parent(&output)?;
        fs::write(&output, css)
            .with_context(|| format!("failed to write {}", output.display()))?;
    }

    Ok(TaskReport {
        files: inputs.len(),
    })
}
