//! Extra task: pass the public root through to the distribution root.
//!
//! Identity transform for files that must ship unmodified (robots.txt,
//! manifests, favicons).

use anyhow::{Context, Result};
use std::fs;

use super::{Category, TaskReport, collect_inputs, output_path};
use crate::config::BuildConfig;
use crate::context::PageContext;
use crate::utils::path::ensure_parent;

pub fn run(config: &BuildConfig, _ctx: &PageContext) -> Result<TaskReport> {
    let inputs = collect_inputs(config, Category::Extra)?;

    for input in &inputs {
        let output = output_path(config, Category::Extra, input)?;
        ensure_parent(&output)?;
        fs::copy(input, &output)
            .with_context(|| format!("failed to copy {}", input.display()))?;
    }

    Ok(TaskReport {
        files: inputs.len(),
    })
}
