//! Pages task: render templated HTML against the page context.
//!
//! Output goes to the intermediate root unminified; HTML minification is
//! deferred to the bundler so pages are not processed twice.

use anyhow::{Context, Result};
use std::fs;

use super::{Category, TaskReport, collect_inputs, output_path};
use crate::config::BuildConfig;
use crate::context::PageContext;
use crate::utils::path::ensure_parent;

/// Render every matched top-level template. Template errors abort the task.
pub fn run(config: &BuildConfig, ctx: &PageContext) -> Result<TaskReport> {
    let inputs = collect_inputs(config, Category::Pages)?;
    let context = tera::Context::from_serialize(ctx)
        .context("failed to serialize page context")?;

    for input in &inputs {
        let name = input.to_string_lossy().into_owned();
        let mut tera = tera::Tera::default();
        tera.add_template_file(input, Some(&name))
            .with_context(|| format!("failed to load template {}", input.display()))?;
        let html = tera
            .render(&name, &context)
            .with_context(|| format!("failed to render {}", input.display()))?;

        let output = output_path(config, Category::Pages, input)?;
        ensure_parent(&output)?;
        fs::write(&output, html)
            .with_context(|| format!("failed to write {}", output.display()))?;
    }

    Ok(TaskReport {
        files: inputs.len(),
    })
}
