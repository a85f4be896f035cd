//! Bundler: resolve build blocks in rendered pages, then minify.
//!
//! The only stage that branches per file extension - a three-way dispatch
//! (script / style / markup), nothing more. Reads rendered HTML from the
//! intermediate root, concatenates each block's referenced files into a
//! bundle under the distribution root, rewrites the block to a single tag,
//! minifies the page and writes it to the distribution root.

mod blocks;
mod minify;

pub use minify::{minify_css, minify_html, minify_js};

use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::BuildConfig;
use crate::context::PageContext;
use crate::task::{GLOB_OPTIONS, Task, TaskReport};
use crate::utils::path::ensure_parent;
use blocks::{BlockKind, parse_blocks};

pub const TASK: Task = Task {
    name: "bundle",
    run,
};

fn run(config: &BuildConfig, _ctx: &PageContext) -> Result<TaskReport> {
    let pattern = config.build.temp.join(&config.build.paths.pages);
    let pattern = pattern.to_str().context("non-UTF-8 temp path")?;

    let mut pages: Vec<PathBuf> = glob::glob_with(pattern, GLOB_OPTIONS)
        .context("invalid pages glob")?
        .filter_map(std::result::Result::ok)
        .filter(|p| p.is_file())
        .collect();
    pages.sort();

    for page in &pages {
        process_page(page, config)
            .with_context(|| format!("failed to bundle {}", page.display()))?;
    }

    Ok(TaskReport { files: pages.len() })
}

/// Bundle one rendered page and write the minified result to dist.
fn process_page(page: &Path, config: &BuildConfig) -> Result<()> {
    let mut html = fs::read_to_string(page)?;

    // Replace back-to-front so earlier spans stay valid.
    for block in parse_blocks(&html).into_iter().rev() {
        let bundle = concat_refs(&block.refs, config)?;
        let minified = match block.kind {
            BlockKind::Js => minify_js(&bundle)
                .ok_or_else(|| anyhow!("failed to minify js bundle `{}`", block.target))?,
            BlockKind::Css => minify_css(&bundle)
                .ok_or_else(|| anyhow!("failed to minify css bundle `{}`", block.target))?,
        };

        let target = config.build.dist.join(&block.target);
        ensure_parent(&target)?;
        fs::write(&target, minified)
            .with_context(|| format!("failed to write bundle {}", target.display()))?;

        let (start, end) = block.span;
        html.replace_range(start..end, &block.replacement_tag());
    }

    let rel = page
        .strip_prefix(&config.build.temp)
        .context("page is outside the intermediate root")?;
    let output = config.build.dist.join(rel);
    ensure_parent(&output)?;
    fs::write(&output, minify_html(&html))
        .with_context(|| format!("failed to write {}", output.display()))?;
    Ok(())
}

/// Concatenate a block's referenced files, searching the intermediate root
/// first and the project root second.
fn concat_refs(refs: &[String], config: &BuildConfig) -> Result<String> {
    let mut bundle = String::new();
    for reference in refs {
        let rel = reference.trim_start_matches('/');
        let path = [&config.build.temp, &config.root]
            .iter()
            .map(|root| root.join(rel))
            .find(|p| p.is_file())
            .ok_or_else(|| anyhow!("referenced file `{reference}` not found"))?;

        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        bundle.push_str(&content);
        if !bundle.ends_with('\n') {
            bundle.push('\n');
        }
    }
    Ok(bundle)
}
