//! Build tasks.
//!
//! Each asset category owns one root + glob pair and one transform function,
//! wired through a compile-time registry (`Category::task`) rather than any
//! name-based runtime lookup. Tasks read the config and the filesystem, write
//! the filesystem, and carry no state between invocations.
//!
//! Write targets are disjoint by construction: styles/scripts/pages write
//! under the intermediate root in separate subtrees, images/fonts/extra write
//! under the distribution root in separate subtrees. Parallel execution of
//! the whole group therefore needs no synchronization.

pub mod clean;
mod extra;
mod fonts;
mod images;
mod pages;
mod scripts;
mod styles;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::BuildConfig;
use crate::context::PageContext;
use crate::log;

/// Asset category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Styles,
    Scripts,
    Pages,
    Images,
    Fonts,
    Extra,
}

impl Category {
    /// All categories, in registry order.
    pub const ALL: [Category; 6] = [
        Category::Styles,
        Category::Scripts,
        Category::Pages,
        Category::Images,
        Category::Fonts,
        Category::Extra,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Category::Styles => "styles",
            Category::Scripts => "scripts",
            Category::Pages => "pages",
            Category::Images => "images",
            Category::Fonts => "fonts",
            Category::Extra => "extra",
        }
    }

    /// Glob pattern for this category, relative to its source root.
    pub fn pattern(self, config: &BuildConfig) -> &str {
        let paths = &config.build.paths;
        match self {
            Category::Styles => &paths.styles,
            Category::Scripts => &paths.scripts,
            Category::Pages => &paths.pages,
            Category::Images => &paths.images,
            Category::Fonts => &paths.fonts,
            Category::Extra => &paths.public,
        }
    }

    /// Directory the category's glob is applied to.
    pub fn source_root(self, config: &BuildConfig) -> &Path {
        match self {
            Category::Extra => &config.build.public,
            _ => &config.build.src,
        }
    }

    /// Directory the category writes to.
    ///
    /// Text categories go through the intermediate root for later bundling;
    /// binary categories need no bundling step and write straight to dist.
    pub fn output_root(self, config: &BuildConfig) -> &Path {
        match self {
            Category::Styles | Category::Scripts | Category::Pages => &config.build.temp,
            Category::Images | Category::Fonts | Category::Extra => &config.build.dist,
        }
    }

    /// The statically-known transform for this category.
    pub const fn task(self) -> Task {
        match self {
            Category::Styles => Task {
                name: "styles",
                run: styles::run,
            },
            Category::Scripts => Task {
                name: "scripts",
                run: scripts::run,
            },
            Category::Pages => Task {
                name: "pages",
                run: pages::run,
            },
            Category::Images => Task {
                name: "images",
                run: images::run,
            },
            Category::Fonts => Task {
                name: "fonts",
                run: fonts::run,
            },
            Category::Extra => Task {
                name: "extra",
                run: extra::run,
            },
        }
    }
}

/// A named, zero-argument unit of build work.
pub type TaskFn = fn(&BuildConfig, &PageContext) -> Result<TaskReport>;

#[derive(Clone, Copy)]
pub struct Task {
    pub name: &'static str,
    pub run: TaskFn,
}

/// What a task did, for logging.
#[derive(Debug, Default, Clone, Copy)]
pub struct TaskReport {
    pub files: usize,
}

impl Task {
    /// Run the task, logging duration and file count.
    pub fn execute(&self, config: &BuildConfig, ctx: &PageContext) -> Result<()> {
        let started = Instant::now();
        let report = (self.run)(config, ctx).with_context(|| format!("task `{}` failed", self.name))?;
        log!(
            self.name;
            "{} file{} in {:.0?}",
            report.files,
            if report.files == 1 { "" } else { "s" },
            started.elapsed()
        );
        Ok(())
    }
}

// ============================================================================
// Input collection
// ============================================================================

/// Glob match options: `*` must not cross path separators, so a `*.html`
/// pages pattern only picks up top-level files.
pub const GLOB_OPTIONS: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A trailing `**` component matches directories only in the glob crate;
/// extend it to reach the files underneath. Used for both input collection
/// and watch classification so the two agree on what a pattern covers.
pub fn file_pattern(pattern: &str) -> String {
    if pattern == "**" || pattern.ends_with("/**") {
        format!("{pattern}/*")
    } else {
        pattern.to_string()
    }
}

/// Collect glob-matched input files for a category, sorted for determinism.
///
/// A missing source root is a hard error (surfaced from the filesystem read,
/// not pre-validated at config load).
pub fn collect_inputs(config: &BuildConfig, category: Category) -> Result<Vec<PathBuf>> {
    let root = category.source_root(config);
    std::fs::metadata(root)
        .with_context(|| format!("source root {} not readable", root.display()))?;

    let pattern = root.join(file_pattern(category.pattern(config)));
    let pattern = pattern
        .to_str()
        .with_context(|| format!("non-UTF-8 path for {}", category.name()))?;

    let mut files: Vec<PathBuf> = glob::glob_with(pattern, GLOB_OPTIONS)
        .with_context(|| format!("invalid glob for {}", category.name()))?
        .filter_map(std::result::Result::ok)
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Output path for an input, preserving the path relative to the source root.
pub fn output_path(config: &BuildConfig, category: Category, input: &Path) -> Result<PathBuf> {
    let rel = input
        .strip_prefix(category.source_root(config))
        .with_context(|| format!("{} is outside its source root", input.display()))?;
    Ok(category.output_root(config).join(rel))
}
