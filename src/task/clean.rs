//! Cleaner: delete the distribution root before a production build.

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;

use super::{Task, TaskReport};
use crate::config::BuildConfig;
use crate::context::PageContext;
use crate::log;

pub const TASK: Task = Task {
    name: "clean",
    run: run_task,
};

/// CLI entry point for `pagewright clean`.
pub fn run(config: &BuildConfig) -> Result<()> {
    let report = run_task(config, &PageContext::from_config(config))?;
    if report.files > 0 {
        log!("clean"; "removed {}", config.build.dist.display());
    } else {
        log!("clean"; "nothing to remove");
    }
    Ok(())
}

/// Recursively delete the distribution root. No-op when absent, so running
/// clean twice in a row succeeds.
fn run_task(config: &BuildConfig, _ctx: &PageContext) -> Result<TaskReport> {
    match fs::remove_dir_all(&config.build.dist) {
        Ok(()) => Ok(TaskReport { files: 1 }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(TaskReport { files: 0 }),
        Err(e) => Err(e).with_context(|| {
            format!("failed to remove {}", config.build.dist.display())
        }),
    }
}
