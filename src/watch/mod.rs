//! File watching for serve mode.
//!
//! Watches the source and public roots, classifies each changed path to its
//! asset category by matching the configured globs, re-runs that category's
//! transform and broadcasts a reload. Callbacks are independent: overlapping
//! triggers for the same category are not deduplicated or debounced, so rapid
//! successive saves may enqueue redundant runs. Errors are displayed but
//! never terminate the server.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel;
use notify::{Event, RecursiveMode, Watcher};

use crate::config::BuildConfig;
use crate::context::PageContext;
use crate::logger::{status_error, status_success};
use crate::reload::ReloadHandle;
use crate::task::{Category, GLOB_OPTIONS, file_pattern};
use crate::{debug, log};

/// Attach watches and spawn the dispatch thread.
///
/// The watcher lives on the spawned thread for the remainder of the process;
/// there is no stop transition.
pub fn spawn(config: Arc<BuildConfig>, reload: ReloadHandle) -> Result<()> {
    let (tx, rx) = channel::unbounded::<notify::Result<Event>>();

    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })
    .context("failed to create file watcher")?;

    for root in [&config.build.src, &config.build.public] {
        if root.exists() {
            watcher
                .watch(root, RecursiveMode::Recursive)
                .with_context(|| format!("failed to watch {}", root.display()))?;
            log!("watch"; "{}", root.display());
        }
    }

    std::thread::spawn(move || {
        // keep the watcher alive on this thread
        let _watcher = watcher;
        while let Ok(result) = rx.recv() {
            match result {
                Ok(event) => handle_event(&config, &reload, &event),
                Err(e) => log!("watch"; "notify error: {}", e),
            }
        }
    });

    Ok(())
}

/// Re-run the transform for every category touched by the event, then reload.
fn handle_event(config: &BuildConfig, reload: &ReloadHandle, event: &Event) {
    let categories: BTreeSet<Category> = event
        .paths
        .iter()
        .filter_map(|path| classify(config, path))
        .collect();

    if categories.is_empty() {
        return;
    }

    let ctx = PageContext::from_config(config);
    for category in categories {
        let task = category.task();
        match (task.run)(config, &ctx) {
            Ok(report) => {
                status_success(&format!(
                    "{}: {} file{} rebuilt",
                    task.name,
                    report.files,
                    if report.files == 1 { "" } else { "s" },
                ));
                reload.broadcast();
            }
            Err(e) => status_error(&format!("{} failed", task.name), &format!("{e:#}")),
        }
    }
}

/// Map a changed path to its asset category via the configured globs.
fn classify(config: &BuildConfig, path: &Path) -> Option<Category> {
    for category in Category::ALL {
        let root = category.source_root(config);
        let Ok(rel) = path.strip_prefix(root) else {
            continue;
        };
        // public root can nest inside the project root; an exact pattern
        // match decides, not the prefix alone
        let Ok(pattern) = glob::Pattern::new(&file_pattern(category.pattern(config))) else {
            debug!("watch"; "invalid pattern for {}", category.name());
            continue;
        };
        if pattern.matches_path_with(rel, GLOB_OPTIONS) {
            return Some(category);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_config() -> BuildConfig {
        crate::config::test_parse_config("")
    }

    #[test]
    fn test_classify_styles() {
        let config = test_config();
        let path = PathBuf::from("/project/src/assets/styles/main.scss");
        assert_eq!(classify(&config, &path), Some(Category::Styles));
    }

    #[test]
    fn test_classify_scripts_and_pages() {
        let config = test_config();
        assert_eq!(
            classify(&config, Path::new("/project/src/assets/scripts/app.js")),
            Some(Category::Scripts)
        );
        assert_eq!(
            classify(&config, Path::new("/project/src/index.html")),
            Some(Category::Pages)
        );
        // nested html is not a top-level page
        assert_eq!(
            classify(&config, Path::new("/project/src/partials/nav.html")),
            None
        );
    }

    #[test]
    fn test_classify_binary_categories() {
        let config = test_config();
        assert_eq!(
            classify(&config, Path::new("/project/src/assets/images/logo.png")),
            Some(Category::Images)
        );
        assert_eq!(
            classify(&config, Path::new("/project/src/assets/fonts/a.woff2")),
            Some(Category::Fonts)
        );
        // recursive patterns reach nested files
        assert_eq!(
            classify(&config, Path::new("/project/src/assets/fonts/sub/b.woff")),
            Some(Category::Fonts)
        );
        assert_eq!(
            classify(&config, Path::new("/project/public/robots.txt")),
            Some(Category::Extra)
        );
    }

    #[test]
    fn test_classify_unrelated_path() {
        let config = test_config();
        assert_eq!(classify(&config, Path::new("/elsewhere/x.scss")), None);
        assert_eq!(
            classify(&config, Path::new("/project/src/notes.txt")),
            None
        );
    }
}
