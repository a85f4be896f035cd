//! Global config handle.
//!
//! Uses `arc-swap` for lock-free reads. The config is resolved once at startup
//! and never mutated by tasks; the handle exists so the server request pool
//! and watch callbacks can read it without threading references through.

use crate::config::BuildConfig;
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

/// Global config storage.
static CONFIG: LazyLock<ArcSwap<BuildConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(BuildConfig::default()));

/// Read the current config.
#[inline]
pub fn cfg() -> Arc<BuildConfig> {
    CONFIG.load_full()
}

/// Install the resolved config. Called once from main.
#[inline]
pub fn init_config(config: BuildConfig) -> Arc<BuildConfig> {
    let arc = Arc::new(config);
    CONFIG.store(Arc::clone(&arc));
    arc
}
