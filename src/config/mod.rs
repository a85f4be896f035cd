//! Project configuration for `pagewright.toml`.
//!
//! # Sections
//!
//! | Section         | Purpose                                        |
//! |-----------------|------------------------------------------------|
//! | `[build]`       | Directory roots (src, dist, temp, public)      |
//! | `[build.paths]` | Per-category glob patterns                     |
//! | `[serve]`       | Development server (interface, port, watch)    |
//! | `[site]`        | Page context content (menus, package metadata) |
//!
//! A missing config file is tolerated: the built-in defaults cover the full
//! schema. A present-but-malformed file aborts before any task runs.

mod build;
mod error;
mod handle;
mod serve;
mod site;

pub use build::{BuildSection, PathsSection};
pub use error::ConfigError;
pub use handle::{cfg, init_config};
pub use serve::ServeSection;
pub use site::{MenuItem, SiteSection};

use crate::{
    cli::{Cli, Commands},
    log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing pagewright.toml.
///
/// Resolved once at startup and immutable afterwards; every task reads the
/// same record through the global handle (`cfg()`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Directory roots and glob patterns
    pub build: BuildSection,

    /// Development server settings
    pub serve: ServeSection,

    /// Site content rendered into page templates
    pub site: SiteSection,
}

impl BuildConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file. The project root is
    /// the config file's parent directory, or cwd when no file exists (the
    /// defaults cover the full schema).
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current working directory")?;

        let (config_path, exists) = match find_config_file(&cli.config) {
            Some(path) => (path, true),
            None => (cwd.join(&cli.config), false),
        };

        let mut config = if exists {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };

        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.clone());

        config.config_path = config_path;
        config.finalize(&root, cli);
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .map_err(|err| anyhow::Error::from(err).context(format!("in {}", path.display())))?;

        if !ignored.is_empty() {
            log!("warning"; "unknown fields in {}, ignoring:", path.display());
            for field in &ignored {
                eprintln!("- {field}");
            }
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Finalize configuration: absolute roots, CLI overrides.
    fn finalize(&mut self, root: &Path, cli: &Cli) {
        self.root = root.to_path_buf();
        self.build.normalize(root);

        if let Commands::Serve { args } = &cli.command {
            if let Some(interface) = args.interface {
                self.serve.interface = interface;
            }
            if let Some(port) = args.port {
                self.serve.port = port;
            }
            if let Some(watch) = args.watch {
                self.serve.watch = watch;
            }
        }
    }

    /// Validate the resolved configuration.
    ///
    /// Every asset category must resolve to exactly one root + pattern pair
    /// before any task runs; source-root existence is deliberately left to the
    /// tasks themselves (surfaced as a filesystem error at execution time).
    fn validate(&self) -> Result<(), ConfigError> {
        for (category, pattern) in self.build.paths.entries() {
            if pattern.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "build.paths.{category} must not be empty"
                )));
            }
        }
        for (name, dir) in [
            ("src", &self.build.src),
            ("dist", &self.build.dist),
            ("temp", &self.build.temp),
            ("public", &self.build.public),
        ] {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "build.{name} must not be empty"
                )));
            }
        }
        Ok(())
    }

    /// Get the project root directory.
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Join a path with the project root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }
}

/// Search upward from cwd for the config file.
fn find_config_file(name: &Path) -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

// ============================================================================
// test helpers
// ============================================================================

/// Parse a config from a TOML snippet with roots resolved against `/project`.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> BuildConfig {
    let mut config = BuildConfig::from_str(content).expect("test config should parse");
    config.root = PathBuf::from("/project");
    config.build.normalize(Path::new("/project"));
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_schema() {
        let config = test_parse_config("");

        // Every root and every glob key must be non-empty from defaults alone.
        assert!(config.validate().is_ok());
        for (_, pattern) in config.build.paths.entries() {
            assert!(!pattern.is_empty());
        }
    }

    #[test]
    fn test_partial_override_merges_with_defaults() {
        let config = test_parse_config(
            "[build]\ndist = \"out\"\n\n[build.paths]\nstyles = \"css/*.scss\"",
        );

        assert_eq!(config.build.dist, PathBuf::from("/project/out"));
        // untouched root falls back to default
        assert_eq!(config.build.temp, PathBuf::from("/project/temp"));
        // overridden nested key
        assert_eq!(config.build.paths.styles, "css/*.scss");
        // sibling nested key falls back to default
        assert_eq!(config.build.paths.scripts, "assets/scripts/*.js");
    }

    #[test]
    fn test_malformed_config_fails() {
        assert!(BuildConfig::from_str("[build\nsrc = ").is_err());
        assert!(BuildConfig::from_str("[build]\nsrc = 42").is_err());
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let config = test_parse_config("[build.paths]\npages = \"\"");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_fields_collected() {
        let (_, ignored) =
            BuildConfig::parse_with_ignored("[build]\nsrc = \"src\"\nbogus = 1").unwrap();
        assert_eq!(ignored, vec!["build.bogus".to_string()]);
    }
}
