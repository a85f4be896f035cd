//! `[build]` section: directory roots and per-category glob patterns.
//!
//! # Example
//!
//! ```toml
//! [build]
//! src = "src"          # source root
//! dist = "dist"        # distribution root (final output)
//! temp = "temp"        # intermediate root (pre-bundle output)
//! public = "public"    # verbatim-copy root
//!
//! [build.paths]
//! styles = "assets/styles/*.scss"
//! pages = "*.html"
//! ```
//!
//! Roots are relative to the project root in the file and normalized to
//! absolute paths at load time. Glob patterns are relative to their category's
//! root (`src` for styles/scripts/pages/images/fonts, `public` for public).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory layout and glob patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Source root containing styles, scripts, pages, images and fonts.
    pub src: PathBuf,

    /// Distribution root - final build output.
    pub dist: PathBuf,

    /// Intermediate root - scratch output before bundling, safe to delete.
    pub temp: PathBuf,

    /// Public root - files shipped unmodified.
    pub public: PathBuf,

    /// Per-category glob patterns.
    pub paths: PathsSection,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            src: PathBuf::from("src"),
            dist: PathBuf::from("dist"),
            temp: PathBuf::from("temp"),
            public: PathBuf::from("public"),
            paths: PathsSection::default(),
        }
    }
}

impl BuildSection {
    /// Resolve relative roots against the project root.
    pub fn normalize(&mut self, root: &Path) {
        for dir in [&mut self.src, &mut self.dist, &mut self.temp, &mut self.public] {
            if dir.is_relative() {
                *dir = root.join(&dir);
            }
        }
    }
}

/// Glob pattern for each asset category, relative to the category's root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    pub styles: String,
    pub scripts: String,
    pub pages: String,
    pub images: String,
    pub fonts: String,
    pub public: String,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            styles: "assets/styles/*.scss".into(),
            scripts: "assets/scripts/*.js".into(),
            pages: "*.html".into(),
            images: "assets/images/**".into(),
            fonts: "assets/fonts/**".into(),
            public: "**".into(),
        }
    }
}

impl PathsSection {
    /// All (category name, pattern) pairs, for validation and diagnostics.
    pub fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("styles", &self.styles),
            ("scripts", &self.scripts),
            ("pages", &self.pages),
            ("images", &self.images),
            ("fonts", &self.fonts),
            ("public", &self.public),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_build_section_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.src, PathBuf::from("/project/src"));
        assert_eq!(config.build.dist, PathBuf::from("/project/dist"));
        assert_eq!(config.build.paths.pages, "*.html");
        assert_eq!(config.build.paths.public, "**");
    }

    #[test]
    fn test_build_section_root_override() {
        let config = test_parse_config("[build]\nsrc = \"web\"\npublic = \"static\"");
        assert_eq!(config.build.src, PathBuf::from("/project/web"));
        assert_eq!(config.build.public, PathBuf::from("/project/static"));
        // untouched roots keep defaults
        assert_eq!(config.build.temp, PathBuf::from("/project/temp"));
    }

    #[test]
    fn test_absolute_root_kept_as_is() {
        let config = test_parse_config("[build]\ndist = \"/srv/www\"");
        assert_eq!(config.build.dist, PathBuf::from("/srv/www"));
    }
}
