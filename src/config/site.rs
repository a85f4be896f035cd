//! `[site]` section: content rendered into page templates.
//!
//! This is static site content bound into the build - the navigation menu and
//! package metadata that templates interpolate. It is loaded once at startup
//! and handed to the page task as part of an immutable `PageContext`, never as
//! ambient global state.
//!
//! # Example
//!
//! ```toml
//! [site]
//! name = "my-site"
//! version = "1.0.0"
//!
//! [[site.menus]]
//! name = "Home"
//! icon = "aperture"
//! link = "index.html"
//!
//! [[site.menus]]
//! name = "Contact"
//! link = "#"
//!
//! [[site.menus.children]]
//! name = "Twitter"
//! link = "https://twitter.com/example"
//! ```

use serde::{Deserialize, Serialize};

/// Site content: package metadata and navigation menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Package name, rendered as `{{ pkg.name }}`.
    pub name: String,

    /// Package version, rendered as `{{ pkg.version }}`.
    pub version: String,

    /// Optional site URL.
    pub url: Option<String>,

    /// Optional description.
    pub description: Option<String>,

    /// Navigation menu tree, rendered as `{% for menu in menus %}`.
    pub menus: Vec<MenuItem>,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            name: "pagewright-site".into(),
            version: "0.1.0".into(),
            url: None,
            description: None,
            menus: Vec::new(),
        }
    }
}

/// One navigation entry, optionally with a nested dropdown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuItem {
    pub name: String,
    pub icon: Option<String>,
    pub link: Option<String>,
    pub children: Vec<MenuItem>,
}
