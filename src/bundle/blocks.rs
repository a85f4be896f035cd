//! Build-block parsing.
//!
//! Rendered pages mark bundle boundaries with comment pairs:
//!
//! ```html
//! <!-- build:css assets/styles/vendor.css -->
//! <link rel="stylesheet" href="/node_modules/bootstrap/dist/css/bootstrap.css">
//! <!-- endbuild -->
//! <!-- build:js assets/scripts/main.js -->
//! <script src="assets/scripts/main.js"></script>
//! <!-- endbuild -->
//! ```
//!
//! Each block names a bundle target and wraps the tags whose referenced files
//! get concatenated into it.

use regex::Regex;
use std::sync::LazyLock;

static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<!--\s*build:(css|js)\s+([^\s>]+)\s*-->(.*?)<!--\s*endbuild\s*-->")
        .expect("block regex is valid")
});

static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#).expect("href regex is valid"));

static SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)src\s*=\s*["']([^"']+)["']"#).expect("src regex is valid"));

/// Bundle kind, dispatched purely on the block's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Css,
    Js,
}

/// One parsed build block.
#[derive(Debug)]
pub struct BuildBlock {
    pub kind: BlockKind,
    /// Bundle output path, relative to the distribution root.
    pub target: String,
    /// Referenced source files, in document order.
    pub refs: Vec<String>,
    /// Byte span of the whole block in the page, for replacement.
    pub span: (usize, usize),
}

impl BuildBlock {
    /// The single tag that replaces the block after bundling.
    pub fn replacement_tag(&self) -> String {
        match self.kind {
            BlockKind::Css => format!("<link rel=\"stylesheet\" href=\"{}\">", self.target),
            BlockKind::Js => format!("<script src=\"{}\"></script>", self.target),
        }
    }
}

/// Parse every build block in a page, in document order.
pub fn parse_blocks(html: &str) -> Vec<BuildBlock> {
    BLOCK_RE
        .captures_iter(html)
        .map(|cap| {
            let whole = cap.get(0).expect("capture 0 always present");
            let kind = match &cap[1].to_ascii_lowercase()[..] {
                "css" => BlockKind::Css,
                _ => BlockKind::Js,
            };
            let body = &cap[3];
            let refs_re = match kind {
                BlockKind::Css => &*HREF_RE,
                BlockKind::Js => &*SRC_RE,
            };
            let refs = refs_re
                .captures_iter(body)
                .map(|r| r[1].to_string())
                .collect();

            BuildBlock {
                kind,
                target: cap[2].trim_start_matches('/').to_string(),
                refs,
                span: (whole.start(), whole.end()),
            }
        })
        .collect()
}
