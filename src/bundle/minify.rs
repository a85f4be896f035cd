//! Minification for JS, CSS and HTML.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. HTML minification is a
//! whitespace collapse that leaves raw-text elements intact and minifies
//! inline `<style>`/`<script>` bodies.

use std::sync::LazyLock;

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use regex::Regex;

/// Minify JavaScript source code.
pub fn minify_js(source: &str) -> Option<String> {
    let allocator = Allocator::default();
    let source_type = SourceType::mjs();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        return None;
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Some(code)
}

/// Minify CSS source code.
pub fn minify_css(source: &str) -> Option<String> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default()).ok()?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .ok()?;
    Some(result.code)
}

// ============================================================================
// HTML minification
// ============================================================================

/// Elements whose text content must not be whitespace-collapsed.
static RAW_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(script|style|pre|textarea)\b[^>]*>").expect("raw-tag regex is valid")
});

/// Minify an HTML page: collapse whitespace outside raw-text elements,
/// minify inline styles and scripts in place.
///
/// Inline minification falls back to the original body when the content does
/// not parse (e.g. a templating leftover); the page itself never fails.
pub fn minify_html(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;

    for m in RAW_OPEN_RE.captures_iter(source) {
        let open = m.get(0).expect("capture 0 always present");
        if open.start() < cursor {
            // open-like token inside a previous raw element's content
            continue;
        }
        let name = m[1].to_ascii_lowercase();

        collapse_into(&mut out, &source[cursor..open.start()]);
        out.push_str(open.as_str());

        let content_start = open.end();
        let closer = format!("</{name}");
        match source[content_start..].to_ascii_lowercase().find(&closer) {
            Some(rel) => {
                let content = &source[content_start..content_start + rel];
                match name.as_str() {
                    "style" => out
                        .push_str(&minify_css(content).unwrap_or_else(|| content.to_string())),
                    "script" if !content.trim().is_empty() => out
                        .push_str(&minify_js(content).unwrap_or_else(|| content.to_string())),
                    _ => out.push_str(content),
                }
                // close tag through its '>'
                let close_end = source[content_start + rel..]
                    .find('>')
                    .map_or(source.len(), |p| content_start + rel + p + 1);
                out.push_str(&source[content_start + rel..close_end]);
                cursor = close_end;
            }
            None => {
                // unterminated raw element, leave the rest untouched
                cursor = content_start;
            }
        }
    }

    collapse_into(&mut out, &source[cursor..]);
    out
}

/// Collapse whitespace in text nodes only. Tags are copied verbatim
/// (attribute values keep their spacing, quoted `>` does not end a tag);
/// whitespace-only text between tags is dropped, runs inside text collapse
/// to a single space.
fn collapse_into(out: &mut String, segment: &str) {
    let mut text = String::new();
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        if c == '<' {
            flush_text(out, &text);
            text.clear();
            out.push('<');
            let mut quote: Option<char> = None;
            for c in chars.by_ref() {
                out.push(c);
                match quote {
                    Some(q) if c == q => quote = None,
                    Some(_) => {}
                    None if c == '"' || c == '\'' => quote = Some(c),
                    None if c == '>' => break,
                    None => {}
                }
            }
        } else {
            text.push(c);
        }
    }
    flush_text(out, &text);
}

/// Emit a text node with whitespace runs collapsed; whitespace-only nodes
/// vanish entirely.
fn flush_text(out: &mut String, text: &str) {
    if text.trim().is_empty() {
        return;
    }
    let mut in_ws = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_ws {
                out.push(' ');
            }
            in_ws = true;
        } else {
            in_ws = false;
            out.push(c);
        }
    }
}
