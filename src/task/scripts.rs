//! Scripts task: ES-next -> broadly-compatible JS into the intermediate root.

use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::Path;

use oxc::allocator::Allocator;
use oxc::codegen::Codegen;
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::transformer::{TransformOptions, Transformer};

use super::{Category, TaskReport, collect_inputs, output_path};
use crate::config::BuildConfig;
use crate::context::PageContext;
use crate::utils::path::ensure_parent;

/// Syntax target for transpilation.
const TARGET: &str = "es2015";

/// Translate every matched script to the compatibility target. Parse and
/// transform errors abort the task; minification happens later in the bundler.
pub fn run(config: &BuildConfig, _ctx: &PageContext) -> Result<TaskReport> {
    let inputs = collect_inputs(config, Category::Scripts)?;

    for input in &inputs {
        let source = fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))?;
        let code = transpile(&source, input)
            .with_context(|| format!("failed to transpile {}", input.display()))?;

        let output = output_path(config, Category::Scripts, input)?;
        ensure_parent(&output)?;
        fs::write(&output, code)
            .with_context(|| format!("failed to write {}", output.display()))?;
    }

    Ok(TaskReport {
        files: inputs.len(),
    })
}

/// Source-to-source translation: parse, build scoping, lower to the target,
/// regenerate. Output is unminified.
pub fn transpile(source: &str, source_path: &Path) -> Result<String> {
    let allocator = Allocator::default();
    let source_type = SourceType::mjs();

    let parsed = Parser::new(&allocator, source, source_type).parse();
    if !parsed.errors.is_empty() {
        let messages: Vec<String> = parsed.errors.iter().map(ToString::to_string).collect();
        return Err(anyhow!("syntax error: {}", messages.join("; ")));
    }
    let mut program = parsed.program;

    let scoping = SemanticBuilder::new()
        .build(&program)
        .semantic
        .into_scoping();

    let options = TransformOptions::from_target(TARGET).map_err(|e| anyhow!(e))?;
    let result =
        Transformer::new(&allocator, source_path, &options).build_with_scoping(scoping, &mut program);
    if !result.errors.is_empty() {
        let messages: Vec<String> = result.errors.iter().map(ToString::to_string).collect();
        return Err(anyhow!("transform error: {}", messages.join("; ")));
    }

    Ok(Codegen::new().build(&program).code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_transpile_exponentiation() {
        let out = transpile("const x = 2 ** 8;\n", Path::new("a.js")).unwrap();
        // post-es2015 syntax is lowered to the target
        assert!(out.contains("Math.pow"), "expected lowering, got: {out}");
        assert!(!out.contains("**"));
    }

    #[test]
    fn test_transpile_keeps_target_syntax() {
        // arrow functions are part of the target and survive untouched
        let out = transpile("const f = () => 1;\n", Path::new("a.js")).unwrap();
        assert!(out.contains("=>"));
    }

    #[test]
    fn test_transpile_syntax_error() {
        assert!(transpile("const = ;", Path::new("bad.js")).is_err());
    }

    #[test]
    fn test_transpile_plain_code_passes_through() {
        let out = transpile("var x = 1;\n", Path::new("plain.js")).unwrap();
        assert!(out.contains("var x = 1"));
    }
}
