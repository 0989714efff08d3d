//! Conversion pipeline
//!
//! Converts an origin-dialect tree (or pattern string) into ECMAScript
//! `RegExp` source: first pass, second pass, then rendering.

use crate::ast::Expr;
use crate::context::{CaptureGroup, Context};
use crate::converter::convert_node;
use crate::diagnostic::Diagnostic;
use crate::error::Result;
use crate::options::ConvertOptions;
use crate::parser::parse;
use crate::second_pass;

/// Outcome of a successful conversion
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// The emitted pattern
    pub pattern: String,
    /// Lossy conversions, in the order they were found
    pub diagnostics: Vec<Diagnostic>,
    /// Every capture group of the emitted pattern, in ordinal order
    pub groups: Vec<CaptureGroup>,
}

impl Conversion {
    /// Whether the emitted pattern is an exact equivalent
    pub fn is_lossless(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Convert an origin tree with default options
///
/// # Example
/// ```
/// use lowex::{Expr, convert};
///
/// let tree = Expr::atomic_group(Expr::text("ab"));
/// let result = convert(&tree).unwrap();
/// assert_eq!(result.pattern, "(?=(ab))\\1(?:)");
/// ```
pub fn convert(expr: &Expr) -> Result<Conversion> {
    convert_with(expr, &ConvertOptions::default())
}

/// Convert an origin tree
pub fn convert_with(expr: &Expr, options: &ConvertOptions) -> Result<Conversion> {
    let mut ctx = Context::new();
    let first = convert_node(expr, &mut ctx)?;
    log::debug!("first pass opened {} groups", ctx.group_count());

    let tree = second_pass::run(&first, &mut ctx, options)?;
    let pattern = tree.to_string();
    let (groups, diagnostics) = ctx.into_parts();

    Ok(Conversion {
        pattern,
        diagnostics,
        groups,
    })
}

/// Parse and convert a pattern
///
/// # Example
/// ```
/// use lowex::transpile;
///
/// let result = transpile("(a)(b)(c)\\k<-1>").unwrap();
/// assert_eq!(result.pattern, "(a)(b)(c)\\3");
/// ```
pub fn transpile(input: &str) -> Result<Conversion> {
    transpile_with(input, &ConvertOptions::default())
}

/// Parse and convert a pattern with explicit options
pub fn transpile_with(input: &str, options: &ConvertOptions) -> Result<Conversion> {
    let ast = parse(input)?;
    convert_with(&ast, options)
}

/// Transpile with verbose output for debugging
pub fn transpile_debug(input: &str) -> Result<TranspileResult> {
    transpile_debug_with(input, &ConvertOptions::default())
}

/// Transpile with verbose output, using explicit options
pub fn transpile_debug_with(input: &str, options: &ConvertOptions) -> Result<TranspileResult> {
    let ast = parse(input)?;
    let conversion = convert_with(&ast, options)?;

    Ok(TranspileResult {
        input: input.to_string(),
        ast: format!("{:?}", ast),
        output: conversion.pattern,
        diagnostics: conversion.diagnostics,
    })
}

/// Result of a transpilation with debug information
#[derive(Debug, Clone)]
pub struct TranspileResult {
    /// The original input pattern
    pub input: String,
    /// The AST representation (debug format)
    pub ast: String,
    /// The transpiled output
    pub output: String,
    /// Lossy conversions
    pub diagnostics: Vec<Diagnostic>,
}

impl TranspileResult {
    /// Print a formatted report of the transpilation
    pub fn report(&self) {
        println!("Transpilation Report");
        println!("====================");
        println!("Input:  {}", self.input);
        println!("AST:    {}", self.ast);
        println!("Output: {}", self.output);
        for diagnostic in &self.diagnostics {
            println!("        {}", diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Reference;
    use crate::context::Origin;
    use crate::error::ConvertError;

    #[test]
    fn test_transpile_literals() {
        let result = transpile("abc").unwrap();
        assert_eq!(result.pattern, "abc");
        assert!(result.is_lossless());
    }

    #[test]
    fn test_transpile_empty() {
        assert_eq!(transpile("").unwrap().pattern, "");
    }

    #[test]
    fn test_named_groups_are_emitted_unnamed() {
        let result = transpile("(?<first>a)(?'second'b)\\k<first>\\k'second'").unwrap();
        assert_eq!(result.pattern, "(a)(b)\\1\\2");
        assert_eq!(result.groups[0].name.as_deref(), Some("first"));
        assert_eq!(result.groups[1].name.as_deref(), Some("second"));
    }

    #[test]
    fn test_group_table() {
        let result = transpile("(?>a)(b)").unwrap();
        let origins: Vec<_> = result.groups.iter().map(|g| g.origin).collect();
        assert_eq!(origins, vec![Origin::Synthetic, Origin::Original]);
        assert_eq!(result.groups[1].source_index, Some(1));
    }

    #[test]
    fn test_convert_does_not_need_parser() {
        let tree = Expr::sequence(vec![
            Expr::group(Expr::literal('a')),
            Expr::subexp_call(Reference::Absolute(1)),
        ]);
        assert_eq!(convert(&tree).unwrap().pattern, "(a)(?:a)");
    }

    #[test]
    fn test_conversion_is_deterministic() {
        let pattern = "(a\\g<2>)(?>b|c)(d\\g<1>)?\\k<-1>";
        let first = transpile(pattern).unwrap();
        let second = transpile(pattern).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_transpile_error() {
        assert!(matches!(transpile("(abc"), Err(ConvertError::Parse(_))));
        assert!(matches!(
            transpile("\\k<missing>"),
            Err(ConvertError::UnresolvableReference { .. })
        ));
    }

    #[test]
    fn test_transpile_with_options() {
        let options = ConvertOptions::default().with_max_inline_depth(0);
        let result = transpile_with("(a)\\g<1>", &options).unwrap();
        assert_eq!(result.pattern, "(a)");
        assert_eq!(result.diagnostics.len(), 1);
    }

    #[test]
    fn test_transpile_debug() {
        let result = transpile_debug("(a|\\g<0>)").unwrap();
        assert_eq!(result.input, "(a|\\g<0>)");
        assert_eq!(result.output, "(a)");
        assert!(result.ast.contains("SubexpCall"));
        assert_eq!(result.diagnostics.len(), 1);
    }
}
