//! Lowex
//!
//! Converts Onigmo-style regular expressions into ECMAScript `RegExp` source.
//! Atomic groups and possessive quantifiers are emulated with synthetic
//! capture groups; backreferences are renumbered so they keep pointing at the
//! groups the author meant; subexpression calls are inlined.

pub mod ast;
pub mod context;
pub mod converter;
pub mod diagnostic;
pub mod error;
pub mod lexer;
pub mod node;
pub mod options;
pub mod parser;
pub mod second_pass;
pub mod transpiler;

pub use ast::{Expr, Quantifier, QuantifierMode, Reference, RepeatKind};
pub use context::{CaptureGroup, Context, Origin};
pub use diagnostic::{Diagnostic, Severity};
pub use error::{ConvertError, LexerErrorKind, ParseError, Result, Span};
pub use lexer::{Lexer, Token};
pub use node::{GroupRef, LookKind, Node};
pub use options::{ConvertOptions, DEFAULT_MAX_INLINE_DEPTH, DEFAULT_MAX_INLINED_NODES};
pub use parser::{Parser, parse};
pub use transpiler::{
    Conversion, TranspileResult, convert, convert_with, transpile, transpile_debug,
    transpile_debug_with, transpile_with,
};
