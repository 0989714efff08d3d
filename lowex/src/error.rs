//! Error types for the conversion pipeline
//!
//! This module provides error handling using the `thiserror` crate.
//! Errors are categorized by their source: lexing, parsing, or reference
//! resolution. Lossy but recoverable conversions are never errors; they are
//! reported as [`Diagnostic`](crate::diagnostic::Diagnostic)s instead.

use thiserror::Error;

/// The main error type for a conversion run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// The origin pattern could not be parsed
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A backreference or subexpression call names no existing group
    #[error("unresolvable reference `{reference}` at {span}")]
    UnresolvableReference {
        /// The reference as written in the origin dialect
        reference: String,
        /// Location of the reference in the source pattern
        span: Span,
    },
}

/// Specific kinds of lexer errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexerErrorKind {
    /// Encountered an unexpected character
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    /// A backslash at the very end of the pattern
    #[error("trailing backslash")]
    TrailingBackslash,

    /// Invalid escape sequence
    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),

    /// Invalid group name
    #[error("invalid group name '{0}'")]
    InvalidGroupName(String),

    /// Malformed `\k<...>` or `\g<...>` reference
    #[error("invalid reference '{0}'")]
    InvalidReference(String),

    /// Syntax the origin dialect has but this converter does not accept
    #[error("unsupported syntax: {0}")]
    UnsupportedSyntax(&'static str),
}

/// Errors that occur during parsing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Errors that occur during lexing/tokenization
    #[error("lexer error at position {position}: {kind}")]
    Lexer {
        /// Byte offset in the input where the error occurred
        position: usize,
        /// The specific kind of lexer error
        kind: LexerErrorKind,
    },

    /// Unexpected token encountered
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        /// What was expected
        expected: String,
        /// What was actually found
        found: String,
    },

    /// Unexpected end of input
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// Character class was never closed
    #[error("unclosed character class")]
    UnclosedCharacterClass,

    /// Character class range with its bounds out of order
    #[error("invalid character class range '{0}-{1}'")]
    InvalidClassRange(char, char),

    /// Invalid quantifier
    #[error("invalid quantifier: {0}")]
    InvalidQuantifier(String),
}

/// A span representing a byte range in the source pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    /// Start position (inclusive)
    pub start: usize,
    /// End position (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Create a span for a single character
    pub fn single(pos: usize) -> Self {
        Span {
            start: pos,
            end: pos + 1,
        }
    }

    /// Get the length of the span
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;
