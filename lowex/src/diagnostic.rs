//! Diagnostics for lossy conversions

use std::fmt;

use crate::error::Span;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Severity {
    /// The emitted pattern is valid but does not match exactly what the source matched
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// A note about a construct that could not be converted faithfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// How serious the loss is
    pub severity: Severity,
    /// Human-readable description naming the unsupported feature
    pub message: String,
    /// Where the construct sits in the source pattern, when known
    pub span: Option<Span>,
}

impl Diagnostic {
    /// Create a warning
    pub fn warning(message: impl Into<String>, span: Option<Span>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(span) = self.span {
            write!(f, " (at {})", span)?;
        }
        Ok(())
    }
}
