//! Diagnostics and I/O failure types.
//!
//! Two families, matching how the front end actually fails:
//! [`IoError`] aborts processing of the current file (can't open source or
//! output); [`Diagnostic`] is reported and compilation continues — the
//! parser never unwinds on a syntactic or semantic problem.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: usize,
    pub col: usize,
}

impl Span {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("can't open source file {path}: {source}")]
    OpenSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("can't open output file {path}: {source}")]
    OpenOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("write error on output file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One entry from the §7 error taxonomy. Never aborts parsing; the parser
/// records one of these and keeps going with the lookahead it already has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Syntactic,
    Redeclaration,
    UndeclaredIdentifier,
    SemanticConstraint,
    IncompleteFeature,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }

    pub fn syntactic(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticKind::Syntactic, message, span)
    }

    pub fn redeclaration(name: &str, span: Span) -> Self {
        Self::new(
            DiagnosticKind::Redeclaration,
            format!("redeclaration of '{name}'"),
            span,
        )
    }

    pub fn undeclared(name: &str, span: Span) -> Self {
        Self::new(
            DiagnosticKind::UndeclaredIdentifier,
            format!("'{name}' undeclared"),
            span,
        )
    }

    pub fn semantic(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticKind::SemanticConstraint, message, span)
    }

    pub fn incomplete(message: impl Into<String>, span: Span) -> Self {
        Self::new(DiagnosticKind::IncompleteFeature, message, span)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error ({}): {}", self.span, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display_includes_position() {
        let d = Diagnostic::syntactic("expected ';'", Span::new(3, 7));
        assert_eq!(d.to_string(), "error (3:7): expected ';'");
    }
}
