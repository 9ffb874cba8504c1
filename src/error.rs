//! Error and diagnostic types
//!
//! Only [`CompileError`] is fatal: it is returned when the input cannot be read and
//! no parsing takes place. Everything else is a [`Diagnostic`], reported at the point
//! of detection and collected while the compile keeps going to end of input.

use crate::parser::ast::SourceLocation;
use crate::parser::lexer::TokenKind;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that abort a compile before any parsing starts (unreadable source or
/// config file)
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("cannot read source file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file '{}': {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors detected while scanning characters into tokens.
///
/// The lexer never stops on these: the offending text becomes a
/// [`TokenKind::Unknown`] token and the error is recorded as a diagnostic.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("invalid symbol '{0}'")]
    InvalidSymbol(char),

    #[error("missing closing quote in string literal")]
    MissingClosingQuote,

    #[error("new line in string literal")]
    NewLineInLiteral,

    #[error("invalid suffix on numeric literal '{0}'")]
    NumberBadSuffix(String),

    #[error("integer literal '{0}' is out of range")]
    IntegerOutOfRange(String),
}

/// Errors detected by the predictive parser
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyntaxError {
    /// Panic-mode recovery discarded a token that cannot start the production
    #[error("expected {expected}, found {found}")]
    Unexpected {
        expected: &'static str,
        found: TokenKind,
    },

    /// An exact terminal inside a production body did not match
    #[error("expected {expected}, found {found}")]
    Mismatch { expected: TokenKind, found: TokenKind },

    #[error("nesting exceeds the maximum depth of {limit}")]
    TooDeep { limit: usize },

    #[error("'{0}' outside of a loop")]
    JumpOutsideLoop(TokenKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    Lexical(LexError),
    Syntax(SyntaxError),
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Lexical(err) => write!(f, "{err}"),
            DiagnosticKind::Syntax(err) => write!(f, "{err}"),
        }
    }
}

/// One reported problem with its source position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub location: SourceLocation,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn lexical(error: LexError, location: SourceLocation) -> Self {
        Diagnostic {
            location,
            kind: DiagnosticKind::Lexical(error),
        }
    }

    pub fn syntax(error: SyntaxError, location: SourceLocation) -> Self {
        Diagnostic {
            location,
            kind: DiagnosticKind::Syntax(error),
        }
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self.kind, DiagnosticKind::Lexical(_))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error at line {}, column {}: {}",
            self.location.line, self.location.column, self.kind
        )
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::syntax(
            SyntaxError::Unexpected {
                expected: "declaration",
                found: TokenKind::RBrace,
            },
            SourceLocation::new(3, 7),
        );
        assert_eq!(
            diag.to_string(),
            "error at line 3, column 7: expected declaration, found '}'"
        );
    }

    #[test]
    fn test_io_error_display() {
        let err = CompileError::Io {
            path: PathBuf::from("missing.crs"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(
            err.to_string(),
            "cannot read source file 'missing.crs': not found"
        );
    }
}
