//! # Introduction
//!
//! crustc is the front end of Crust, a small statically typed language. It parses
//! source text with a predictive recursive descent parser and produces
//! three-address code (TAC) while it builds the syntax tree, so the finished tree
//! already holds the compiled program.
//!
//! ## Compilation pipeline
//!
//! ```text
//! Source → Lexer → Parser (+ TAC emission) → Syntax tree with code → Quads
//! ```
//!
//! 1. [`parser`]: tokenises the source, parses it with panic-mode error
//!    recovery, and builds the tree. Every [`Node`] carries the quadruples of its
//!    subtree.
//! 2. [`tac`]: the instruction model ([`tac::Quad`], [`tac::Address`]) and the
//!    temporary and label allocator.
//! 3. [`error`]: fatal errors and the [`Diagnostic`]s collected while parsing.
//! 4. [`config`]: depth limit and mismatch recovery policy.
//!
//! A compile never stops at the first problem: it runs to end of input and
//! returns the best-effort program together with every diagnostic.
//!
//! ```
//! let compilation = crustc::compile("fn main() i32 { foo(1, 2); return 0; }");
//! assert!(compilation.diagnostics.is_empty());
//! assert_eq!(compilation.code()[0].to_string(), "| FUNC | - | - | main |");
//! ```
//!
//! No semantic analysis or optimization is attempted: the TAC is the final artifact.

pub mod config;
pub mod error;
pub mod parser;
pub mod tac;

use std::path::Path;

pub use config::{MismatchRecovery, ParserConfig};
pub use error::{CompileError, Diagnostic, DiagnosticKind, LexError, SyntaxError};
pub use parser::ast::{Node, NodeKind, SourceLocation};
pub use parser::lexer::{Lexer, Token, TokenKind, TokenSource, TokenValue};
pub use parser::parse::Parser;

/// Result of one compile: the program tree and everything reported along the way
#[derive(Debug, Clone)]
pub struct Compilation {
    pub program: Node,
    /// Lexical and syntax diagnostics, ordered by source location
    pub diagnostics: Vec<Diagnostic>,
}

impl Compilation {
    /// The compiled program's quadruples
    pub fn code(&self) -> &[tac::Quad] {
        &self.program.code
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

pub fn compile(source: &str) -> Compilation {
    compile_with(source, &ParserConfig::default())
}

pub fn compile_with(source: &str, config: &ParserConfig) -> Compilation {
    Parser::with_config(source, config.clone()).parse()
}

/// Compile a file. Failing to read it is the only fatal error.
pub fn compile_file(path: impl AsRef<Path>, config: &ParserConfig) -> Result<Compilation, CompileError> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "compiling file");
    Ok(Parser::from_path(path, config.clone())?.parse())
}
