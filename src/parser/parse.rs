//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure:
//! token handling, panic-mode recovery, the nesting guard, and node construction.
//!
//! # Parser Architecture
//!
//! The Parser is a predictive (LL(1)) recursive descent parser:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: Program, variable and function declarations, types
//! - `statements`: Blocks, conditionals, loops, return and jump statements
//! - `expressions`: Expressions, terms, calls and subscripts
//!
//! # Recovery
//!
//! Every `parse_X` method starts by discarding tokens that cannot begin `X`
//! (one diagnostic per token) until a member of [`first_set`] or end of input is
//! reached. Every method returns a node: an epsilon production yields a childless
//! node of its own kind, and a production cut short by end of input yields an
//! [`NodeKind::Error`] placeholder.
//!
//! # Code Generation
//!
//! Three-address code is assembled while nodes are built. Each node's `code`
//! is its children's code in source order plus whatever it emits itself.

use crate::config::{MismatchRecovery, ParserConfig};
use crate::error::{CompileError, Diagnostic, SyntaxError};
use crate::parser::ast::*;
use crate::parser::first::first_set;
use crate::parser::lexer::{Lexer, Token, TokenKind, TokenSource};
use crate::tac::{Address, Emitter, Quad};
use crate::Compilation;
use std::path::Path;

/// Jump targets of the innermost enclosing loop
#[derive(Debug, Clone)]
pub(crate) struct LoopLabels {
    pub continue_label: Address,
    pub break_label: Address,
}

/// Recursive descent parser for Crust
pub struct Parser<S: TokenSource = Lexer> {
    pub(crate) source: S,
    pub(crate) current: Token,
    pub(crate) emitter: Emitter,
    pub(crate) loops: Vec<LoopLabels>,
    next_uid: NodeId,
    depth: usize,
    /// Set once a depth overflow is reported, cleared when nesting unwinds
    overflowed: bool,
    config: ParserConfig,
    diagnostics: Vec<Diagnostic>,
}

impl Parser<Lexer> {
    pub fn new(source: &str) -> Self {
        Self::with_config(source, ParserConfig::default())
    }

    pub fn with_config(source: &str, config: ParserConfig) -> Self {
        Parser::from_source(Lexer::new(source), config)
    }

    /// Open a source file. An unreadable file is fatal and nothing is parsed.
    pub fn from_path(path: impl AsRef<Path>, config: ParserConfig) -> Result<Self, CompileError> {
        Ok(Parser::from_source(Lexer::from_path(path)?, config))
    }
}

impl<S: TokenSource> Parser<S> {
    pub fn from_source(mut source: S, config: ParserConfig) -> Self {
        let current = source.next_token();
        Self {
            source,
            current,
            emitter: Emitter::new(),
            loops: Vec::new(),
            next_uid: 0,
            depth: 0,
            overflowed: false,
            config,
            diagnostics: Vec::new(),
        }
    }

    /// Parse the whole input and collect every diagnostic, ordered by location
    pub fn parse(mut self) -> Compilation {
        tracing::debug!(max_depth = self.config.max_depth, "parsing program");
        let program = self.parse_program();

        let mut diagnostics = self.source.take_diagnostics();
        diagnostics.append(&mut self.diagnostics);
        diagnostics.sort_by_key(|d| d.location);

        tracing::debug!(
            nodes = self.next_uid,
            quads = program.code.len(),
            temps = self.emitter.temps_allocated(),
            labels = self.emitter.labels_allocated(),
            diagnostics = diagnostics.len(),
            "parsed program"
        );
        Compilation {
            program,
            diagnostics,
        }
    }

    /// Parser diagnostics reported so far (lexical ones are collected by [`Parser::parse`])
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    // ===== Helper methods =====

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Kind of the token after the current one, without consuming anything
    pub(crate) fn peek_kind(&mut self) -> TokenKind {
        self.source.peek_token().kind
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.current.location
    }

    pub(crate) fn advance(&mut self) -> Token {
        let next = self.source.next_token();
        std::mem::replace(&mut self.current, next)
    }

    pub(crate) fn report(&mut self, error: SyntaxError, location: SourceLocation) {
        self.diagnostics.push(Diagnostic::syntax(error, location));
    }

    fn next_uid(&mut self) -> NodeId {
        let uid = self.next_uid;
        self.next_uid += 1;
        uid
    }

    /// Build a node whose code is its children's code in order, followed by `own`
    pub(crate) fn node(
        &mut self,
        kind: NodeKind,
        location: SourceLocation,
        children: Vec<Node>,
        own: Vec<Quad>,
    ) -> Node {
        let mut code: Vec<Quad> = children.iter().flat_map(|c| c.code.iter().cloned()).collect();
        code.extend(own);
        self.node_with_code(kind, location, children, code)
    }

    /// Build a node with explicitly assembled code
    pub(crate) fn node_with_code(
        &mut self,
        kind: NodeKind,
        location: SourceLocation,
        children: Vec<Node>,
        code: Vec<Quad>,
    ) -> Node {
        let uid = self.next_uid();
        Node::new(uid, kind, location, children, code)
    }

    /// Childless node: the empty alternative of a nullable production
    pub(crate) fn epsilon(&mut self, kind: NodeKind) -> Node {
        let location = self.current_location();
        self.node_with_code(kind, location, Vec::new(), Vec::new())
    }

    pub(crate) fn error_node(&mut self) -> Node {
        self.epsilon(NodeKind::Error)
    }

    /// Consume the current token as a leaf
    pub(crate) fn leaf(&mut self) -> Node {
        let token = self.advance();
        let uid = self.next_uid();
        Node::leaf(uid, token)
    }

    /// Consume an exact terminal.
    ///
    /// On mismatch a diagnostic is reported and the configured [`MismatchRecovery`]
    /// decides which token stands in for the expected one.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Node {
        if self.check(kind) {
            return self.leaf();
        }

        let location = self.current_location();
        self.report(
            SyntaxError::Mismatch {
                expected: kind,
                found: self.current.kind,
            },
            location,
        );

        match self.config.mismatch {
            MismatchRecovery::Consume => self.leaf(),
            MismatchRecovery::Resync => {
                if self.peek_kind() == kind {
                    let dropped = self.advance();
                    tracing::trace!(token = %dropped, "dropped token before expected terminal");
                    self.leaf()
                } else {
                    let uid = self.next_uid();
                    Node::leaf(uid, Token::new(kind, location))
                }
            }
        }
    }

    /// Consume an identifier, returning the leaf and its name
    pub(crate) fn expect_identifier(&mut self) -> (Node, Option<String>) {
        let leaf = self.expect(TokenKind::Identifier);
        let name = match &leaf.token {
            Some(token) if token.kind == TokenKind::Identifier => token.text().map(str::to_string),
            _ => None,
        };
        (leaf, name)
    }

    /// Panic-mode recovery on entry to `kind`.
    ///
    /// Discards tokens outside `FIRST(kind)` with one diagnostic each. Returns false
    /// if end of input was reached instead of a starting token.
    pub(crate) fn recover(&mut self, kind: NodeKind) -> bool {
        let first = first_set(kind);
        while !self.is_at_end() && !first.contains(&self.current.kind) {
            let location = self.current_location();
            self.report(
                SyntaxError::Unexpected {
                    expected: kind.description(),
                    found: self.current.kind,
                },
                location,
            );
            let skipped = self.advance();
            tracing::trace!(production = %kind, token = %skipped, "skipped token");
        }
        !self.is_at_end()
    }

    /// Enter a nesting construct: an expression or a block. Each costs one level,
    /// so a parenthesized expression nests one level deeper than its parent.
    ///
    /// Past the configured depth the construct is skipped and a placeholder
    /// returned. Only the first overflow is reported until nesting unwinds, so a
    /// too-deep `if` whose condition and body both overflow yields one diagnostic.
    pub(crate) fn enter_nested(&mut self) -> Option<Node> {
        if self.depth < self.config.max_depth {
            self.depth += 1;
            return None;
        }

        let location = self.current_location();
        if !self.overflowed {
            self.overflowed = true;
            self.report(
                SyntaxError::TooDeep {
                    limit: self.config.max_depth,
                },
                location,
            );
        }
        self.skip_construct();
        Some(self.node_with_code(NodeKind::Error, location, Vec::new(), Vec::new()))
    }

    pub(crate) fn leave_nested(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.overflowed = false;
    }

    /// Skip one construct, balancing `()`, `[]` and `{}`. Stops before an
    /// unbalanced closer or a separator at nesting level zero.
    fn skip_construct(&mut self) {
        let mut nesting = 0usize;
        let mut first = true;
        loop {
            match self.current.kind {
                TokenKind::Eof => return,
                TokenKind::LBrace if nesting == 0 && !first => return,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => nesting += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    if nesting == 0 {
                        return;
                    }
                    nesting -= 1;
                    if nesting == 0 {
                        self.advance();
                        return;
                    }
                }
                TokenKind::SemiColon | TokenKind::Comma | TokenKind::Range if nesting == 0 => {
                    return;
                }
                _ => {}
            }
            self.advance();
            first = false;
        }
    }

    /// Copy the result of `value` into `dst`, after `value`'s own code
    pub(crate) fn assign_result(&self, value: &Node, dst: Address) -> Vec<Quad> {
        let mut code = value.code.clone();
        match value.result() {
            Some(res) => code.push(Quad::assign(res.clone(), dst)),
            None => tracing::error!(
                node = %value.kind,
                line = value.location.line,
                target = %dst,
                "value has no result address, assignment dropped"
            ),
        }
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MismatchRecovery;
    use crate::error::DiagnosticKind;

    fn syntax_errors(compilation: &Compilation) -> Vec<SyntaxError> {
        compilation
            .diagnostics
            .iter()
            .filter_map(|d| match &d.kind {
                DiagnosticKind::Syntax(err) => Some(err.clone()),
                DiagnosticKind::Lexical(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_parse_simple_function() {
        let source = "fn main() i32 { return 0; }";
        let compilation = Parser::new(source).parse();

        assert!(compilation.diagnostics.is_empty());
        let decl_list = &compilation.program.children[0];
        assert_eq!(decl_list.kind, NodeKind::DeclList);
        let decl = &decl_list.children[0];
        assert_eq!(decl.children[0].kind, NodeKind::FnDecl);
    }

    #[test]
    fn test_recovery_skips_each_bad_token() {
        let compilation = Parser::new("} ) ; i32 x;").parse();
        let errors = syntax_errors(&compilation);
        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors[0],
            SyntaxError::Unexpected {
                expected: "declaration",
                found: TokenKind::RBrace
            }
        );
        // The declaration after the garbage still parses
        let decl_list = &compilation.program.children[0];
        assert_eq!(decl_list.children.len(), 2);
    }

    #[test]
    fn test_mismatch_consume() {
        let compilation = Parser::new("i32 x = (1;").parse();
        let errors = syntax_errors(&compilation);
        // `;` stands in for `)`, leaving nothing to end the declaration
        assert_eq!(
            errors,
            vec![
                SyntaxError::Mismatch {
                    expected: TokenKind::RParen,
                    found: TokenKind::SemiColon
                },
                SyntaxError::Mismatch {
                    expected: TokenKind::SemiColon,
                    found: TokenKind::Eof
                },
            ]
        );
    }

    #[test]
    fn test_mismatch_resync_inserts_missing_terminal() {
        let config = ParserConfig {
            mismatch: MismatchRecovery::Resync,
            ..ParserConfig::default()
        };
        let compilation = Parser::with_config("i32 x = (1;", config).parse();
        assert_eq!(
            syntax_errors(&compilation),
            vec![SyntaxError::Mismatch {
                expected: TokenKind::RParen,
                found: TokenKind::SemiColon
            }]
        );
    }

    #[test]
    fn test_mismatch_resync_drops_one_token() {
        let config = ParserConfig {
            mismatch: MismatchRecovery::Resync,
            ..ParserConfig::default()
        };
        let compilation = Parser::with_config("[3 4]i32 x;", config).parse();
        assert_eq!(
            syntax_errors(&compilation),
            vec![SyntaxError::Mismatch {
                expected: TokenKind::RBracket,
                found: TokenKind::IntLiteral
            }]
        );

        // Consuming instead leaves the real `]` to be skipped
        let compilation = Parser::new("[3 4]i32 x;").parse();
        assert_eq!(
            syntax_errors(&compilation),
            vec![
                SyntaxError::Mismatch {
                    expected: TokenKind::RBracket,
                    found: TokenKind::IntLiteral
                },
                SyntaxError::Unexpected {
                    expected: "type",
                    found: TokenKind::RBracket
                },
            ]
        );
    }

    #[test]
    fn test_depth_guard_reports_once() {
        let config = ParserConfig {
            max_depth: 8,
            ..ParserConfig::default()
        };
        let nested = format!("i32 x = {}1{};", "(".repeat(20), ")".repeat(20));
        let compilation = Parser::with_config(&nested, config).parse();
        let errors = syntax_errors(&compilation);
        assert_eq!(errors, vec![SyntaxError::TooDeep { limit: 8 }]);
    }

    #[test]
    fn test_each_paren_costs_one_level() {
        let config = ParserConfig {
            max_depth: 8,
            ..ParserConfig::default()
        };
        // The initializer is one level, each parenthesized expression one more
        let fits = format!("i32 x = {}1{};", "(".repeat(7), ")".repeat(7));
        let compilation = Parser::with_config(&fits, config.clone()).parse();
        assert!(compilation.diagnostics.is_empty());

        let overflows = format!("i32 x = {}1{};", "(".repeat(8), ")".repeat(8));
        let compilation = Parser::with_config(&overflows, config).parse();
        assert_eq!(syntax_errors(&compilation), vec![SyntaxError::TooDeep { limit: 8 }]);
    }

    #[test]
    fn test_deep_if_reports_once() {
        let config = ParserConfig {
            max_depth: 4,
            ..ParserConfig::default()
        };
        // The fourth condition and its block both sit past the limit
        let source = "fn f() void { if x { if x { if x { if x { } } } } }";
        let compilation = Parser::with_config(source, config).parse();
        assert_eq!(syntax_errors(&compilation), vec![SyntaxError::TooDeep { limit: 4 }]);
        assert_eq!(compilation.diagnostics[0].location, SourceLocation::new(1, 39));
    }

    #[test]
    fn test_negation_chains_do_not_nest() {
        let config = ParserConfig {
            max_depth: 4,
            ..ParserConfig::default()
        };
        let source = format!("i32 x = {}1;", "-".repeat(1_000));
        let compilation = Parser::with_config(&source, config).parse();
        assert!(compilation.diagnostics.is_empty());
        let rows: Vec<String> = compilation.program.code.iter().map(|q| q.to_string()).collect();
        assert_eq!(rows.len(), 1_002);
        assert_eq!(rows[1_000], "| UNARY_MINUS | T999 | - | T1000 |");
    }

    #[test]
    fn test_eof_only_program() {
        let compilation = Parser::new("").parse();
        assert!(compilation.diagnostics.is_empty());
        assert_eq!(compilation.program.to_string(), "PROG_DECL(\n  DECL_LIST(\n  )\n)\n");
        assert!(compilation.program.code.is_empty());
    }
}
