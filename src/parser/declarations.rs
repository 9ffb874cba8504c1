//! Declaration parsing implementation
//!
//! This module handles the top level of a program and everything that declares a
//! name:
//!
//! - Variable declarations: `i32 x = 42, y;`
//! - Function declarations: `fn add(i32 a, i32 b) i32 { ... }`
//! - Types: primitives and fixed-size arrays such as `[3][4]f64`
//!
//! # Grammar
//!
//! ```text
//! program          → decl_list
//! decl_list        → decl decl_list | ε
//! decl             → fn_decl | var_decl ';'
//! var_decl         → type var_decl_list
//! var_decl_list    → IDENT [ '=' expression ] var_decl_list_
//! var_decl_list_   → ',' var_decl_list | ε
//! fn_decl          → 'fn' IDENT '(' fn_param_list ')' type segment
//! fn_param_list    → fn_param fn_param_list_ | ε
//! fn_param_list_   → ',' fn_param fn_param_list_ | ε
//! fn_param         → type IDENT
//! type             → PRIMITIVE | '[' INT ']' type
//! ```
//!
//! Right-recursive lists are parsed with a loop and folded back into the
//! right-nested tree the grammar describes.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::{TokenKind, TokenSource};
use crate::parser::parse::Parser;
use crate::tac::{Address, Operator, Quad};

/// One `IDENT [= expression]` declarator and the comma that followed it
struct Declarator {
    location: SourceLocation,
    parts: Vec<Node>,
    code: Vec<Quad>,
    comma: Option<Node>,
}

impl<S: TokenSource> Parser<S> {
    /// Parse the entire program (top-level declarations)
    pub fn parse_program(&mut self) -> Node {
        let location = self.current_location();
        // A program is never absent: on empty or hopeless input it holds an empty list
        self.recover(NodeKind::Program);
        let decls = self.parse_decl_list();
        self.node(NodeKind::Program, location, vec![decls], Vec::new())
    }

    pub(crate) fn parse_decl_list(&mut self) -> Node {
        let mut decls = Vec::new();
        while self.recover(NodeKind::DeclList) {
            decls.push(self.parse_decl());
        }

        let mut list = self.epsilon(NodeKind::DeclList);
        for decl in decls.into_iter().rev() {
            let location = decl.location;
            list = self.node(NodeKind::DeclList, location, vec![decl, list], Vec::new());
        }
        list
    }

    pub(crate) fn parse_decl(&mut self) -> Node {
        if !self.recover(NodeKind::Decl) {
            return self.error_node();
        }
        let location = self.current_location();

        let children = if self.check(TokenKind::KwFn) {
            vec![self.parse_fn_decl()]
        } else {
            let var_decl = self.parse_var_decl();
            let semi = self.expect(TokenKind::SemiColon);
            vec![var_decl, semi]
        };
        self.node(NodeKind::Decl, location, children, Vec::new())
    }

    pub(crate) fn parse_var_decl(&mut self) -> Node {
        if !self.recover(NodeKind::VarDecl) {
            return self.error_node();
        }
        let location = self.current_location();

        let ty = self.parse_type();
        let declarators = self.parse_var_decl_list();
        self.node(NodeKind::VarDecl, location, vec![ty, declarators], Vec::new())
    }

    /// Parse `a = 1, b, c = 2`.
    ///
    /// Each initialized declarator emits its expression code and then
    /// `ASSIGN result → name`.
    pub(crate) fn parse_var_decl_list(&mut self) -> Node {
        let mut declarators: Vec<Declarator> = Vec::new();
        // Replaces the innermost list when a declarator is cut short by end of input
        let mut truncated = None;

        loop {
            if !self.recover(NodeKind::VarDeclList) {
                truncated = Some(self.error_node());
                break;
            }
            let location = self.current_location();
            let (ident, name) = self.expect_identifier();
            let mut parts = vec![ident];
            let mut code = Vec::new();

            if self.check(TokenKind::Assign) {
                parts.push(self.leaf());
                let value = self.parse_expression();
                code = match name {
                    Some(name) => self.assign_result(&value, Address::Name(name)),
                    None => value.code.clone(),
                };
                parts.push(value);
            }

            let mut declarator = Declarator {
                location,
                parts,
                code,
                comma: None,
            };

            let more = self.recover(NodeKind::VarDeclListTail) && self.check(TokenKind::Comma);
            if more {
                declarator.comma = Some(self.leaf());
            }
            declarators.push(declarator);
            if !more {
                break;
            }
        }

        // Fold right: list_i = VAR_DECL_LIST(parts_i, VAR_DECL_LIST_(',' list_i+1))
        let mut inner = truncated;
        for declarator in declarators.into_iter().rev() {
            let tail = match (declarator.comma, inner.take()) {
                (Some(comma), Some(next)) => {
                    let location = comma.location;
                    self.node(NodeKind::VarDeclListTail, location, vec![comma, next], Vec::new())
                }
                _ => self.epsilon(NodeKind::VarDeclListTail),
            };

            let mut code = declarator.code;
            code.extend(tail.code.iter().cloned());
            let mut children = declarator.parts;
            children.push(tail);
            inner = Some(self.node_with_code(
                NodeKind::VarDeclList,
                declarator.location,
                children,
                code,
            ));
        }

        match inner {
            Some(list) => list,
            None => self.error_node(),
        }
    }

    /// Parse `fn name(params) type { body }`, emitting `FUNC → name` before the body
    pub(crate) fn parse_fn_decl(&mut self) -> Node {
        if !self.recover(NodeKind::FnDecl) {
            return self.error_node();
        }
        let location = self.current_location();

        let fn_kw = self.expect(TokenKind::KwFn);
        let (ident, name) = self.expect_identifier();
        let lparen = self.expect(TokenKind::LParen);
        let params = self.parse_fn_param_list();
        let rparen = self.expect(TokenKind::RParen);
        let ret_ty = self.parse_type();

        // Loop labels never cross a function boundary
        let outer_loops = std::mem::take(&mut self.loops);
        let body = self.parse_segment();
        self.loops = outer_loops;

        let mut code = Vec::with_capacity(body.code.len() + 1);
        match name {
            Some(name) => code.push(Quad::new(
                Operator::Func,
                None,
                None,
                Some(Address::Name(name)),
            )),
            None => tracing::error!(line = location.line, "function without a name, entry dropped"),
        }
        code.extend(body.code.iter().cloned());

        self.node_with_code(
            NodeKind::FnDecl,
            location,
            vec![fn_kw, ident, lparen, params, rparen, ret_ty, body],
            code,
        )
    }

    pub(crate) fn parse_fn_param_list(&mut self) -> Node {
        if !self.recover(NodeKind::FnParamList) || self.check(TokenKind::RParen) {
            return self.epsilon(NodeKind::FnParamList);
        }
        let location = self.current_location();

        let param = self.parse_fn_param();
        let tail = self.parse_fn_param_list_tail();
        self.node(NodeKind::FnParamList, location, vec![param, tail], Vec::new())
    }

    pub(crate) fn parse_fn_param_list_tail(&mut self) -> Node {
        let mut params = Vec::new();
        while self.recover(NodeKind::FnParamListTail) && self.check(TokenKind::Comma) {
            let comma = self.leaf();
            let param = self.parse_fn_param();
            params.push((comma, param));
        }

        let mut tail = self.epsilon(NodeKind::FnParamListTail);
        for (comma, param) in params.into_iter().rev() {
            let location = comma.location;
            tail = self.node(
                NodeKind::FnParamListTail,
                location,
                vec![comma, param, tail],
                Vec::new(),
            );
        }
        tail
    }

    pub(crate) fn parse_fn_param(&mut self) -> Node {
        if !self.recover(NodeKind::FnParam) {
            return self.error_node();
        }
        let location = self.current_location();

        let ty = self.parse_type();
        let (ident, _) = self.expect_identifier();
        self.node(NodeKind::FnParam, location, vec![ty, ident], Vec::new())
    }

    /// Parse a type. Array prefixes are collected iteratively, innermost type last.
    pub(crate) fn parse_type(&mut self) -> Node {
        let mut prefixes = Vec::new();

        let mut ty = loop {
            if !self.recover(NodeKind::Type) {
                break self.error_node();
            }
            let location = self.current_location();

            if self.current.kind.is_primitive_type() {
                let primitive = self.leaf();
                break self.node(NodeKind::Type, location, vec![primitive], Vec::new());
            }

            let lbracket = self.expect(TokenKind::LBracket);
            let size = self.expect(TokenKind::IntLiteral);
            let rbracket = self.expect(TokenKind::RBracket);
            prefixes.push((location, [lbracket, size, rbracket]));
        };

        for (location, [lbracket, size, rbracket]) in prefixes.into_iter().rev() {
            ty = self.node(
                NodeKind::Type,
                location,
                vec![lbracket, size, rbracket, ty],
                Vec::new(),
            );
        }
        ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tac::render_table;

    fn parser(source: &str) -> Parser {
        Parser::new(source)
    }

    #[test]
    fn test_parse_var_decl_shape() {
        let mut parser = parser("i32 x = 5;");
        let decl = parser.parse_var_decl();

        assert_eq!(decl.kind, NodeKind::VarDecl);
        assert_eq!(decl.children[0].kind, NodeKind::Type);
        let list = &decl.children[1];
        assert_eq!(list.kind, NodeKind::VarDeclList);
        assert_eq!(list.children[0].text(), Some("x"));
        assert_eq!(list.children[1].name(), "ASSIGN");
        assert_eq!(list.children[2].kind, NodeKind::Expression);
        assert!(list.children[3].is_empty());
        assert!(parser.check(TokenKind::SemiColon));
    }

    #[test]
    fn test_var_decl_list_code() {
        let mut parser = parser("i32 a = 1, b, c = 2;");
        let decl = parser.parse_var_decl();
        assert_eq!(
            render_table(&decl.code),
            "| op | arg1 | arg2 | res |\n\
             | ASSIGN | 1 | - | T0 |\n\
             | ASSIGN | T0 | - | a |\n\
             | ASSIGN | 2 | - | T1 |\n\
             | ASSIGN | T1 | - | c |\n"
        );
    }

    #[test]
    fn test_var_decl_list_nests_right() {
        let mut parser = parser("i32 a, b;");
        let list = parser.parse_var_decl_list();
        assert_eq!(list.children[0].text(), Some("a"));
        let tail = &list.children[1];
        assert_eq!(tail.kind, NodeKind::VarDeclListTail);
        assert_eq!(tail.children[0].name(), "COMMA");
        let inner = &tail.children[1];
        assert_eq!(inner.children[0].text(), Some("b"));
        assert!(inner.children[1].is_empty());
    }

    #[test]
    fn test_array_type_nests_right() {
        let mut parser = parser("[3][4]f64 grid;");
        let ty = parser.parse_type();
        assert_eq!(ty.children.len(), 4);
        assert_eq!(ty.children[1].name(), "INT_LITERAL");
        let inner = &ty.children[3];
        assert_eq!(inner.children.len(), 4);
        assert_eq!(inner.children[3].children[0].name(), "KW_F64");
        assert!(parser.diagnostics().is_empty());
    }

    #[test]
    fn test_empty_param_list_consumes_nothing() {
        let mut parser = parser(")");
        let params = parser.parse_fn_param_list();
        assert_eq!(params.kind, NodeKind::FnParamList);
        assert!(params.is_empty());
        assert!(parser.check(TokenKind::RParen));
    }

    #[test]
    fn test_fn_decl_emits_entry() {
        let mut parser = parser("fn id(i32 a, bool b) i32 { return a; }");
        let decl = parser.parse_fn_decl();
        assert!(parser.diagnostics().is_empty());
        assert_eq!(
            render_table(&decl.code),
            "| op | arg1 | arg2 | res |\n\
             | FUNC | - | - | id |\n\
             | ASSIGN | a | - | T0 |\n\
             | RETURN | T0 | - | - |\n"
        );
        let params = &decl.children[3];
        assert_eq!(params.children[0].kind, NodeKind::FnParam);
        assert_eq!(params.children[1].children[1].kind, NodeKind::FnParam);
    }
}
