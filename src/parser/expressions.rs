//! Expression parsing implementation
//!
//! This module handles parsing of all Crust expressions:
//! - Binary operations: arithmetic, comparison, `and` / `or`
//! - Unary minus
//! - Literals and names
//! - Function calls and array subscripts
//!
//! # Grammar
//!
//! ```text
//! expression        → term expression_tail
//! expression_tail   → BINOP expression | ε
//! term              → '(' expression ')' | '-' term | INT | FLOAT | STR
//!                   | 'true' | 'false' | IDENT | array_subscript | call
//! array_subscript   → IDENT '[' expression ']'
//! call              → IDENT '(' call_param_list ')'
//! call_param_list   → expression call_param_list_ | ε
//! call_param_list_  → ',' expression call_param_list_ | ε
//! ```
//!
//! Binary operators have no precedence: a chain associates to the right, so
//! `a - b - c` is `a - (b - c)`. Chains are read with a loop and folded from the
//! right, which keeps their length from counting toward the nesting limit.
//!
//! # Code Generation
//!
//! Every term copies its value into a fresh temporary, so the result of any
//! expression is the `res` of the last quadruple in its code:
//!
//! ```text
//! f(1, 2)   →  ASSIGN 1 → T0; ASSIGN 2 → T1; CALL f → T2
//! a + b     →  ASSIGN a → T0; ASSIGN b → T1; + T0 T1 → T2
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::{Token, TokenKind, TokenSource, TokenValue};
use crate::parser::parse::Parser;
use crate::tac::{Address, Constant, Operator, Quad};

impl<S: TokenSource> Parser<S> {
    /// Parse an expression
    pub(crate) fn parse_expression(&mut self) -> Node {
        if let Some(skipped) = self.enter_nested() {
            return skipped;
        }
        let expr = self.parse_expression_chain();
        self.leave_nested();
        expr
    }

    fn parse_expression_chain(&mut self) -> Node {
        if !self.recover(NodeKind::Expression) {
            return self.error_node();
        }

        // term (BINOP term)*; an operand cut short by end of input is a placeholder
        let mut operands = vec![self.parse_term()];
        let mut operators = Vec::new();
        while self.recover(NodeKind::ExpressionTail) && self.current.kind.is_binary_operator() {
            operators.push(self.leaf());
            let operand = if self.recover(NodeKind::Expression) {
                self.parse_term()
            } else {
                self.error_node()
            };
            operands.push(operand);
        }

        let tail = self.epsilon(NodeKind::ExpressionTail);
        let Some(last) = operands.pop() else {
            return self.error_node();
        };
        let location = last.location;
        let mut expr = self.node(NodeKind::Expression, location, vec![last, tail], Vec::new());

        while let (Some(op), Some(lhs)) = (operators.pop(), operands.pop()) {
            let location = op.location;
            let op_kind = op.token.as_ref().map_or(TokenKind::Unknown, |t| t.kind);
            let tail = self.node(NodeKind::ExpressionTail, location, vec![op, expr], Vec::new());
            expr = self.binary_expression(lhs, op_kind, tail);
        }
        expr
    }

    /// `code(lhs) ++ code(rhs) ++ [op res(lhs) res(rhs) → Tk]`
    fn binary_expression(&mut self, lhs: Node, op: TokenKind, tail: Node) -> Node {
        let location = lhs.location;
        let own = match (lhs.result(), tail.result()) {
            (Some(left), Some(right)) => vec![Quad::new(
                Operator::Binary(op),
                Some(left.clone()),
                Some(right.clone()),
                Some(self.emitter.new_temp()),
            )],
            _ => {
                tracing::error!(
                    line = location.line,
                    op = %op,
                    "operand has no result address, operation dropped"
                );
                Vec::new()
            }
        };
        self.node(NodeKind::Expression, location, vec![lhs, tail], own)
    }

    /// Parse a term. Unary minus prefixes are collected iteratively and folded
    /// around the operand, innermost negation first.
    pub(crate) fn parse_term(&mut self) -> Node {
        let mut negations = Vec::new();
        let mut term = loop {
            if !self.recover(NodeKind::Term) {
                break self.error_node();
            }
            if !self.check(TokenKind::OpMinus) {
                break self.parse_operand();
            }
            let location = self.current_location();
            negations.push((location, self.leaf()));
        };

        for (location, minus) in negations.into_iter().rev() {
            let own = match term.result() {
                Some(res) => vec![Quad::new(
                    Operator::UnaryMinus,
                    Some(res.clone()),
                    None,
                    Some(self.emitter.new_temp()),
                )],
                None => {
                    tracing::error!(line = location.line, "negated operand has no result address");
                    Vec::new()
                }
            };
            term = self.node(NodeKind::Term, location, vec![minus, term], own);
        }
        term
    }

    /// A term other than a negation; the current token is in `FIRST(term)`
    fn parse_operand(&mut self) -> Node {
        let location = self.current_location();
        let kind = self.current.kind;

        match kind {
            TokenKind::LParen => {
                let lparen = self.leaf();
                let inner = self.parse_expression();
                let rparen = self.expect(TokenKind::RParen);
                self.node(NodeKind::Term, location, vec![lparen, inner, rparen], Vec::new())
            }
            TokenKind::Identifier if self.peek_kind() == TokenKind::LBracket => {
                let subscript = self.parse_array_subscript();
                self.node(NodeKind::Term, location, vec![subscript], Vec::new())
            }
            TokenKind::Identifier if self.peek_kind() == TokenKind::LParen => {
                let call = self.parse_call();
                self.node(NodeKind::Term, location, vec![call], Vec::new())
            }
            _ => {
                let value = self.leaf();
                let own = match value.token.as_ref().and_then(operand_of) {
                    Some(operand) => vec![Quad::assign(operand, self.emitter.new_temp())],
                    None => {
                        tracing::error!(line = location.line, token = value.name(), "term has no value");
                        Vec::new()
                    }
                };
                self.node(NodeKind::Term, location, vec![value], own)
            }
        }
    }

    /// Parse `name[index]`: the index code, then `SUBSCRIPT name index → Tk`
    pub(crate) fn parse_array_subscript(&mut self) -> Node {
        if !self.recover(NodeKind::ArraySubscript) {
            return self.error_node();
        }
        let location = self.current_location();

        let (ident, name) = self.expect_identifier();
        let lbracket = self.expect(TokenKind::LBracket);
        let index = self.parse_expression();
        let rbracket = self.expect(TokenKind::RBracket);

        let own = match (name, index.result()) {
            (Some(name), Some(res)) => vec![Quad::new(
                Operator::Subscript,
                Some(Address::Name(name)),
                Some(res.clone()),
                Some(self.emitter.new_temp()),
            )],
            _ => {
                tracing::error!(line = location.line, "malformed subscript, access dropped");
                Vec::new()
            }
        };
        self.node(
            NodeKind::ArraySubscript,
            location,
            vec![ident, lbracket, index, rbracket],
            own,
        )
    }

    /// Parse `name(args)`: each argument's code in order, then `CALL name → Tk`
    pub(crate) fn parse_call(&mut self) -> Node {
        if !self.recover(NodeKind::Call) {
            return self.error_node();
        }
        let location = self.current_location();

        let (ident, name) = self.expect_identifier();
        let lparen = self.expect(TokenKind::LParen);
        let args = self.parse_call_param_list();
        let rparen = self.expect(TokenKind::RParen);

        let own = match name {
            Some(name) => vec![Quad::new(
                Operator::Call,
                Some(Address::Name(name)),
                None,
                Some(self.emitter.new_temp()),
            )],
            None => {
                tracing::error!(line = location.line, "call without a callee, call dropped");
                Vec::new()
            }
        };
        self.node(NodeKind::Call, location, vec![ident, lparen, args, rparen], own)
    }

    pub(crate) fn parse_call_param_list(&mut self) -> Node {
        if !self.recover(NodeKind::CallParamList) || self.check(TokenKind::RParen) {
            return self.epsilon(NodeKind::CallParamList);
        }
        let location = self.current_location();

        let first = self.parse_expression();
        let rest = self.parse_call_param_list_tail();
        self.node(NodeKind::CallParamList, location, vec![first, rest], Vec::new())
    }

    pub(crate) fn parse_call_param_list_tail(&mut self) -> Node {
        let mut args = Vec::new();
        while self.recover(NodeKind::CallParamListTail) && self.check(TokenKind::Comma) {
            let comma = self.leaf();
            let arg = self.parse_expression();
            args.push((comma, arg));
        }

        let mut tail = self.epsilon(NodeKind::CallParamListTail);
        for (comma, arg) in args.into_iter().rev() {
            let location = comma.location;
            tail = self.node(
                NodeKind::CallParamListTail,
                location,
                vec![comma, arg, tail],
                Vec::new(),
            );
        }
        tail
    }
}

/// Address a name or literal token stands for
fn operand_of(token: &Token) -> Option<Address> {
    let constant = match (token.kind, &token.value) {
        (TokenKind::Identifier, Some(TokenValue::Str(name))) => {
            return Some(Address::Name(name.clone()))
        }
        (TokenKind::IntLiteral, Some(TokenValue::Int(n))) => Constant::Int(*n),
        (TokenKind::FloatLiteral, Some(TokenValue::Float(x))) => Constant::Float(*x),
        (TokenKind::StrLiteral, Some(TokenValue::Str(s))) => Constant::Str(s.clone()),
        (TokenKind::KwTrue, _) => Constant::Bool(true),
        (TokenKind::KwFalse, _) => Constant::Bool(false),
        _ => return None,
    };
    Some(Address::Const(constant))
}
