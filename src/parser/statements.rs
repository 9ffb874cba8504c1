//! Statement parsing implementation
//!
//! This module handles parsing of all Crust statement types:
//!
//! - Blocks: `{ ... }`
//! - Variable declarations: `i32 x = 42;`
//! - Control flow: `if` / `elif` / `else`, `while`, `for i in a..b`
//! - Jump statements: `return`, `break`, `continue`
//! - Assignments and expression statements: `x = f(1);`, `g();`
//!
//! # Grammar
//!
//! ```text
//! segment          → '{' stmt_list '}'
//! stmt_list        → stmt stmt_list | ε
//! stmt             → segment | conditional_stmt | loop_stmt | var_decl ';'
//!                  | return_stmt ';' | jump_stmt ';' | assignment_stmt ';'
//!                  | expression ';'
//! assignment_stmt  → IDENT '=' expression
//! conditional_stmt → if_block elif_blocks else_block
//! if_block         → 'if' expression segment
//! elif_blocks      → elif_block elif_blocks | ε
//! elif_block       → 'elif' expression segment
//! else_block       → 'else' segment | ε
//! loop_stmt        → for_loop | while_loop
//! for_loop         → 'for' IDENT 'in' loop_range segment
//! loop_range       → expression '..' expression loop_step
//! loop_step        → '..' expression | ε
//! while_loop       → 'while' expression segment
//! return_stmt      → 'return' return_var
//! return_var       → expression | ε
//! jump_stmt        → 'break' | 'continue'
//! ```
//!
//! # Control Flow Lowering
//!
//! An `elif` chain is lowered as nested `else { if ... }`. Each branch level gets a
//! false label and an end label, allocated in source order once the whole chain is
//! parsed:
//!
//! ```text
//! if c0 { S0 } elif c1 { S1 } else { S2 }
//!
//!   code(c0); JUMP-IF-FALSE c0 == 0 → L0; S0; JUMP → L1; L0:
//!   code(c1); JUMP-IF-FALSE c1 == 0 → L2; S1; JUMP → L3; L2:
//!   S2; L3: L1:
//! ```
//!
//! Loops allocate their labels before the body is parsed, so `break` and
//! `continue` inside it can jump to them.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::error::SyntaxError;
use crate::parser::ast::*;
use crate::parser::first::first_set;
use crate::parser::lexer::{TokenKind, TokenSource};
use crate::parser::parse::{LoopLabels, Parser};
use crate::tac::{Address, Operator, Quad};

impl<S: TokenSource> Parser<S> {
    /// Parse a braced block
    pub(crate) fn parse_segment(&mut self) -> Node {
        if let Some(skipped) = self.enter_nested() {
            return skipped;
        }
        let segment = self.parse_segment_inner();
        self.leave_nested();
        segment
    }

    fn parse_segment_inner(&mut self) -> Node {
        if !self.recover(NodeKind::Segment) {
            return self.error_node();
        }
        let location = self.current_location();

        let lbrace = self.expect(TokenKind::LBrace);
        let stmts = self.parse_stmt_list();
        let rbrace = self.expect(TokenKind::RBrace);
        self.node(NodeKind::Segment, location, vec![lbrace, stmts, rbrace], Vec::new())
    }

    pub(crate) fn parse_stmt_list(&mut self) -> Node {
        let mut stmts = Vec::new();
        while self.recover(NodeKind::StmtList) && !self.check(TokenKind::RBrace) {
            stmts.push(self.parse_stmt());
        }

        let mut list = self.epsilon(NodeKind::StmtList);
        for stmt in stmts.into_iter().rev() {
            let location = stmt.location;
            list = self.node(NodeKind::StmtList, location, vec![stmt, list], Vec::new());
        }
        list
    }

    pub(crate) fn parse_stmt(&mut self) -> Node {
        if !self.recover(NodeKind::Stmt) {
            return self.error_node();
        }
        let location = self.current_location();
        let kind = self.current.kind;

        let children = match kind {
            TokenKind::LBrace => vec![self.parse_segment()],
            TokenKind::KwIf => vec![self.parse_conditional_stmt()],
            TokenKind::KwFor | TokenKind::KwWhile => vec![self.parse_loop_stmt()],
            TokenKind::KwReturn => self.terminated(Self::parse_return_stmt),
            TokenKind::KwBreak | TokenKind::KwContinue => self.terminated(Self::parse_jump_stmt),
            _ if first_set(NodeKind::VarDecl).contains(&kind) => {
                self.terminated(Self::parse_var_decl)
            }
            TokenKind::Identifier if self.peek_kind() == TokenKind::Assign => {
                self.terminated(Self::parse_assignment_stmt)
            }
            _ => self.terminated(Self::parse_expression),
        };
        self.node(NodeKind::Stmt, location, children, Vec::new())
    }

    /// Parse a production followed by `;`
    fn terminated(&mut self, parse: fn(&mut Self) -> Node) -> Vec<Node> {
        let stmt = parse(self);
        let semi = self.expect(TokenKind::SemiColon);
        vec![stmt, semi]
    }

    /// Parse `name = expression`: the expression's code, then `ASSIGN result → name`
    pub(crate) fn parse_assignment_stmt(&mut self) -> Node {
        if !self.recover(NodeKind::AssignmentStmt) {
            return self.error_node();
        }
        let location = self.current_location();

        let (ident, name) = self.expect_identifier();
        let assign = self.expect(TokenKind::Assign);
        let value = self.parse_expression();

        let code = match name {
            Some(name) => self.assign_result(&value, Address::Name(name)),
            None => {
                tracing::error!(line = location.line, "assignment without a target, store dropped");
                value.code.clone()
            }
        };
        self.node_with_code(
            NodeKind::AssignmentStmt,
            location,
            vec![ident, assign, value],
            code,
        )
    }

    // ===== Conditionals =====

    pub(crate) fn parse_conditional_stmt(&mut self) -> Node {
        if !self.recover(NodeKind::ConditionalStmt) {
            return self.error_node();
        }
        let location = self.current_location();

        let if_block = self.parse_if_block();
        let elif_location = self.current_location();
        let elif_blocks = self.parse_elif_blocks();
        let else_block = self.parse_else_block();

        // (false, end) label pair per branch level, in source order
        let labels: Vec<(Address, Address)> = (0..=elif_blocks.len())
            .map(|_| (self.emitter.new_label(), self.emitter.new_label()))
            .collect();

        let (if_false, if_end) = labels[0].clone();
        let if_block = self.with_branch_code(if_block, if_false.clone(), if_end);
        let elif_blocks = self.fold_elif_blocks(elif_blocks, &labels[1..], elif_location);

        let mut code = if_block.code.clone();
        code.push(Quad::label(if_false));
        code.extend(elif_blocks.code.iter().cloned());
        code.extend(else_block.code.iter().cloned());
        for (_, end) in labels.into_iter().rev() {
            code.push(Quad::label(end));
        }

        self.node_with_code(
            NodeKind::ConditionalStmt,
            location,
            vec![if_block, elif_blocks, else_block],
            code,
        )
    }

    /// Parse `if cond { ... }`. Branch code is attached by the enclosing conditional.
    pub(crate) fn parse_if_block(&mut self) -> Node {
        self.parse_branch(NodeKind::IfBlock, TokenKind::KwIf)
    }

    pub(crate) fn parse_elif_block(&mut self) -> Node {
        self.parse_branch(NodeKind::ElifBlock, TokenKind::KwElif)
    }

    fn parse_branch(&mut self, kind: NodeKind, keyword: TokenKind) -> Node {
        if !self.recover(kind) {
            return self.error_node();
        }
        let location = self.current_location();

        let kw = self.expect(keyword);
        let cond = self.parse_expression();
        let body = self.parse_segment();
        self.node(kind, location, vec![kw, cond, body], Vec::new())
    }

    /// Parse every `elif` block of a chain, in source order
    pub(crate) fn parse_elif_blocks(&mut self) -> Vec<Node> {
        let mut blocks = Vec::new();
        while self.recover(NodeKind::ElifBlocks) && self.check(TokenKind::KwElif) {
            blocks.push(self.parse_elif_block());
        }
        blocks
    }

    /// Build the right-nested `ELIF_BLOCKS` tree, each block followed by its false label
    fn fold_elif_blocks(
        &mut self,
        blocks: Vec<Node>,
        labels: &[(Address, Address)],
        location: SourceLocation,
    ) -> Node {
        let mut list = self.node_with_code(NodeKind::ElifBlocks, location, Vec::new(), Vec::new());
        for (block, (if_false, end)) in blocks.into_iter().zip(labels.iter().cloned()).rev() {
            let block = self.with_branch_code(block, if_false.clone(), end);
            let block_location = block.location;
            // The false label resolves between this block and the rest of the chain
            let mut code = block.code.clone();
            code.push(Quad::label(if_false));
            code.extend(list.code.iter().cloned());
            list = self.node_with_code(
                NodeKind::ElifBlocks,
                block_location,
                vec![block, list],
                code,
            );
        }
        list
    }

    /// Give an if/elif block its branch code:
    /// `code(cond); JUMP-IF-FALSE cond == 0 → if_false; body; JUMP → end`
    fn with_branch_code(&self, mut block: Node, if_false: Address, end: Address) -> Node {
        let [_, cond, body] = block.children.as_slice() else {
            tracing::error!(
                node = %block.kind,
                line = block.location.line,
                children = block.children.len(),
                "malformed branch, passing code through"
            );
            return block;
        };
        let Some(cond_res) = cond.result().cloned() else {
            tracing::error!(
                line = block.location.line,
                "branch condition has no result address, passing code through"
            );
            return block;
        };

        let mut code = cond.code.clone();
        code.push(Quad::jump_if_false(cond_res, if_false));
        code.extend(body.code.iter().cloned());
        code.push(Quad::jump(end));
        block.code = code;
        block
    }

    pub(crate) fn parse_else_block(&mut self) -> Node {
        if !self.recover(NodeKind::ElseBlock) || !self.check(TokenKind::KwElse) {
            return self.epsilon(NodeKind::ElseBlock);
        }
        let location = self.current_location();

        let kw = self.leaf();
        let body = self.parse_segment();
        self.node(NodeKind::ElseBlock, location, vec![kw, body], Vec::new())
    }

    // ===== Loops =====

    pub(crate) fn parse_loop_stmt(&mut self) -> Node {
        if !self.recover(NodeKind::LoopStmt) {
            return self.error_node();
        }
        let location = self.current_location();

        let inner = if self.check(TokenKind::KwFor) {
            self.parse_for_loop()
        } else {
            self.parse_while_loop()
        };
        self.node(NodeKind::LoopStmt, location, vec![inner], Vec::new())
    }

    /// Parse `while cond { ... }`:
    /// `Ls: code(cond); JUMP-IF-FALSE cond == 0 → Le; body; JUMP → Ls; Le:`
    pub(crate) fn parse_while_loop(&mut self) -> Node {
        if !self.recover(NodeKind::WhileLoop) {
            return self.error_node();
        }
        let location = self.current_location();

        let kw = self.expect(TokenKind::KwWhile);
        let cond = self.parse_expression();

        let start = self.emitter.new_label();
        let end = self.emitter.new_label();
        let body = self.parse_loop_body(start.clone(), end.clone());

        let mut code = vec![Quad::label(start.clone())];
        code.extend(cond.code.iter().cloned());
        match cond.result() {
            Some(res) => code.push(Quad::jump_if_false(res.clone(), end.clone())),
            None => tracing::error!(
                line = location.line,
                "loop condition has no result address, exit branch dropped"
            ),
        }
        code.extend(body.code.iter().cloned());
        code.push(Quad::jump(start));
        code.push(Quad::label(end));

        self.node_with_code(NodeKind::WhileLoop, location, vec![kw, cond, body], code)
    }

    /// Parse `for i in a..b[..s] { ... }`, an exclusive counting loop with bounds
    /// evaluated once:
    ///
    /// ```text
    /// code(a); code(b); code(s) | ASSIGN 1 → Ts; ASSIGN a → i
    /// Ls: < i b → Tc; JUMP-IF-FALSE Tc == 0 → Le; body
    /// Lc: + i s → Tn; ASSIGN Tn → i; JUMP → Ls; Le:
    /// ```
    pub(crate) fn parse_for_loop(&mut self) -> Node {
        if !self.recover(NodeKind::ForLoop) {
            return self.error_node();
        }
        let location = self.current_location();

        let kw = self.expect(TokenKind::KwFor);
        let (ident, name) = self.expect_identifier();
        let in_kw = self.expect(TokenKind::KwIn);
        let range = self.parse_loop_range();

        let default_step = match range.children.get(3) {
            Some(step) if step.is_empty() => Some(self.emitter.new_temp()),
            _ => None,
        };
        let cmp = self.emitter.new_temp();
        let next = self.emitter.new_temp();
        let start = self.emitter.new_label();
        let cont = self.emitter.new_label();
        let end = self.emitter.new_label();
        let body = self.parse_loop_body(cont.clone(), end.clone());

        let mut code = range.code.clone();
        let bounds = match (&name, range_bounds(&range)) {
            (Some(name), Some(bounds)) => Some((Address::Name(name.clone()), bounds)),
            _ => None,
        };

        match bounds {
            Some((var, (from, to, step))) => {
                let step = match (step, default_step) {
                    (Some(step), _) => step,
                    (None, Some(temp)) => {
                        code.push(Quad::assign(Address::int(1), temp.clone()));
                        temp
                    }
                    (None, None) => Address::int(1),
                };
                code.push(Quad::assign(from, var.clone()));
                code.push(Quad::label(start.clone()));
                code.push(Quad::new(
                    Operator::Binary(TokenKind::OpLt),
                    Some(var.clone()),
                    Some(to),
                    Some(cmp.clone()),
                ));
                code.push(Quad::jump_if_false(cmp, end.clone()));
                code.extend(body.code.iter().cloned());
                code.push(Quad::label(cont));
                code.push(Quad::new(
                    Operator::Binary(TokenKind::OpPlus),
                    Some(var.clone()),
                    Some(step),
                    Some(next.clone()),
                ));
                code.push(Quad::assign(next, var));
                code.push(Quad::jump(start));
                code.push(Quad::label(end));
            }
            None => {
                tracing::error!(
                    line = location.line,
                    "malformed loop header, passing code through"
                );
                code.extend(body.code.iter().cloned());
            }
        }

        self.node_with_code(
            NodeKind::ForLoop,
            location,
            vec![kw, ident, in_kw, range, body],
            code,
        )
    }

    /// Parse a loop body with `break`/`continue` bound to the given labels
    fn parse_loop_body(&mut self, continue_label: Address, break_label: Address) -> Node {
        self.loops.push(LoopLabels {
            continue_label,
            break_label,
        });
        let body = self.parse_segment();
        self.loops.pop();
        body
    }

    pub(crate) fn parse_loop_range(&mut self) -> Node {
        if !self.recover(NodeKind::LoopRange) {
            return self.error_node();
        }
        let location = self.current_location();

        let from = self.parse_expression();
        let dots = self.expect(TokenKind::Range);
        let to = self.parse_expression();
        let step = self.parse_loop_step();
        self.node(NodeKind::LoopRange, location, vec![from, dots, to, step], Vec::new())
    }

    pub(crate) fn parse_loop_step(&mut self) -> Node {
        if !self.recover(NodeKind::LoopStep) || !self.check(TokenKind::Range) {
            return self.epsilon(NodeKind::LoopStep);
        }
        let location = self.current_location();

        let dots = self.leaf();
        let step = self.parse_expression();
        self.node(NodeKind::LoopStep, location, vec![dots, step], Vec::new())
    }

    // ===== Jumps =====

    /// Parse `return [expression]`: the value's code, then `RETURN result`
    pub(crate) fn parse_return_stmt(&mut self) -> Node {
        if !self.recover(NodeKind::ReturnStmt) {
            return self.error_node();
        }
        let location = self.current_location();

        let kw = self.expect(TokenKind::KwReturn);
        let value = self.parse_return_var();

        let operand = value.result().cloned();
        if operand.is_none() && !value.is_empty() {
            tracing::error!(line = location.line, "return value has no result address");
        }
        let ret = Quad::new(Operator::Return, operand, None, None);
        self.node(NodeKind::ReturnStmt, location, vec![kw, value], vec![ret])
    }

    pub(crate) fn parse_return_var(&mut self) -> Node {
        if !self.recover(NodeKind::ReturnVar) || self.check(TokenKind::SemiColon) {
            return self.epsilon(NodeKind::ReturnVar);
        }
        let location = self.current_location();

        let value = self.parse_expression();
        self.node(NodeKind::ReturnVar, location, vec![value], Vec::new())
    }

    /// Parse `break` or `continue`, jumping to the innermost loop's labels
    pub(crate) fn parse_jump_stmt(&mut self) -> Node {
        if !self.recover(NodeKind::JumpStmt) {
            return self.error_node();
        }
        let location = self.current_location();

        let keyword = self.current.kind;
        let kw = self.leaf();
        let target = self.loops.last().map(|labels| match keyword {
            TokenKind::KwBreak => labels.break_label.clone(),
            _ => labels.continue_label.clone(),
        });

        let code = match target {
            Some(label) => vec![Quad::jump(label)],
            None => {
                self.report(SyntaxError::JumpOutsideLoop(keyword), location);
                Vec::new()
            }
        };
        self.node(NodeKind::JumpStmt, location, vec![kw], code)
    }
}

/// Result addresses of a loop range: start, end, and step if one was given
fn range_bounds(range: &Node) -> Option<(Address, Address, Option<Address>)> {
    let [from, _, to, step] = range.children.as_slice() else {
        return None;
    };
    let step = match step.children.as_slice() {
        [] => None,
        [_, value] => Some(value.result()?.clone()),
        _ => return None,
    };
    Some((from.result()?.clone(), to.result()?.clone(), step))
}
