//! FIRST sets of the Crust grammar
//!
//! Each production's FIRST set is computed once from the grammar below and looked up
//! by the parser both to pick an alternative and to guard entry with panic-mode
//! recovery. For a nullable production the set also holds the tokens that may follow
//! it, since those legally stand at its entry and select the empty alternative.
//! End of input is never a member; the recovery loop stops on it separately.
//!
//! ```text
//! expression      → term expression_tail
//! expression_tail → BINOP expression | ε        follow: ) ] , ; { ..
//! term            → '(' expression ')' | '-' term | literal | IDENT
//!                 | array_subscript | call
//! ```
//!
//! The full grammar is documented on the parsing modules that implement it:
//! [`declarations`](super::declarations), [`statements`](super::statements) and
//! [`expressions`](super::expressions).

use super::ast::NodeKind;
use super::lexer::TokenKind;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::LazyLock;

static FIRST_SETS: LazyLock<FxHashMap<NodeKind, FxHashSet<TokenKind>>> = LazyLock::new(|| {
    NodeKind::ALL
        .iter()
        .map(|&kind| (kind, compute(kind).iter().copied().collect()))
        .collect()
});

static EMPTY: LazyLock<FxHashSet<TokenKind>> = LazyLock::new(FxHashSet::default);

/// Tokens that legally stand at the entry of a production
pub fn first_set(kind: NodeKind) -> &'static FxHashSet<TokenKind> {
    FIRST_SETS.get(&kind).unwrap_or(&EMPTY)
}

const PRIMITIVE_TYPES: [TokenKind; 9] = [
    TokenKind::KwI32,
    TokenKind::KwI64,
    TokenKind::KwU32,
    TokenKind::KwU64,
    TokenKind::KwF32,
    TokenKind::KwF64,
    TokenKind::KwString,
    TokenKind::KwBool,
    TokenKind::KwVoid,
];

const BINARY_OPERATORS: [TokenKind; 13] = [
    TokenKind::OpPlus,
    TokenKind::OpMinus,
    TokenKind::OpMult,
    TokenKind::OpDiv,
    TokenKind::OpMod,
    TokenKind::OpAnd,
    TokenKind::OpOr,
    TokenKind::OpGt,
    TokenKind::OpGe,
    TokenKind::OpEq,
    TokenKind::OpNe,
    TokenKind::OpLe,
    TokenKind::OpLt,
];

const EXPRESSION_START: [TokenKind; 8] = [
    TokenKind::LParen,
    TokenKind::OpMinus,
    TokenKind::KwTrue,
    TokenKind::KwFalse,
    TokenKind::IntLiteral,
    TokenKind::FloatLiteral,
    TokenKind::StrLiteral,
    TokenKind::Identifier,
];

const EXPRESSION_FOLLOW: [TokenKind; 6] = [
    TokenKind::RParen,
    TokenKind::RBracket,
    TokenKind::Comma,
    TokenKind::SemiColon,
    TokenKind::LBrace,
    TokenKind::Range,
];

fn compute(kind: NodeKind) -> Vec<TokenKind> {
    use NodeKind as K;
    use TokenKind as T;

    let mut set = Vec::new();
    match kind {
        K::Type | K::VarDecl | K::FnParam => {
            set.extend(PRIMITIVE_TYPES);
            set.push(T::LBracket);
        }
        K::Program | K::DeclList | K::Decl => {
            set.push(T::KwFn);
            set.extend(compute(K::Type));
        }
        K::FnDecl => set.push(T::KwFn),
        K::VarDeclList | K::AssignmentStmt | K::ArraySubscript | K::Call => {
            set.push(T::Identifier)
        }
        K::VarDeclListTail => set.extend([T::Comma, T::SemiColon]),
        K::FnParamList => {
            set.extend(compute(K::FnParam));
            set.push(T::RParen);
        }
        K::FnParamListTail | K::CallParamListTail => set.extend([T::Comma, T::RParen]),
        K::Segment => set.push(T::LBrace),
        K::Stmt => {
            set.extend([
                T::LBrace,
                T::KwIf,
                T::KwFor,
                T::KwWhile,
                T::KwReturn,
                T::KwBreak,
                T::KwContinue,
            ]);
            set.extend(compute(K::VarDecl));
            set.extend(EXPRESSION_START);
        }
        K::StmtList => {
            set.extend(compute(K::Stmt));
            set.push(T::RBrace);
        }
        K::ConditionalStmt | K::IfBlock => set.push(T::KwIf),
        K::ElifBlock => set.push(T::KwElif),
        // Followed by the else block, then by whatever may follow a statement
        K::ElifBlocks => {
            set.push(T::KwElif);
            set.extend(compute(K::ElseBlock));
        }
        K::ElseBlock => {
            set.push(T::KwElse);
            set.extend(compute(K::StmtList));
        }
        K::LoopStmt => set.extend([T::KwFor, T::KwWhile]),
        K::ForLoop => set.push(T::KwFor),
        K::WhileLoop => set.push(T::KwWhile),
        K::LoopRange | K::Expression | K::Term => set.extend(EXPRESSION_START),
        K::LoopStep => set.extend([T::Range, T::LBrace]),
        K::ReturnStmt => set.push(T::KwReturn),
        K::ReturnVar => {
            set.extend(EXPRESSION_START);
            set.push(T::SemiColon);
        }
        K::JumpStmt => set.extend([T::KwBreak, T::KwContinue]),
        K::ExpressionTail => {
            set.extend(BINARY_OPERATORS);
            set.extend(EXPRESSION_FOLLOW);
        }
        K::CallParamList => {
            set.extend(EXPRESSION_START);
            set.push(T::RParen);
        }
        K::Token | K::Error => {}
    }
    set
}
