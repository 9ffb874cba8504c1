//! Crust source code parser
//!
//! This module transforms Crust source text into a syntax tree whose nodes carry
//! their three-address code:
//! - [`lexer`]: Tokenization (source text → tokens) behind the [`lexer::TokenSource`] trait
//! - [`first`]: FIRST sets of every production
//! - [`parse`]: The [`parse::Parser`] struct, recovery and node construction
//! - [`ast`]: Syntax tree node definitions
//!
//! # Supported Language
//!
//! - Types: `i32`, `i64`, `u32`, `u64`, `f32`, `f64`, `string`, `bool`, `void`,
//!   fixed-size arrays `[N]T`
//! - Declarations: variables (`i32 x = 1, y;`) and functions (`fn f(i32 a) i32 { ... }`)
//! - Statements: blocks, assignments, `if`/`elif`/`else`, `while`, `for i in a..b[..s]`,
//!   `return`, `break`, `continue`
//! - Expressions: binary operators without precedence (right-associative), unary
//!   minus, calls, subscripts
//!
//! # Parser Implementation
//!
//! Hand-written predictive recursive descent parser with one token of lookahead,
//! driven by the tables in [`first`]. No external parser generator dependencies.

pub mod ast;
mod declarations;
mod expressions;
pub mod first;
pub mod lexer;
pub mod parse;
mod statements;
