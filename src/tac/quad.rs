// Quadruple and address definitions for three-address code

use crate::parser::lexer::TokenKind;
use serde::{Serialize, Serializer};
use std::fmt;

/// Literal operand of an instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(n) => write!(f, "{n}"),
            Constant::Float(x) => write!(f, "{x:?}"),
            Constant::Str(s) => write!(f, "\"{s}\""),
            Constant::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Operand or destination of a quadruple
#[derive(Debug, Clone, PartialEq)]
pub enum Address {
    /// Source-level variable or function name
    Name(String),
    Const(Constant),
    /// Compiler temporary, printed `T<n>`
    Temp(u32),
    /// Jump target, printed `L<n>`
    Label(u32),
}

impl Address {
    pub fn name(name: impl Into<String>) -> Self {
        Address::Name(name.into())
    }

    pub fn int(value: i64) -> Self {
        Address::Const(Constant::Int(value))
    }

    pub fn is_label(&self) -> bool {
        matches!(self, Address::Label(_))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Name(name) => write!(f, "{name}"),
            Address::Const(c) => write!(f, "{c}"),
            Address::Temp(n) => write!(f, "T{n}"),
            Address::Label(n) => write!(f, "L{n}"),
        }
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Instruction operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// One of the binary operator tokens
    Binary(TokenKind),
    UnaryMinus,
    Call,
    Subscript,
    Assign,
    Jump,
    JumpIfFalse,
    Return,
    /// Function entry point
    Func,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Binary(kind) => write!(f, "{}", kind.symbol().unwrap_or(kind.tag())),
            Operator::UnaryMinus => write!(f, "UNARY_MINUS"),
            Operator::Call => write!(f, "CALL"),
            Operator::Subscript => write!(f, "SUBSCRIPT"),
            Operator::Assign => write!(f, "ASSIGN"),
            Operator::Jump => write!(f, "JUMP"),
            Operator::JumpIfFalse => write!(f, "JUMP-IF-FALSE"),
            Operator::Return => write!(f, "RETURN"),
            Operator::Func => write!(f, "FUNC"),
        }
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One three-address instruction: `res = arg1 op arg2`
///
/// A quad with no operator and a label result is a label marker: the point in the
/// instruction stream that label resolves to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quad {
    pub op: Option<Operator>,
    pub arg1: Option<Address>,
    pub arg2: Option<Address>,
    pub res: Option<Address>,
}

impl Quad {
    pub fn new(
        op: Operator,
        arg1: Option<Address>,
        arg2: Option<Address>,
        res: Option<Address>,
    ) -> Self {
        Quad {
            op: Some(op),
            arg1,
            arg2,
            res,
        }
    }

    /// `ASSIGN src -> dst`
    pub fn assign(src: Address, dst: Address) -> Self {
        Quad::new(Operator::Assign, Some(src), None, Some(dst))
    }

    /// `JUMP -> label`
    pub fn jump(label: Address) -> Self {
        Quad::new(Operator::Jump, None, None, Some(label))
    }

    /// `JUMP-IF-FALSE cond == 0 -> label`
    pub fn jump_if_false(cond: Address, label: Address) -> Self {
        Quad::new(
            Operator::JumpIfFalse,
            Some(cond),
            Some(Address::int(0)),
            Some(label),
        )
    }

    pub fn label(label: Address) -> Self {
        Quad {
            op: None,
            arg1: None,
            arg2: None,
            res: Some(label),
        }
    }

    pub fn is_label(&self) -> bool {
        self.op.is_none() && self.res.as_ref().is_some_and(Address::is_label)
    }
}

fn field(addr: &Option<Address>) -> String {
    addr.as_ref().map_or_else(|| "-".to_string(), ToString::to_string)
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self
            .op
            .map_or_else(|| "-".to_string(), |op| op.to_string());
        write!(
            f,
            "| {} | {} | {} | {} |",
            op,
            field(&self.arg1),
            field(&self.arg2),
            field(&self.res)
        )
    }
}
