// Syntax tree definitions for the Crust front end

use super::lexer::Token;
use crate::tac::{self, Address, Quad};
use std::fmt;

/// Unique identifier for syntax nodes, used by the graph export
pub type NodeId = usize;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// One variant per grammar production, plus token leaves and error placeholders.
///
/// Variants ending in `Tail` are the right-recursive helper productions
/// (`var_decl_list_`, `expression_tail`, ...) that make list and operator chains LL(1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Program,
    DeclList,
    Decl,
    VarDecl,
    VarDeclList,
    VarDeclListTail,
    FnDecl,
    FnParamList,
    FnParamListTail,
    FnParam,
    Type,
    Segment,
    StmtList,
    Stmt,
    AssignmentStmt,
    ConditionalStmt,
    IfBlock,
    ElifBlocks,
    ElifBlock,
    ElseBlock,
    LoopStmt,
    ForLoop,
    LoopRange,
    LoopStep,
    WhileLoop,
    ReturnStmt,
    ReturnVar,
    JumpStmt,
    Expression,
    ExpressionTail,
    Term,
    ArraySubscript,
    Call,
    CallParamList,
    CallParamListTail,
    /// Consumed terminal
    Token,
    /// Placeholder for a production that could not be parsed
    Error,
}

impl NodeKind {
    pub const ALL: [NodeKind; 37] = [
        NodeKind::Program,
        NodeKind::DeclList,
        NodeKind::Decl,
        NodeKind::VarDecl,
        NodeKind::VarDeclList,
        NodeKind::VarDeclListTail,
        NodeKind::FnDecl,
        NodeKind::FnParamList,
        NodeKind::FnParamListTail,
        NodeKind::FnParam,
        NodeKind::Type,
        NodeKind::Segment,
        NodeKind::StmtList,
        NodeKind::Stmt,
        NodeKind::AssignmentStmt,
        NodeKind::ConditionalStmt,
        NodeKind::IfBlock,
        NodeKind::ElifBlocks,
        NodeKind::ElifBlock,
        NodeKind::ElseBlock,
        NodeKind::LoopStmt,
        NodeKind::ForLoop,
        NodeKind::LoopRange,
        NodeKind::LoopStep,
        NodeKind::WhileLoop,
        NodeKind::ReturnStmt,
        NodeKind::ReturnVar,
        NodeKind::JumpStmt,
        NodeKind::Expression,
        NodeKind::ExpressionTail,
        NodeKind::Term,
        NodeKind::ArraySubscript,
        NodeKind::Call,
        NodeKind::CallParamList,
        NodeKind::CallParamListTail,
        NodeKind::Token,
        NodeKind::Error,
    ];

    /// Rendering name of the production
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Program => "PROG_DECL",
            NodeKind::DeclList => "DECL_LIST",
            NodeKind::Decl => "DECL",
            NodeKind::VarDecl => "VAR_DECL",
            NodeKind::VarDeclList => "VAR_DECL_LIST",
            NodeKind::VarDeclListTail => "VAR_DECL_LIST_",
            NodeKind::FnDecl => "FN_DECL",
            NodeKind::FnParamList => "FN_PARAM_LIST",
            NodeKind::FnParamListTail => "FN_PARAM_LIST_",
            NodeKind::FnParam => "FN_PARAM",
            NodeKind::Type => "TYPE",
            NodeKind::Segment => "SEGMENT",
            NodeKind::StmtList => "STMT_LIST",
            NodeKind::Stmt => "STMT",
            NodeKind::AssignmentStmt => "ASSIGNMENT_STMT",
            NodeKind::ConditionalStmt => "CONDITIONAL_STMT",
            NodeKind::IfBlock => "IF_BLOCK",
            NodeKind::ElifBlocks => "ELIF_BLOCKS",
            NodeKind::ElifBlock => "ELIF_BLOCK",
            NodeKind::ElseBlock => "ELSE_BLOCK",
            NodeKind::LoopStmt => "LOOP_STMT",
            NodeKind::ForLoop => "FOR_LOOP",
            NodeKind::LoopRange => "LOOP_RANGE",
            NodeKind::LoopStep => "LOOP_STEP",
            NodeKind::WhileLoop => "WHILE_LOOP",
            NodeKind::ReturnStmt => "RETURN_STMT",
            NodeKind::ReturnVar => "RETURN_VAR",
            NodeKind::JumpStmt => "JUMP_STMT",
            NodeKind::Expression => "EXPRESSION",
            NodeKind::ExpressionTail => "EXPRESSION_TAIL",
            NodeKind::Term => "TERM",
            NodeKind::ArraySubscript => "ARRAY_SUBSCRIPT",
            NodeKind::Call => "CALL",
            NodeKind::CallParamList => "CALL_PARAM_LIST",
            NodeKind::CallParamListTail => "CALL_PARAM_LIST_",
            NodeKind::Token => "TOKEN",
            NodeKind::Error => "ERROR",
        }
    }

    /// What the parser was looking for, as shown in recovery diagnostics
    pub fn description(self) -> &'static str {
        match self {
            NodeKind::Program | NodeKind::DeclList | NodeKind::Decl => "declaration",
            NodeKind::VarDecl => "variable declaration",
            NodeKind::VarDeclList
            | NodeKind::ArraySubscript
            | NodeKind::Call
            | NodeKind::AssignmentStmt => "identifier",
            NodeKind::VarDeclListTail => "',' or ';'",
            NodeKind::FnDecl => "'fn'",
            NodeKind::FnParamList => "parameter or ')'",
            NodeKind::FnParamListTail | NodeKind::CallParamListTail => "',' or ')'",
            NodeKind::FnParam => "parameter",
            NodeKind::Type => "type",
            NodeKind::Segment => "'{'",
            NodeKind::StmtList => "statement or '}'",
            NodeKind::Stmt => "statement",
            NodeKind::ConditionalStmt | NodeKind::IfBlock => "'if'",
            NodeKind::ElifBlocks => "'elif' or statement",
            NodeKind::ElifBlock => "'elif'",
            NodeKind::ElseBlock => "'else' or statement",
            NodeKind::LoopStmt => "loop",
            NodeKind::ForLoop => "'for'",
            NodeKind::WhileLoop => "'while'",
            NodeKind::LoopRange | NodeKind::Expression | NodeKind::Term => "expression",
            NodeKind::LoopStep => "'..' or '{'",
            NodeKind::ReturnStmt => "'return'",
            NodeKind::ReturnVar => "expression or ';'",
            NodeKind::JumpStmt => "'break' or 'continue'",
            NodeKind::ExpressionTail => "operator",
            NodeKind::CallParamList => "argument or ')'",
            NodeKind::Token | NodeKind::Error => "token",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A syntax tree node.
///
/// A node exclusively owns its children. An epsilon production is a node of its own
/// kind with no children. `code` holds the quadruples of the whole subtree in source
/// order, so the program node's code is the compiled program.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub uid: NodeId,
    pub kind: NodeKind,
    pub children: Vec<Node>,
    pub code: Vec<Quad>,
    pub location: SourceLocation,
    /// Set on token leaves only
    pub token: Option<Token>,
}

impl Node {
    pub fn new(
        uid: NodeId,
        kind: NodeKind,
        location: SourceLocation,
        children: Vec<Node>,
        code: Vec<Quad>,
    ) -> Self {
        Node {
            uid,
            kind,
            children,
            code,
            location,
            token: None,
        }
    }

    pub fn leaf(uid: NodeId, token: Token) -> Self {
        Node {
            uid,
            kind: NodeKind::Token,
            children: Vec::new(),
            code: Vec::new(),
            location: token.location,
            token: Some(token),
        }
    }

    /// Rendering name: the production name, or the token tag for leaves
    pub fn name(&self) -> &'static str {
        match &self.token {
            Some(token) => token.kind.tag(),
            None => self.kind.name(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::Token
    }

    /// True for an epsilon production or an error placeholder
    pub fn is_empty(&self) -> bool {
        !self.is_leaf() && self.children.is_empty()
    }

    /// Identifier or string text carried by a token leaf
    pub fn text(&self) -> Option<&str> {
        self.token.as_ref().and_then(Token::text)
    }

    /// Result address of this subtree's code
    pub fn result(&self) -> Option<&Address> {
        tac::result_of(&self.code)
    }

    /// All nodes of the subtree in pre-order
    pub fn descendants(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Graphviz export: one `parent_uid->child_uid` edge per line, pre-order
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph CFG {\n");
        self.write_edges(&mut out);
        out.push_str("}\n");
        out
    }

    fn write_edges(&self, out: &mut String) {
        for child in &self.children {
            out.push_str(&format!(
                "\t{}_{}->{}_{}\n",
                self.name(),
                self.uid,
                child.name(),
                child.uid
            ));
        }
        for child in &self.children {
            child.write_edges(out);
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        write!(f, "{:indent$}{}", "", self.name())?;
        if self.is_leaf() {
            return writeln!(f);
        }
        writeln!(f, "(")?;
        for child in &self.children {
            child.fmt_indented(f, indent + 2)?;
        }
        writeln!(f, "{:indent$})", "")
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}
