// Integration tests for parsing, recovery and tree output

use crustc::parser::first::first_set;
use crustc::{
    compile, compile_file, compile_with, CompileError, DiagnosticKind, LexError, NodeKind,
    ParserConfig, SyntaxError, TokenKind,
};
use std::io::Write;

fn assert_clean(source: &str) {
    let compilation = compile(source);
    assert!(
        compilation.diagnostics.is_empty(),
        "unexpected diagnostics for {source:?}: {:?}",
        compilation.diagnostics
    );
}

fn primitive_keyword(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::KwI32 => "i32",
        TokenKind::KwI64 => "i64",
        TokenKind::KwU32 => "u32",
        TokenKind::KwU64 => "u64",
        TokenKind::KwF32 => "f32",
        TokenKind::KwF64 => "f64",
        TokenKind::KwString => "string",
        TokenKind::KwBool => "bool",
        TokenKind::KwVoid => "void",
        other => panic!("not a primitive type: {other:?}"),
    }
}

#[test]
fn test_every_declaration_start_is_accepted() {
    for &kind in first_set(NodeKind::Decl) {
        let source = match kind {
            TokenKind::KwFn => "fn f() void { }".to_string(),
            TokenKind::LBracket => "[2]i32 a;".to_string(),
            primitive => format!("{} x;", primitive_keyword(primitive)),
        };
        assert_clean(&source);
    }
}

#[test]
fn test_every_statement_start_is_accepted() {
    for &kind in first_set(NodeKind::Stmt) {
        let stmt = match kind {
            TokenKind::LBrace => "{ }".to_string(),
            TokenKind::KwIf => "if x { }".to_string(),
            TokenKind::KwFor => "for i in 0..3 { }".to_string(),
            TokenKind::KwWhile => "while x { }".to_string(),
            TokenKind::KwReturn => "return 1;".to_string(),
            TokenKind::KwBreak => "break;".to_string(),
            TokenKind::KwContinue => "continue;".to_string(),
            TokenKind::LBracket => "[2]i32 a;".to_string(),
            TokenKind::LParen => "(1);".to_string(),
            TokenKind::OpMinus => "-1;".to_string(),
            TokenKind::KwTrue => "true;".to_string(),
            TokenKind::KwFalse => "false;".to_string(),
            TokenKind::IntLiteral => "1;".to_string(),
            TokenKind::FloatLiteral => "1.5;".to_string(),
            TokenKind::StrLiteral => "\"s\";".to_string(),
            TokenKind::Identifier => "x = 1;".to_string(),
            primitive => format!("{} y;", primitive_keyword(primitive)),
        };
        // Inside a loop so that `break` and `continue` are legal
        assert_clean(&format!("fn f() void {{ while c {{ {stmt} }} }}"));
    }
}

#[test]
fn test_every_binary_operator_continues_an_expression() {
    for &kind in first_set(NodeKind::ExpressionTail) {
        if let Some(symbol) = kind.symbol().filter(|_| kind.is_binary_operator()) {
            assert_clean(&format!("i32 x = a {symbol} b;"));
        }
    }
}

#[test]
fn test_recovery_terminates_on_garbage() {
    let compilation = compile(") ] , ; } .. = ::");

    assert_eq!(compilation.diagnostics.len(), 8);
    for diagnostic in &compilation.diagnostics {
        assert!(matches!(
            diagnostic.kind,
            DiagnosticKind::Syntax(SyntaxError::Unexpected {
                expected: "declaration",
                ..
            })
        ));
    }
    assert_eq!(
        compilation.program.to_string(),
        "PROG_DECL(\n  DECL_LIST(\n  )\n)\n"
    );
    assert!(compilation.code().is_empty());
}

#[test]
fn test_unknown_tokens_are_recovered_like_any_other() {
    let compilation = compile("$ @ i32 x;");
    let lexical = compilation.diagnostics.iter().filter(|d| d.is_lexical()).count();
    assert_eq!(lexical, 2);
    assert_eq!(compilation.diagnostics.len(), 4);
    assert_eq!(
        compilation.diagnostics[1].to_string(),
        "error at line 1, column 1: expected declaration, found unknown token"
    );
}

#[test]
fn test_oversized_integer_is_skipped_by_recovery() {
    let compilation = compile("i32 x = 99999999999999999999 1;");

    assert_eq!(compilation.diagnostics.len(), 2);
    assert_eq!(
        compilation.diagnostics[0].kind,
        DiagnosticKind::Lexical(LexError::IntegerOutOfRange("99999999999999999999".into()))
    );
    assert_eq!(
        compilation.diagnostics[1].to_string(),
        "error at line 1, column 9: expected expression, found unknown token"
    );

    // The initializer resumes at the next literal
    let rows: Vec<String> = compilation.code().iter().map(|q| q.to_string()).collect();
    assert_eq!(
        rows,
        vec!["| ASSIGN | 1 | - | T0 |", "| ASSIGN | T0 | - | x |"]
    );
}

#[test]
fn test_diagnostics_are_ordered_by_location() {
    let compilation = compile("fn f() void {\n  x = ;\n  $\n  return 1 2;\n}\n!");
    assert!(compilation.diagnostics.len() >= 4);
    for pair in compilation.diagnostics.windows(2) {
        assert!(pair[0].location <= pair[1].location);
    }
}

#[test]
fn test_var_decl_round_trip() {
    let compilation = compile("i32 x = 5;");
    assert!(compilation.diagnostics.is_empty());

    let decl = &compilation.program.children[0].children[0];
    let var_decl = &decl.children[0];
    assert_eq!(var_decl.kind, NodeKind::VarDecl);
    assert_eq!(var_decl.children[0].kind, NodeKind::Type);
    assert_eq!(var_decl.children[1].kind, NodeKind::VarDeclList);
    assert_eq!(var_decl.children[1].children[0].text(), Some("x"));

    let rows: Vec<String> = compilation.code().iter().map(|q| q.to_string()).collect();
    assert_eq!(
        rows,
        vec!["| ASSIGN | 5 | - | T0 |", "| ASSIGN | T0 | - | x |"]
    );
}

#[test]
fn test_tree_rendering() {
    let compilation = compile("i32 x;");
    assert_eq!(
        compilation.program.to_string(),
        "PROG_DECL(\n\
         \x20 DECL_LIST(\n\
         \x20   DECL(\n\
         \x20     VAR_DECL(\n\
         \x20       TYPE(\n\
         \x20         KW_I32\n\
         \x20       )\n\
         \x20       VAR_DECL_LIST(\n\
         \x20         IDENTIFIER\n\
         \x20         VAR_DECL_LIST_(\n\
         \x20         )\n\
         \x20       )\n\
         \x20     )\n\
         \x20     SEMI_COLON\n\
         \x20   )\n\
         \x20   DECL_LIST(\n\
         \x20   )\n\
         \x20 )\n\
         )\n"
    );
}

#[test]
fn test_dot_export() {
    let compilation = compile("fn main() void { f(1); }");
    let dot = compilation.program.to_dot();
    let nodes = compilation.program.descendants();

    assert!(dot.starts_with("digraph CFG {\n\tPROG_DECL_"));
    assert!(dot.ends_with("}\n"));
    let edges = dot.lines().filter(|l| l.contains("->")).count();
    assert_eq!(edges, nodes.len() - 1);

    let mut uids: Vec<_> = nodes.iter().map(|n| n.uid).collect();
    uids.sort_unstable();
    uids.dedup();
    assert_eq!(uids.len(), nodes.len());
}

#[test]
fn test_deep_nesting_is_reported() {
    let config = ParserConfig {
        max_depth: 64,
        ..ParserConfig::default()
    };
    let depth = 10_000;
    let source = format!("i32 x = {}1{};", "(".repeat(depth), ")".repeat(depth));
    let compilation = compile_with(&source, &config);
    assert_eq!(compilation.diagnostics.len(), 1);
    assert_eq!(
        compilation.diagnostics[0].kind,
        DiagnosticKind::Syntax(SyntaxError::TooDeep { limit: 64 })
    );
    // The declaration itself survives
    assert_eq!(compilation.program.children[0].children.len(), 2);
}

#[test]
fn test_deep_blocks_are_reported() {
    let config = ParserConfig {
        max_depth: 4,
        ..ParserConfig::default()
    };
    let source = format!("fn f() void {}{}", "{".repeat(10), "}".repeat(10));
    let compilation = compile_with(&source, &config);
    assert_eq!(
        compilation.diagnostics.iter().map(|d| d.kind.clone()).collect::<Vec<_>>(),
        vec![DiagnosticKind::Syntax(SyntaxError::TooDeep { limit: 4 })]
    );
}

#[test]
fn test_long_lists_do_not_count_as_nesting() {
    let config = ParserConfig {
        max_depth: 4,
        ..ParserConfig::default()
    };
    let source = "i32 a;\n".repeat(2_000);
    let compilation = compile_with(&source, &config);
    assert!(compilation.diagnostics.is_empty());
}

#[test]
fn test_compile_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "fn main() i32 {{ return 0; }}").unwrap();

    let compilation = compile_file(file.path(), &ParserConfig::default()).unwrap();
    assert!(compilation.diagnostics.is_empty());
    assert_eq!(compilation.code().len(), 3);
}

#[test]
fn test_missing_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.crs");

    let err = compile_file(&path, &ParserConfig::default()).unwrap_err();
    assert!(matches!(err, CompileError::Io { .. }));
    assert!(err.to_string().contains("missing.crs"));
}
