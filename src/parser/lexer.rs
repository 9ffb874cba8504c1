//! Lexer (token source) for Crust source code
//!
//! Converts raw source text into classified [`Token`]s on demand. The parser pulls
//! one token at a time through the [`TokenSource`] trait and may look exactly one
//! token ahead with [`TokenSource::peek_token`] without committing to it.
//!
//! Lexical errors never stop the scan: the offending text is returned as a
//! [`TokenKind::Unknown`] token and a diagnostic is recorded.

use super::ast::SourceLocation;
use crate::error::{CompileError, Diagnostic, LexError};
use std::fmt;
use std::fs;
use std::path::Path;

/// Classified lexical units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    // Primitive types
    KwI32,
    KwI64,
    KwU32,
    KwU64,
    KwF32,
    KwF64,
    KwString,
    KwBool,
    KwVoid,

    // Keywords
    KwTrue,
    KwFalse,
    KwLet,
    KwConst,
    KwIf,
    KwElif,
    KwElse,
    KwFor,
    KwIn,
    KwWhile,
    KwBreak,
    KwContinue,
    KwFn,
    KwReturn,
    KwImport,
    KwExport,

    // Literals
    IntLiteral,
    FloatLiteral,
    StrLiteral,

    Identifier,

    // Binary operators
    OpPlus,
    OpMinus,
    OpMult,
    OpDiv,
    OpMod,
    OpAnd,
    OpOr,
    OpGt,
    OpGe,
    OpEq,
    OpNe,
    OpLe,
    OpLt,

    // Punctuation
    Dot,
    SemiColon,
    Colon,
    Comma,
    Amp,
    Range,
    Assign,
    Namespace,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,

    Comment,
    Eof,
    Unknown,
}

impl TokenKind {
    /// Keywords naming a primitive type (`i32` through `void`)
    pub fn is_primitive_type(self) -> bool {
        matches!(
            self,
            TokenKind::KwI32
                | TokenKind::KwI64
                | TokenKind::KwU32
                | TokenKind::KwU64
                | TokenKind::KwF32
                | TokenKind::KwF64
                | TokenKind::KwString
                | TokenKind::KwBool
                | TokenKind::KwVoid
        )
    }

    pub fn is_binary_operator(self) -> bool {
        matches!(
            self,
            TokenKind::OpPlus
                | TokenKind::OpMinus
                | TokenKind::OpMult
                | TokenKind::OpDiv
                | TokenKind::OpMod
                | TokenKind::OpAnd
                | TokenKind::OpOr
                | TokenKind::OpGt
                | TokenKind::OpGe
                | TokenKind::OpEq
                | TokenKind::OpNe
                | TokenKind::OpLe
                | TokenKind::OpLt
        )
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::IntLiteral
                | TokenKind::FloatLiteral
                | TokenKind::StrLiteral
                | TokenKind::KwTrue
                | TokenKind::KwFalse
        )
    }

    /// Upper-case tag used to name token leaves in the syntax tree
    pub fn tag(self) -> &'static str {
        match self {
            TokenKind::KwI32 => "KW_I32",
            TokenKind::KwI64 => "KW_I64",
            TokenKind::KwU32 => "KW_U32",
            TokenKind::KwU64 => "KW_U64",
            TokenKind::KwF32 => "KW_F32",
            TokenKind::KwF64 => "KW_F64",
            TokenKind::KwString => "KW_STRING",
            TokenKind::KwBool => "KW_BOOL",
            TokenKind::KwVoid => "KW_VOID",
            TokenKind::KwTrue => "KW_TRUE",
            TokenKind::KwFalse => "KW_FALSE",
            TokenKind::KwLet => "KW_LET",
            TokenKind::KwConst => "KW_CONST",
            TokenKind::KwIf => "KW_IF",
            TokenKind::KwElif => "KW_ELIF",
            TokenKind::KwElse => "KW_ELSE",
            TokenKind::KwFor => "KW_FOR",
            TokenKind::KwIn => "KW_IN",
            TokenKind::KwWhile => "KW_WHILE",
            TokenKind::KwBreak => "KW_BREAK",
            TokenKind::KwContinue => "KW_CONTINUE",
            TokenKind::KwFn => "KW_FN",
            TokenKind::KwReturn => "KW_RETURN",
            TokenKind::KwImport => "KW_IMPORT",
            TokenKind::KwExport => "KW_EXPORT",
            TokenKind::IntLiteral => "INT_LITERAL",
            TokenKind::FloatLiteral => "FLOAT_LITERAL",
            TokenKind::StrLiteral => "STR_LITERAL",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::OpPlus => "OP_PLUS",
            TokenKind::OpMinus => "OP_MINUS",
            TokenKind::OpMult => "OP_MULT",
            TokenKind::OpDiv => "OP_DIV",
            TokenKind::OpMod => "OP_MOD",
            TokenKind::OpAnd => "OP_AND",
            TokenKind::OpOr => "OP_OR",
            TokenKind::OpGt => "OP_GT",
            TokenKind::OpGe => "OP_GE",
            TokenKind::OpEq => "OP_EQ",
            TokenKind::OpNe => "OP_NE",
            TokenKind::OpLe => "OP_LE",
            TokenKind::OpLt => "OP_LT",
            TokenKind::Dot => "DOT",
            TokenKind::SemiColon => "SEMI_COLON",
            TokenKind::Colon => "COLON",
            TokenKind::Comma => "COMMA",
            TokenKind::Amp => "AMP",
            TokenKind::Range => "RANGE",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Namespace => "NAMESPACE",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::Comment => "COMMENT",
            TokenKind::Eof => "EOF",
            TokenKind::Unknown => "UNKNOWN",
        }
    }

    /// Source spelling of operators and punctuation
    pub fn symbol(self) -> Option<&'static str> {
        let symbol = match self {
            TokenKind::OpPlus => "+",
            TokenKind::OpMinus => "-",
            TokenKind::OpMult => "*",
            TokenKind::OpDiv => "/",
            TokenKind::OpMod => "%",
            TokenKind::OpAnd => "and",
            TokenKind::OpOr => "or",
            TokenKind::OpGt => ">",
            TokenKind::OpGe => ">=",
            TokenKind::OpEq => "==",
            TokenKind::OpNe => "!=",
            TokenKind::OpLe => "<=",
            TokenKind::OpLt => "<",
            TokenKind::Dot => ".",
            TokenKind::SemiColon => ";",
            TokenKind::Colon => ":",
            TokenKind::Comma => ",",
            TokenKind::Amp => "&",
            TokenKind::Range => "..",
            TokenKind::Assign => "=",
            TokenKind::Namespace => "::",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Comment => "//",
            _ => return None,
        };
        Some(symbol)
    }

    fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "i32" => TokenKind::KwI32,
            "i64" => TokenKind::KwI64,
            "u32" => TokenKind::KwU32,
            "u64" => TokenKind::KwU64,
            "f32" => TokenKind::KwF32,
            "f64" => TokenKind::KwF64,
            "string" => TokenKind::KwString,
            "bool" => TokenKind::KwBool,
            "void" => TokenKind::KwVoid,
            "true" => TokenKind::KwTrue,
            "false" => TokenKind::KwFalse,
            "let" => TokenKind::KwLet,
            "const" => TokenKind::KwConst,
            "if" => TokenKind::KwIf,
            "elif" => TokenKind::KwElif,
            "else" => TokenKind::KwElse,
            "for" => TokenKind::KwFor,
            "in" => TokenKind::KwIn,
            "while" => TokenKind::KwWhile,
            "break" => TokenKind::KwBreak,
            "continue" => TokenKind::KwContinue,
            "fn" => TokenKind::KwFn,
            "return" => TokenKind::KwReturn,
            "import" => TokenKind::KwImport,
            "export" => TokenKind::KwExport,
            "and" => TokenKind::OpAnd,
            "or" => TokenKind::OpOr,
            _ => return None,
        };
        Some(kind)
    }

    fn keyword_text(self) -> Option<&'static str> {
        let text = match self {
            TokenKind::KwI32 => "i32",
            TokenKind::KwI64 => "i64",
            TokenKind::KwU32 => "u32",
            TokenKind::KwU64 => "u64",
            TokenKind::KwF32 => "f32",
            TokenKind::KwF64 => "f64",
            TokenKind::KwString => "string",
            TokenKind::KwBool => "bool",
            TokenKind::KwVoid => "void",
            TokenKind::KwTrue => "true",
            TokenKind::KwFalse => "false",
            TokenKind::KwLet => "let",
            TokenKind::KwConst => "const",
            TokenKind::KwIf => "if",
            TokenKind::KwElif => "elif",
            TokenKind::KwElse => "else",
            TokenKind::KwFor => "for",
            TokenKind::KwIn => "in",
            TokenKind::KwWhile => "while",
            TokenKind::KwBreak => "break",
            TokenKind::KwContinue => "continue",
            TokenKind::KwFn => "fn",
            TokenKind::KwReturn => "return",
            TokenKind::KwImport => "import",
            TokenKind::KwExport => "export",
            _ => return None,
        };
        Some(text)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.keyword_text().or_else(|| self.symbol()) {
            return write!(f, "'{text}'");
        }
        match self {
            TokenKind::IntLiteral => write!(f, "integer literal"),
            TokenKind::FloatLiteral => write!(f, "float literal"),
            TokenKind::StrLiteral => write!(f, "string literal"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Eof => write!(f, "end of file"),
            _ => write!(f, "unknown token"),
        }
    }
}

/// Concrete value carried by identifier and literal tokens
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Str(String),
    Int(i64),
    Float(f64),
}

/// A classified lexical unit with its optional value and start position
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: Option<TokenValue>,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, location: SourceLocation) -> Self {
        Token {
            kind,
            value: None,
            location,
        }
    }

    pub fn with_value(kind: TokenKind, value: TokenValue, location: SourceLocation) -> Self {
        Token {
            kind,
            value: Some(value),
            location,
        }
    }

    /// Identifier or string text, if this token carries one
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            Some(TokenValue::Str(s)) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.value) {
            (TokenKind::Identifier, Some(TokenValue::Str(s))) => write!(f, "identifier '{s}'"),
            (TokenKind::StrLiteral, Some(TokenValue::Str(s))) => {
                write!(f, "string literal \"{s}\"")
            }
            (_, Some(TokenValue::Int(n))) => write!(f, "integer literal {n}"),
            (_, Some(TokenValue::Float(x))) => write!(f, "float literal {x:?}"),
            (kind, _) => write!(f, "{kind}"),
        }
    }
}

/// Interface the parser consumes tokens through
pub trait TokenSource {
    /// Commit to and return the next token. Returns `Eof` forever once input ends.
    fn next_token(&mut self) -> Token;

    /// The token the next call to [`TokenSource::next_token`] will return
    fn peek_token(&mut self) -> &Token;

    /// Position the scanner has reached
    fn current_location(&self) -> SourceLocation;

    /// Lexical diagnostics recorded since the last call
    fn take_diagnostics(&mut self) -> Vec<Diagnostic>;
}

/// Lexer for Crust source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    peeked: Option<Token>,
    diagnostics: Vec<Diagnostic>,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            peeked: None,
            diagnostics: Vec::new(),
        }
    }

    /// Read the whole file up front. Failure here is fatal for the compile.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CompileError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| CompileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(&source))
    }

    /// Tokenize the remaining input, comments excluded, ending with `Eof`
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    /// Next raw token, comments included
    fn scan(&mut self) -> Token {
        self.skip_whitespace();

        let loc = self.current_location();
        let Some(ch) = self.advance() else {
            return Token::new(TokenKind::Eof, loc);
        };

        let kind = match ch {
            '.' => {
                if self.match_char('.') {
                    TokenKind::Range
                } else {
                    TokenKind::Dot
                }
            }
            ':' => {
                if self.match_char(':') {
                    TokenKind::Namespace
                } else {
                    TokenKind::Colon
                }
            }
            '=' => {
                if self.match_char('=') {
                    TokenKind::OpEq
                } else {
                    TokenKind::Assign
                }
            }
            '>' => {
                if self.match_char('=') {
                    TokenKind::OpGe
                } else {
                    TokenKind::OpGt
                }
            }
            '<' => {
                if self.match_char('=') {
                    TokenKind::OpLe
                } else {
                    TokenKind::OpLt
                }
            }
            '!' => {
                if self.match_char('=') {
                    TokenKind::OpNe
                } else {
                    self.error(LexError::InvalidSymbol('!'), loc);
                    TokenKind::Unknown
                }
            }
            '/' => {
                if self.match_char('/') {
                    self.skip_line_comment();
                    TokenKind::Comment
                } else {
                    TokenKind::OpDiv
                }
            }
            ',' => TokenKind::Comma,
            ';' => TokenKind::SemiColon,
            '&' => TokenKind::Amp,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '+' => TokenKind::OpPlus,
            '-' => TokenKind::OpMinus,
            '*' => TokenKind::OpMult,
            '%' => TokenKind::OpMod,

            '"' => return self.string_literal(loc),
            '0'..='9' => return self.number_literal(ch, loc),
            'a'..='z' | 'A'..='Z' | '_' => return self.identifier_or_keyword(ch, loc),

            other => {
                self.error(LexError::InvalidSymbol(other), loc);
                TokenKind::Unknown
            }
        };

        Token::new(kind, loc)
    }

    /// Parse string literal. A literal may not span lines.
    fn string_literal(&mut self, loc: SourceLocation) -> Token {
        let mut string = String::new();

        loop {
            match self.peek() {
                None => {
                    self.error(LexError::MissingClosingQuote, loc);
                    return Token::new(TokenKind::Unknown, loc);
                }
                Some('\n') => {
                    self.error(LexError::NewLineInLiteral, self.current_location());
                    // Resume after the quote that would have closed it
                    while let Some(ch) = self.advance() {
                        if ch == '"' {
                            break;
                        }
                    }
                    return Token::new(TokenKind::Unknown, loc);
                }
                Some('"') => {
                    self.advance();
                    return Token::with_value(TokenKind::StrLiteral, TokenValue::Str(string), loc);
                }
                Some(ch) => {
                    string.push(ch);
                    self.advance();
                }
            }
        }
    }

    /// Parse numeric literal: digits, optionally `.` and more digits for a float
    fn number_literal(&mut self, first_digit: char, loc: SourceLocation) -> Token {
        let mut num_str = String::new();
        num_str.push(first_digit);
        self.take_digits(&mut num_str);

        // `0..10` is a range, not the float `0.`
        let is_float = self.peek() == Some('.') && self.peek_ahead(1) != Some('.');
        if is_float {
            num_str.push('.');
            self.advance();
            self.take_digits(&mut num_str);
        }

        if matches!(self.peek(), Some(ch) if ch.is_ascii_alphabetic() || ch == '_') {
            while let Some(ch) = self.peek() {
                if ch.is_ascii_alphanumeric() || ch == '_' {
                    num_str.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
            self.error(LexError::NumberBadSuffix(num_str), loc);
            return Token::new(TokenKind::Unknown, loc);
        }

        if is_float {
            match num_str.parse::<f64>() {
                Ok(value) => Token::with_value(TokenKind::FloatLiteral, TokenValue::Float(value), loc),
                Err(_) => {
                    self.error(LexError::NumberBadSuffix(num_str), loc);
                    Token::new(TokenKind::Unknown, loc)
                }
            }
        } else {
            match num_str.parse::<i64>() {
                Ok(value) => Token::with_value(TokenKind::IntLiteral, TokenValue::Int(value), loc),
                Err(_) => {
                    self.error(LexError::IntegerOutOfRange(num_str), loc);
                    Token::new(TokenKind::Unknown, loc)
                }
            }
        }
    }

    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match TokenKind::keyword(&ident) {
            Some(kind) => Token::new(kind, loc),
            None => Token::with_value(TokenKind::Identifier, TokenValue::Str(ident), loc),
        }
    }

    fn take_digits(&mut self, buf: &mut String) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                buf.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_whitespace()) {
            self.advance();
        }
    }

    /// Skip the rest of a `//` comment, leaving the newline
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn error(&mut self, error: LexError, location: SourceLocation) {
        tracing::trace!(%error, line = location.line, column = location.column, "lexical error");
        self.diagnostics.push(Diagnostic::lexical(error, location));
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn scan_significant(&mut self) -> Token {
        loop {
            let token = self.scan();
            if token.kind != TokenKind::Comment {
                return token;
            }
        }
    }
}

impl TokenSource for Lexer {
    fn next_token(&mut self) -> Token {
        match self.peeked.take() {
            Some(token) => token,
            None => self.scan_significant(),
        }
    }

    fn peek_token(&mut self) -> &Token {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.scan_significant(),
        };
        self.peeked.insert(token)
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }

    fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_tokens() {
        let mut lexer = Lexer::new("fn main() i32 { return 0; }");
        let tokens = lexer.tokenize();

        assert_eq!(tokens[0].kind, TokenKind::KwFn);
        assert_eq!(tokens[1].text(), Some("main"));
        assert_eq!(tokens[2].kind, TokenKind::LParen);
        assert_eq!(tokens[3].kind, TokenKind::RParen);
        assert_eq!(tokens[4].kind, TokenKind::KwI32);
        assert_eq!(tokens[5].kind, TokenKind::LBrace);
        assert_eq!(tokens[6].kind, TokenKind::KwReturn);
        assert_eq!(tokens[7].value, Some(TokenValue::Int(0)));
        assert_eq!(tokens[8].kind, TokenKind::SemiColon);
        assert_eq!(tokens[9].kind, TokenKind::RBrace);
        assert_eq!(tokens[10].kind, TokenKind::Eof);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("+ - * / % and or > >= == != <= < = .. . :: :"),
            vec![
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
                TokenKind::Assign,
                TokenKind::Range,
                TokenKind::Dot,
                TokenKind::Namespace,
                TokenKind::Colon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let tokens = Lexer::new("elif lett fnimport bool").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::KwElif);
        assert_eq!(tokens[1].text(), Some("lett"));
        assert_eq!(tokens[2].text(), Some("fnimport"));
        assert_eq!(tokens[3].kind, TokenKind::KwBool);
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("i32 x; // trailing\ni32 y;"),
            vec![
                TokenKind::KwI32,
                TokenKind::Identifier,
                TokenKind::SemiColon,
                TokenKind::KwI32,
                TokenKind::Identifier,
                TokenKind::SemiColon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numeric_literals() {
        let tokens = Lexer::new("132 69.35 420. 0..10").tokenize();
        assert_eq!(tokens[0].value, Some(TokenValue::Int(132)));
        assert_eq!(tokens[1].value, Some(TokenValue::Float(69.35)));
        assert_eq!(tokens[2].value, Some(TokenValue::Float(420.0)));
        assert_eq!(tokens[3].value, Some(TokenValue::Int(0)));
        assert_eq!(tokens[4].kind, TokenKind::Range);
        assert_eq!(tokens[5].value, Some(TokenValue::Int(10)));
    }

    #[test]
    fn test_string_literal() {
        let tokens = Lexer::new(r#""Never gonna give you up""#).tokenize();
        assert_eq!(tokens[0].kind, TokenKind::StrLiteral);
        assert_eq!(tokens[0].text(), Some("Never gonna give you up"));
    }

    #[test]
    fn test_lexical_errors_become_unknown() {
        let mut lexer = Lexer::new("12ab ; \"open\nx\" ! $ \"tail");
        let tokens = lexer.tokenize();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Unknown,
                TokenKind::SemiColon,
                TokenKind::Unknown,
                TokenKind::Unknown,
                TokenKind::Unknown,
                TokenKind::Unknown,
                TokenKind::Eof,
            ]
        );

        let errors: Vec<_> = lexer
            .take_diagnostics()
            .into_iter()
            .map(|d| d.kind)
            .collect();
        assert_eq!(
            errors,
            vec![
                crate::error::DiagnosticKind::Lexical(LexError::NumberBadSuffix("12ab".into())),
                crate::error::DiagnosticKind::Lexical(LexError::NewLineInLiteral),
                crate::error::DiagnosticKind::Lexical(LexError::InvalidSymbol('!')),
                crate::error::DiagnosticKind::Lexical(LexError::InvalidSymbol('$')),
                crate::error::DiagnosticKind::Lexical(LexError::MissingClosingQuote),
            ]
        );
    }

    #[test]
    fn test_integer_out_of_range() {
        let mut lexer = Lexer::new("99999999999999999999 7");
        let tokens = lexer.tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Unknown);
        assert_eq!(tokens[1].value, Some(TokenValue::Int(7)));

        let errors: Vec<_> = lexer.take_diagnostics();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].kind,
            crate::error::DiagnosticKind::Lexical(LexError::IntegerOutOfRange(
                "99999999999999999999".into()
            ))
        );
        assert_eq!(errors[0].location, SourceLocation::new(1, 1));
    }

    #[test]
    fn test_peek_does_not_commit() {
        let mut lexer = Lexer::new("a = 1");
        assert_eq!(lexer.peek_token().kind, TokenKind::Identifier);
        assert_eq!(lexer.peek_token().kind, TokenKind::Identifier);
        assert_eq!(lexer.next_token().text(), Some("a"));
        assert_eq!(lexer.peek_token().kind, TokenKind::Assign);
        assert_eq!(lexer.next_token().kind, TokenKind::Assign);
        assert_eq!(lexer.next_token().value, Some(TokenValue::Int(1)));
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn test_locations() {
        let tokens = Lexer::new("i32 x;\n  x = 2;").tokenize();
        assert_eq!(tokens[0].location, SourceLocation::new(1, 1));
        assert_eq!(tokens[1].location, SourceLocation::new(1, 5));
        assert_eq!(tokens[3].location, SourceLocation::new(2, 3));
    }
}
