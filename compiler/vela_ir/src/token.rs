//! Tokens produced by the lexer.

use std::fmt;

use crate::{Literal, Name, Span};

/// Token classification.
///
/// Identifiers and literals carry their cooked payload; everything else is
/// a keyword or punctuation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TokenKind {
    Ident(Name),
    Literal(Literal),

    // Statement keywords
    Using,
    Module,
    Var,
    Const,
    Typedef,
    Enum,

    // Clause keywords
    For,
    In,
    Let,
    Where,
    Order,
    Asc,
    Desc,
    Return,

    // Control flow
    If,
    Then,
    Else,
    Case,
    When,
    End,
    Try,
    Catch,

    // Word operators
    And,
    Or,
    Xor,
    Not,
    Like,
    Matches,
    IfNull,
    Exists,
    IsNull,

    True,
    False,
    Null,
    Key,
    Ref,

    // Single-character symbols
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Eq,
    Lt,
    Gt,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,
    Question,
    Backslash,

    // Compound symbols
    ColonEq,
    QuestionEq,
    StarStar,
    GtEq,
    LtEq,
    NotEq,
    Shl,
    FatArrow,
    Arrow,
    DotDot,

    Eof,
}

impl TokenKind {
    /// Keyword for `word`, if it is one.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "using" => TokenKind::Using,
            "module" => TokenKind::Module,
            "var" => TokenKind::Var,
            "const" => TokenKind::Const,
            "typedef" => TokenKind::Typedef,
            "enum" => TokenKind::Enum,
            "for" => TokenKind::For,
            "in" => TokenKind::In,
            "let" => TokenKind::Let,
            "where" => TokenKind::Where,
            "order" => TokenKind::Order,
            "asc" => TokenKind::Asc,
            "desc" => TokenKind::Desc,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "then" => TokenKind::Then,
            "else" => TokenKind::Else,
            "case" => TokenKind::Case,
            "when" => TokenKind::When,
            "end" => TokenKind::End,
            "try" => TokenKind::Try,
            "catch" => TokenKind::Catch,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "xor" => TokenKind::Xor,
            "not" => TokenKind::Not,
            "like" => TokenKind::Like,
            "matches" => TokenKind::Matches,
            "ifnull" => TokenKind::IfNull,
            "exists" => TokenKind::Exists,
            "isnull" => TokenKind::IsNull,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "key" => TokenKind::Key,
            "ref" => TokenKind::Ref,
            _ => return None,
        };
        Some(kind)
    }

    /// Compound symbol for a two-byte sequence.
    pub fn compound(first: u8, second: u8) -> Option<TokenKind> {
        let kind = match (first, second) {
            (b':', b'=') => TokenKind::ColonEq,
            (b'?', b'=') => TokenKind::QuestionEq,
            (b'*', b'*') => TokenKind::StarStar,
            (b'>', b'=') => TokenKind::GtEq,
            (b'<', b'=') => TokenKind::LtEq,
            (b'<', b'>') => TokenKind::NotEq,
            (b'<', b'<') => TokenKind::Shl,
            (b'=', b'>') => TokenKind::FatArrow,
            (b'-', b'>') => TokenKind::Arrow,
            (b'.', b'.') => TokenKind::DotDot,
            _ => return None,
        };
        Some(kind)
    }

    /// Single-character symbol.
    pub fn symbol(byte: u8) -> Option<TokenKind> {
        let kind = match byte {
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,
            b'&' => TokenKind::Amp,
            b'|' => TokenKind::Pipe,
            b'^' => TokenKind::Caret,
            b'~' => TokenKind::Tilde,
            b'=' => TokenKind::Eq,
            b'<' => TokenKind::Lt,
            b'>' => TokenKind::Gt,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b',' => TokenKind::Comma,
            b':' => TokenKind::Colon,
            b'.' => TokenKind::Dot,
            b'?' => TokenKind::Question,
            b'\\' => TokenKind::Backslash,
            _ => return None,
        };
        Some(kind)
    }

    /// Human-readable description used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Ident(_) => "identifier",
            TokenKind::Literal(_) => "literal",
            TokenKind::Using => "`using`",
            TokenKind::Module => "`module`",
            TokenKind::Var => "`var`",
            TokenKind::Const => "`const`",
            TokenKind::Typedef => "`typedef`",
            TokenKind::Enum => "`enum`",
            TokenKind::For => "`for`",
            TokenKind::In => "`in`",
            TokenKind::Let => "`let`",
            TokenKind::Where => "`where`",
            TokenKind::Order => "`order`",
            TokenKind::Asc => "`asc`",
            TokenKind::Desc => "`desc`",
            TokenKind::Return => "`return`",
            TokenKind::If => "`if`",
            TokenKind::Then => "`then`",
            TokenKind::Else => "`else`",
            TokenKind::Case => "`case`",
            TokenKind::When => "`when`",
            TokenKind::End => "`end`",
            TokenKind::Try => "`try`",
            TokenKind::Catch => "`catch`",
            TokenKind::And => "`and`",
            TokenKind::Or => "`or`",
            TokenKind::Xor => "`xor`",
            TokenKind::Not => "`not`",
            TokenKind::Like => "`like`",
            TokenKind::Matches => "`matches`",
            TokenKind::IfNull => "`ifnull`",
            TokenKind::Exists => "`exists`",
            TokenKind::IsNull => "`isnull`",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::Null => "`null`",
            TokenKind::Key => "`key`",
            TokenKind::Ref => "`ref`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
            TokenKind::Amp => "`&`",
            TokenKind::Pipe => "`|`",
            TokenKind::Caret => "`^`",
            TokenKind::Tilde => "`~`",
            TokenKind::Eq => "`=`",
            TokenKind::Lt => "`<`",
            TokenKind::Gt => "`>`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::Comma => "`,`",
            TokenKind::Colon => "`:`",
            TokenKind::Dot => "`.`",
            TokenKind::Question => "`?`",
            TokenKind::Backslash => "`\\`",
            TokenKind::ColonEq => "`:=`",
            TokenKind::QuestionEq => "`?=`",
            TokenKind::StarStar => "`**`",
            TokenKind::GtEq => "`>=`",
            TokenKind::LtEq => "`<=`",
            TokenKind::NotEq => "`<>`",
            TokenKind::Shl => "`<<`",
            TokenKind::FatArrow => "`=>`",
            TokenKind::Arrow => "`->`",
            TokenKind::DotDot => "`..`",
            TokenKind::Eof => "end of input",
        }
    }

    /// Same variant, ignoring payloads.
    pub fn same_kind(&self, other: &TokenKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

/// Lexer output: every token of a script, terminated by a single
/// [`TokenKind::Eof`].
#[derive(Clone, Debug, Default)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    pub fn new() -> Self {
        TokenList { tokens: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        TokenList {
            tokens: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Token at `index`, clamped to the final token.
    ///
    /// Reading past the end keeps returning the terminator, so the parser
    /// can look ahead freely.
    pub fn get(&self, index: usize) -> Token {
        match self.tokens.get(index) {
            Some(token) => *token,
            None => self
                .tokens
                .last()
                .copied()
                .unwrap_or(Token::new(TokenKind::Eof, Span::DUMMY)),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }
}

impl<'a> IntoIterator for &'a TokenList {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_past_end_returns_terminator() {
        let mut list = TokenList::new();
        list.push(Token::new(TokenKind::Plus, Span::new(0, 1)));
        list.push(Token::new(TokenKind::Eof, Span::point(1)));
        assert_eq!(list.get(10).kind, TokenKind::Eof);
    }

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(TokenKind::keyword("return"), Some(TokenKind::Return));
        assert_eq!(TokenKind::keyword("Return"), None);
    }

    #[test]
    fn compound_symbols_are_two_bytes() {
        assert_eq!(TokenKind::compound(b'<', b'>'), Some(TokenKind::NotEq));
        assert_eq!(TokenKind::compound(b'>', b'>'), None);
    }
}
