//! Token cursor with lookahead and snapshots.

use vela_diagnostic::ErrorCode;
use vela_ir::ast::Ident;
use vela_ir::{Span, Token, TokenKind, TokenList};

use crate::ParseError;

pub(crate) struct Cursor<'a> {
    tokens: &'a TokenList,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(tokens: &'a TokenList) -> Self {
        Cursor { tokens, pos: 0 }
    }

    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Rewind to a position returned by [`Cursor::position`].
    #[inline]
    pub(crate) fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    #[inline]
    pub(crate) fn current(&self) -> Token {
        self.tokens.get(self.pos)
    }

    #[inline]
    pub(crate) fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    #[inline]
    pub(crate) fn current_span(&self) -> Span {
        self.current().span
    }

    /// Span of the last consumed token.
    pub(crate) fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1) {
            Some(prev) => self.tokens.get(prev).span,
            None => Span::point(0),
        }
    }

    #[inline]
    pub(crate) fn peek_kind(&self, n: usize) -> TokenKind {
        self.tokens.get(self.pos + n).kind
    }

    #[inline]
    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Current token has the same variant as `kind`.
    #[inline]
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind().same_kind(kind)
    }

    #[inline]
    pub(crate) fn check_ident(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Ident(_))
    }

    /// Current token ends exactly where the next one starts.
    pub(crate) fn current_and_next_adjacent(&self) -> bool {
        self.current_span().end == self.tokens.get(self.pos + 1).span.start
    }

    /// Current token starts exactly where the previous one ended.
    pub(crate) fn adjacent_to_previous(&self) -> bool {
        self.pos > 0 && self.previous_span().end == self.current_span().start
    }

    /// `>` immediately followed by `>`.
    pub(crate) fn is_shift_right(&self) -> bool {
        self.check(&TokenKind::Gt)
            && matches!(self.peek_kind(1), TokenKind::Gt)
            && self.current_and_next_adjacent()
    }

    /// `+` immediately followed by `+`.
    pub(crate) fn is_successor(&self) -> bool {
        self.check(&TokenKind::Plus)
            && matches!(self.peek_kind(1), TokenKind::Plus)
            && self.current_and_next_adjacent()
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    pub(crate) fn expect_ident(&mut self) -> Result<Ident, ParseError> {
        let token = self.current();
        if let TokenKind::Ident(name) = token.kind {
            self.advance();
            Ok(Ident::new(name, token.span))
        } else if self.is_at_end() {
            Err(self.end_of_input())
        } else {
            Err(ParseError::new(
                ErrorCode::E1003,
                format!("expected identifier, found {}", token.kind),
                token.span,
            ))
        }
    }

    /// Error for a token that does not fit. Running out of input gets its
    /// own lexical code.
    #[cold]
    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        if self.is_at_end() {
            return ParseError::new(
                ErrorCode::E0008,
                format!("unexpected end of input, expected {expected}"),
                self.current_span(),
            );
        }
        ParseError::new(
            ErrorCode::E1001,
            format!("expected {expected}, found {}", self.current_kind()),
            self.current_span(),
        )
    }

    #[cold]
    pub(crate) fn end_of_input(&self) -> ParseError {
        ParseError::new(
            ErrorCode::E0008,
            "unexpected end of input",
            self.current_span(),
        )
    }
}
