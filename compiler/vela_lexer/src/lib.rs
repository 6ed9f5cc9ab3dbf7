//! Lexer for the Vela query language.
//!
//! [`lex`] turns script text into a [`TokenList`] in one pass. Whitespace
//! and comments (`-- line`, nested `/* block */`) are skipped before each
//! token. Literals are cooked here, so the parser only ever sees values:
//!
//! | text                         | literal        |
//! |------------------------------|----------------|
//! | `42`, `0x2A`                 | `Integer`      |
//! | `42L`, `0x2AL`               | `Long`         |
//! | `4.2`, `42e-1`               | `Double`       |
//! | `1.2.3`, `1.2.3.4`           | `Version`      |
//! | `"text"`, `'it''s'`          | `String`       |
//! | `"x"c` `"a\b"n` `"2024-01-01"d` / `dt` `"12:00"t` / `ts` `"…"g` | tagged |
//!
//! A `>>` is never produced: the parser joins two adjacent `>` tokens, so
//! nested type arguments close cleanly.

mod cursor;
mod lex_error;
mod number;
mod string;

use vela_ir::{Span, StringInterner, Token, TokenKind, TokenList};

use cursor::Cursor;
pub use lex_error::{LexError, LexErrorKind};

/// Lex `source` completely. The returned list always ends with
/// [`TokenKind::Eof`].
pub fn lex(source: &str, interner: &StringInterner) -> Result<TokenList, LexError> {
    let mut lexer = Lexer {
        cursor: Cursor::new(source),
        interner,
    };
    let mut tokens = TokenList::with_capacity(source.len() / 4 + 1);
    loop {
        lexer.skip_trivia()?;
        if lexer.cursor.is_eof() {
            tokens.push(Token::new(
                TokenKind::Eof,
                Span::point(lexer.cursor.offset()),
            ));
            return Ok(tokens);
        }
        tokens.push(lexer.next_token()?);
    }
}

struct Lexer<'src, 'i> {
    cursor: Cursor<'src>,
    interner: &'i StringInterner,
}

impl Lexer<'_, '_> {
    fn span_from(&self, start: usize) -> Span {
        Span::new(
            u32::try_from(start).unwrap_or(u32::MAX),
            self.cursor.offset(),
        )
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match (self.cursor.current(), self.cursor.peek(1)) {
                (Some(b' ' | b'\t' | b'\r' | b'\n'), _) => {
                    self.cursor
                        .eat_while(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'));
                }
                (Some(b'-'), Some(b'-')) => {
                    self.cursor.skip_to(b'\n');
                }
                (Some(b'/'), Some(b'*')) => self.skip_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    /// Block comments nest: `/* a /* b */ c */` is one comment.
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start = self.cursor.pos();
        self.cursor.advance_by(2);
        let mut depth = 1usize;
        while depth > 0 {
            if !self.cursor.skip_to_either(b'*', b'/') {
                return Err(LexError::new(
                    self.span_from(start),
                    LexErrorKind::UnterminatedComment,
                ));
            }
            match (self.cursor.current(), self.cursor.peek(1)) {
                (Some(b'*'), Some(b'/')) => {
                    depth -= 1;
                    self.cursor.advance_by(2);
                }
                (Some(b'/'), Some(b'*')) => {
                    depth += 1;
                    self.cursor.advance_by(2);
                }
                _ => self.cursor.advance(),
            }
        }
        Ok(())
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        let start = self.cursor.pos();
        let Some(byte) = self.cursor.current() else {
            return Ok(Token::new(TokenKind::Eof, self.span_from(start)));
        };

        let kind = match byte {
            b'0'..=b'9' => self.number()?,
            b'"' | b'\'' => self.string(byte)?,
            b if b.is_ascii_alphabetic() || b == b'_' => self.identifier(),
            b if b >= 0x80 => {
                match self.cursor.current_char() {
                    Some(c) if c.is_alphabetic() => self.identifier(),
                    Some(c) => {
                        self.cursor.advance_char();
                        return Err(LexError::new(
                            self.span_from(start),
                            LexErrorKind::IllegalCharacter(c),
                        ));
                    }
                    None => {
                        self.cursor.advance();
                        return Err(LexError::new(
                            self.span_from(start),
                            LexErrorKind::IllegalCharacter(char::REPLACEMENT_CHARACTER),
                        ));
                    }
                }
            }
            _ => self.symbol(byte, start)?,
        };
        Ok(Token::new(kind, self.span_from(start)))
    }

    fn identifier(&mut self) -> TokenKind {
        let start = self.cursor.pos();
        while let Some(c) = self.cursor.current_char() {
            if c.is_alphanumeric() || c == '_' {
                self.cursor.advance_char();
            } else {
                break;
            }
        }
        let text = self.cursor.slice_from(start);
        TokenKind::keyword(text).unwrap_or_else(|| TokenKind::Ident(self.interner.intern(text)))
    }

    /// Longest match over the compound symbol set, then single symbols.
    fn symbol(&mut self, byte: u8, start: usize) -> Result<TokenKind, LexError> {
        if let Some(kind) = self
            .cursor
            .peek(1)
            .and_then(|next| TokenKind::compound(byte, next))
        {
            self.cursor.advance_by(2);
            return Ok(kind);
        }
        match TokenKind::symbol(byte) {
            Some(kind) => {
                self.cursor.advance();
                Ok(kind)
            }
            None => {
                let c = self.cursor.current_char().unwrap_or(char::from(byte));
                self.cursor.advance_char();
                Err(LexError::new(
                    self.span_from(start),
                    LexErrorKind::IllegalCharacter(c),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests;
