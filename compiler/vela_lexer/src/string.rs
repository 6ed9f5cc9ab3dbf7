//! String literals and their type suffixes.
//!
//! `"..."` takes C-style backslash escapes; `'...'` takes none and writes
//! a quote as `''`. Either may be followed directly by a suffix that
//! retags the text.

use uuid::Uuid;
use vela_ir::{Literal, Span, TokenKind};

use crate::{LexError, LexErrorKind, Lexer};

impl Lexer<'_, '_> {
    pub(crate) fn string(&mut self, quote: u8) -> Result<TokenKind, LexError> {
        let start = self.cursor.pos();
        self.cursor.advance();
        let text = if quote == b'"' {
            self.c_style_body(start)?
        } else {
            self.pascal_style_body(start)?
        };

        let suffix_start = self.cursor.pos();
        self.cursor.eat_while(|b| b.is_ascii_alphanumeric() || b == b'_');
        let suffix = self.cursor.slice_from(suffix_start);
        let span = self.span_from(start);
        self.tag(&text, suffix, span).map(TokenKind::Literal)
    }

    fn c_style_body(&mut self, start: usize) -> Result<String, LexError> {
        let mut out = String::new();
        loop {
            let run_start = self.cursor.pos();
            if !self.cursor.skip_to_either(b'"', b'\\') {
                return Err(LexError::new(
                    self.span_from(start),
                    LexErrorKind::UnterminatedString,
                ));
            }
            out.push_str(self.cursor.slice_from(run_start));
            if self.cursor.eat(b'"') {
                return Ok(out);
            }
            // At a backslash.
            let escape_start = self.cursor.pos();
            self.cursor.advance();
            let Some(c) = self.cursor.current_char() else {
                return Err(LexError::new(
                    self.span_from(start),
                    LexErrorKind::UnterminatedString,
                ));
            };
            self.cursor.advance_char();
            match c {
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                '0' => out.push('\0'),
                '\\' => out.push('\\'),
                '"' => out.push('"'),
                '\'' => out.push('\''),
                'x' => out.push(self.char_code(escape_start, 2)?),
                'u' => out.push(self.char_code(escape_start, 4)?),
                other => {
                    return Err(LexError::new(
                        self.span_from(escape_start),
                        LexErrorKind::InvalidEscape(other),
                    ))
                }
            }
        }
    }

    /// Exactly `digits` hex digits naming a Unicode scalar value.
    fn char_code(&mut self, escape_start: usize, digits: usize) -> Result<char, LexError> {
        let hex_start = self.cursor.pos();
        let mut taken = 0;
        self.cursor.eat_while(|b| {
            let ok = taken < digits && b.is_ascii_hexdigit();
            taken += usize::from(ok);
            ok
        });
        let hex = self.cursor.slice_from(hex_start);
        let invalid = || {
            LexError::new(
                self.span_from(escape_start),
                LexErrorKind::InvalidCharCode(hex.to_string()),
            )
        };
        if hex.len() != digits {
            return Err(invalid());
        }
        u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(invalid)
    }

    fn pascal_style_body(&mut self, start: usize) -> Result<String, LexError> {
        let mut out = String::new();
        loop {
            let run_start = self.cursor.pos();
            if !self.cursor.skip_to(b'\'') {
                return Err(LexError::new(
                    self.span_from(start),
                    LexErrorKind::UnterminatedString,
                ));
            }
            out.push_str(self.cursor.slice_from(run_start));
            self.cursor.advance();
            if self.cursor.eat(b'\'') {
                out.push('\'');
            } else {
                return Ok(out);
            }
        }
    }

    fn tag(&self, text: &str, suffix: &str, span: Span) -> Result<Literal, LexError> {
        let invalid = |expected: &'static str| {
            LexError::new(
                span,
                LexErrorKind::InvalidLiteralText {
                    expected,
                    text: text.to_string(),
                },
            )
        };
        let literal = match suffix {
            "" => Literal::String(self.interner.intern(text)),
            "c" => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Literal::Char(c),
                    _ => return Err(LexError::new(span, LexErrorKind::InvalidCharLiteral)),
                }
            }
            "n" => Literal::Name(self.interner.intern(text)),
            "dt" => Literal::DateTime(
                vela_ir::literal::parse_datetime(text).ok_or_else(|| invalid("date-time"))?,
            ),
            "d" => Literal::DateTime(
                vela_ir::literal::parse_date(text).ok_or_else(|| invalid("date"))?,
            ),
            "ts" => Literal::TimeSpan(
                vela_ir::literal::parse_timespan(text).ok_or_else(|| invalid("time span"))?,
            ),
            "t" => Literal::TimeSpan(
                vela_ir::literal::parse_time_of_day(text).ok_or_else(|| invalid("time of day"))?,
            ),
            "g" => Literal::Guid(Uuid::parse_str(text.trim()).map_err(|_| invalid("guid"))?),
            other => {
                return Err(LexError::new(
                    span,
                    LexErrorKind::UnknownSuffix(other.to_string()),
                ))
            }
        };
        Ok(literal)
    }
}
