//! Numeric literal scanning.
//!
//! The scanner keeps track of which form it is in: hex digits are only
//! accepted after `0x`, an exponent only once and never in hex, and after
//! the first fraction up to two further `.digits` groups turn the literal
//! into a version. A `.` is only consumed when the byte after it is a
//! digit, so `1..5` lexes as an interval.

use vela_ir::{Literal, TokenKind, VersionNumber};

use crate::{LexError, LexErrorKind, Lexer};

impl Lexer<'_, '_> {
    pub(crate) fn number(&mut self) -> Result<TokenKind, LexError> {
        let start = self.cursor.pos();
        if self.cursor.current() == Some(b'0') && matches!(self.cursor.peek(1), Some(b'x' | b'X')) {
            return self.hex_number(start);
        }

        self.cursor.eat_while(|b| b.is_ascii_digit());
        let mut components = 1;
        while components < VersionNumber::MAX_PARTS
            && self.cursor.current() == Some(b'.')
            && self.cursor.peek(1).is_some_and(|b| b.is_ascii_digit())
        {
            self.cursor.advance();
            self.cursor.eat_while(|b| b.is_ascii_digit());
            components += 1;
        }
        if components == VersionNumber::MAX_PARTS
            && self.cursor.current() == Some(b'.')
            && self.cursor.peek(1).is_some_and(|b| b.is_ascii_digit())
        {
            return Err(self.bad_number(start, "a version has at most four components"));
        }

        if components >= 3 {
            self.reject_trailing_alnum(start, "unexpected character after version")?;
            let text = self.cursor.slice_from(start);
            return VersionNumber::parse(text)
                .map(|v| TokenKind::Literal(Literal::Version(v)))
                .ok_or_else(|| self.bad_number(start, "version component out of range"));
        }

        let exponent = self.scan_exponent(start)?;
        if components == 2 || exponent {
            self.reject_trailing_alnum(start, "unexpected character after number")?;
            let text = self.cursor.slice_from(start);
            return text
                .parse::<f64>()
                .map(|d| TokenKind::Literal(Literal::Double(d)))
                .map_err(|_| self.bad_number(start, "malformed double"));
        }

        let digits = self.cursor.slice_from(start);
        if self.cursor.eat(b'L') {
            self.reject_trailing_alnum(start, "unexpected character after long")?;
            return digits
                .parse::<i64>()
                .map(|n| TokenKind::Literal(Literal::Long(n)))
                .map_err(|_| self.bad_number(start, "long out of range"));
        }
        self.reject_trailing_alnum(start, "unexpected character after integer")?;
        digits
            .parse::<i32>()
            .map(|n| TokenKind::Literal(Literal::Integer(n)))
            .map_err(|_| self.bad_number(start, "integer out of range (use the `L` suffix)"))
    }

    /// `e[+-]digits`, accepted once. Returns whether one was consumed.
    fn scan_exponent(&mut self, start: usize) -> Result<bool, LexError> {
        if !matches!(self.cursor.current(), Some(b'e' | b'E')) {
            return Ok(false);
        }
        let digits_at = match self.cursor.peek(1) {
            Some(b'+' | b'-') => 2,
            _ => 1,
        };
        if !self.cursor.peek(digits_at).is_some_and(|b| b.is_ascii_digit()) {
            self.cursor.advance();
            return Err(self.bad_number(start, "exponent has no digits"));
        }
        self.cursor.advance_by(digits_at);
        self.cursor.eat_while(|b| b.is_ascii_digit());
        if matches!(self.cursor.current(), Some(b'e' | b'E')) {
            return Err(self.bad_number(start, "exponent given twice"));
        }
        Ok(true)
    }

    fn hex_number(&mut self, start: usize) -> Result<TokenKind, LexError> {
        self.cursor.advance_by(2);
        let digits_start = self.cursor.pos();
        self.cursor.eat_while(|b| b.is_ascii_hexdigit());
        let digits = self.cursor.slice_from(digits_start);
        if digits.is_empty() {
            return Err(self.bad_number(start, "`0x` needs at least one hex digit"));
        }
        let long = self.cursor.eat(b'L');
        self.reject_trailing_alnum(start, "invalid hex digit")?;
        let value = u64::from_str_radix(digits, 16)
            .map_err(|_| self.bad_number(start, "hex literal out of range"))?;
        // Hex literals denote a bit pattern, so 0xFFFFFFFF is -1 and
        // 0xFFFFFFFFFFFFFFFFL is -1L.
        if long {
            return Ok(TokenKind::Literal(Literal::Long(i64::from_ne_bytes(
                value.to_ne_bytes(),
            ))));
        }
        let bits = u32::try_from(value)
            .map_err(|_| self.bad_number(start, "hex integer out of range (use the `L` suffix)"))?;
        Ok(TokenKind::Literal(Literal::Integer(i32::from_ne_bytes(
            bits.to_ne_bytes(),
        ))))
    }

    fn reject_trailing_alnum(
        &mut self,
        start: usize,
        reason: &'static str,
    ) -> Result<(), LexError> {
        if self
            .cursor
            .current()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            self.cursor.eat_while(|b| b.is_ascii_alphanumeric() || b == b'_');
            return Err(self.bad_number(start, reason));
        }
        Ok(())
    }

    fn bad_number(&self, start: usize, reason: &'static str) -> LexError {
        LexError::new(self.span_from(start), LexErrorKind::InvalidNumber(reason))
    }
}
