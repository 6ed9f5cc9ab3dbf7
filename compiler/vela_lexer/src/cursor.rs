//! Byte cursor over script text.
//!
//! All token boundaries fall on ASCII bytes, so the cursor works in bytes
//! and only decodes UTF-8 where a non-ASCII character can appear (inside
//! identifiers, strings and error messages).

pub(crate) struct Cursor<'src> {
    source: &'src str,
    pos: usize,
}

impl<'src> Cursor<'src> {
    pub(crate) fn new(source: &'src str) -> Self {
        Cursor { source, pos: 0 }
    }

    #[inline]
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    /// Byte position as a span offset.
    #[inline]
    pub(crate) fn offset(&self) -> u32 {
        u32::try_from(self.pos).unwrap_or(u32::MAX)
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    #[inline]
    pub(crate) fn current(&self) -> Option<u8> {
        self.source.as_bytes().get(self.pos).copied()
    }

    /// Byte `n` positions ahead of the current one.
    #[inline]
    pub(crate) fn peek(&self, n: usize) -> Option<u8> {
        self.source.as_bytes().get(self.pos + n).copied()
    }

    #[inline]
    pub(crate) fn advance(&mut self) {
        self.pos += 1;
    }

    #[inline]
    pub(crate) fn advance_by(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.source.len());
    }

    /// Consume `byte` if it is next.
    #[inline]
    pub(crate) fn eat(&mut self, byte: u8) -> bool {
        if self.current() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_while(&mut self, mut pred: impl FnMut(u8) -> bool) {
        while let Some(b) = self.current() {
            if !pred(b) {
                break;
            }
            self.pos += 1;
        }
    }

    /// The character starting at the current position.
    pub(crate) fn current_char(&self) -> Option<char> {
        self.source.get(self.pos..).and_then(|rest| rest.chars().next())
    }

    /// Skip past the current character, however many bytes it takes.
    pub(crate) fn advance_char(&mut self) {
        let width = self.current_char().map_or(1, char::len_utf8);
        self.advance_by(width);
    }

    pub(crate) fn slice(&self, start: usize, end: usize) -> &'src str {
        self.source.get(start..end).unwrap_or_default()
    }

    pub(crate) fn slice_from(&self, start: usize) -> &'src str {
        self.slice(start, self.pos)
    }

    /// Jump to the next occurrence of `byte`, or to the end.
    pub(crate) fn skip_to(&mut self, byte: u8) -> bool {
        let rest = &self.source.as_bytes()[self.pos.min(self.source.len())..];
        match memchr::memchr(byte, rest) {
            Some(i) => {
                self.pos += i;
                true
            }
            None => {
                self.pos = self.source.len();
                false
            }
        }
    }

    /// Jump to the next occurrence of either byte, or to the end.
    pub(crate) fn skip_to_either(&mut self, a: u8, b: u8) -> bool {
        let rest = &self.source.as_bytes()[self.pos.min(self.source.len())..];
        match memchr::memchr2(a, b, rest) {
            Some(i) => {
                self.pos += i;
                true
            }
            None => {
                self.pos = self.source.len();
                false
            }
        }
    }
}
