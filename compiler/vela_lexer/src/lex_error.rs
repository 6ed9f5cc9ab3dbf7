//! Lexical errors.

use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::Span;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct LexError {
    pub span: Span,
    pub kind: LexErrorKind,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum LexErrorKind {
    UnterminatedString,
    UnterminatedComment,
    IllegalCharacter(char),
    InvalidNumber(&'static str),
    InvalidEscape(char),
    /// A `c`-suffixed string that is not exactly one character.
    InvalidCharLiteral,
    InvalidCharCode(String),
    UnknownSuffix(String),
    /// Text of a suffixed literal that does not parse as its type.
    InvalidLiteralText {
        expected: &'static str,
        text: String,
    },
}

impl LexError {
    pub fn new(span: Span, kind: LexErrorKind) -> Self {
        LexError { span, kind }
    }

    pub fn code(&self) -> ErrorCode {
        match self.kind {
            LexErrorKind::UnterminatedString => ErrorCode::E0001,
            LexErrorKind::IllegalCharacter(_) => ErrorCode::E0002,
            LexErrorKind::InvalidNumber(_) => ErrorCode::E0003,
            LexErrorKind::InvalidEscape(_) => ErrorCode::E0004,
            LexErrorKind::InvalidCharLiteral => ErrorCode::E0005,
            LexErrorKind::InvalidCharCode(_) => ErrorCode::E0006,
            LexErrorKind::UnterminatedComment => ErrorCode::E0007,
            LexErrorKind::UnknownSuffix(_) => ErrorCode::E0009,
            LexErrorKind::InvalidLiteralText { .. } => ErrorCode::E0010,
        }
    }

    pub fn message(&self) -> String {
        match &self.kind {
            LexErrorKind::UnterminatedString => "unterminated string literal".to_string(),
            LexErrorKind::UnterminatedComment => "unterminated block comment".to_string(),
            LexErrorKind::IllegalCharacter(c) => {
                format!("illegal character `{}`", c.escape_debug())
            }
            LexErrorKind::InvalidNumber(reason) => format!("invalid numeric literal: {reason}"),
            LexErrorKind::InvalidEscape(c) => {
                format!("invalid escape sequence `\\{}`", c.escape_debug())
            }
            LexErrorKind::InvalidCharLiteral => {
                "character literal must contain exactly one character".to_string()
            }
            LexErrorKind::InvalidCharCode(code) => format!("invalid character code `{code}`"),
            LexErrorKind::UnknownSuffix(suffix) => format!("unknown literal suffix `{suffix}`"),
            LexErrorKind::InvalidLiteralText { expected, text } => {
                format!("`{text}` is not a valid {expected}")
            }
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let label = match self.kind {
            LexErrorKind::UnterminatedString | LexErrorKind::UnterminatedComment => {
                "starts here and never ends"
            }
            _ => "here",
        };
        Diagnostic::error(self.code())
            .with_message(self.message())
            .with_label(self.span, label)
    }
}

impl From<LexError> for Diagnostic {
    fn from(err: LexError) -> Self {
        err.to_diagnostic()
    }
}
