//! Parse errors.

use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::Span;

/// A syntax error: what was wrong, where, and optionally what the parser
/// was in the middle of.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
    pub context: Option<&'static str>,
}

impl ParseError {
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        ParseError {
            code,
            message: message.into(),
            span,
            context: None,
        }
    }

    #[must_use]
    pub fn in_context(mut self, context: &'static str) -> Self {
        if self.context.is_none() {
            self.context = Some(context);
        }
        self
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.code)
            .with_message(self.message.clone())
            .with_label(self.span, "here");
        if let Some(context) = self.context {
            diag = diag.with_note(format!("while parsing {context}"));
        }
        diag
    }
}

impl From<ParseError> for Diagnostic {
    fn from(err: ParseError) -> Self {
        err.to_diagnostic()
    }
}

impl From<vela_lexer::LexError> for ParseError {
    fn from(err: vela_lexer::LexError) -> Self {
        ParseError::new(err.code(), err.message(), err.span)
    }
}
