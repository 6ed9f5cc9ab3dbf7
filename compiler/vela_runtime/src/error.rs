//! Runtime faults.

use std::fmt;

use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::Span;

use crate::Value;

pub type EvalResult = Result<Value, RuntimeError>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    /// Raised by a repository or other host code.
    Host,
    DivisionByZero,
    Overflow,
    IndexOutOfRange,
    /// A built-in received an argument it cannot handle.
    InvalidArgument,
    /// Several concurrent evaluations failed.
    Aggregate(Vec<RuntimeError>),
    Cancelled,
    RowLimitExceeded { limit: usize },
    /// No repository backs an imported module variable.
    NoStorage,
}

/// A fault raised while a compiled program runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub message: String,
    /// Source of the operation that failed, when known.
    pub span: Option<Span>,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, message: impl Into<String>) -> Self {
        RuntimeError {
            kind,
            message: message.into(),
            span: None,
        }
    }

    pub fn host(message: impl Into<String>) -> Self {
        Self::new(RuntimeErrorKind::Host, message)
    }

    pub fn division_by_zero() -> Self {
        Self::new(RuntimeErrorKind::DivisionByZero, "division by zero")
    }

    pub fn overflow(operation: &str) -> Self {
        Self::new(
            RuntimeErrorKind::Overflow,
            format!("arithmetic overflow in `{operation}`"),
        )
    }

    pub fn index_out_of_range(index: i64, len: usize) -> Self {
        Self::new(
            RuntimeErrorKind::IndexOutOfRange,
            format!("index {index} is out of range for a list of {len} element(s)"),
        )
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(RuntimeErrorKind::InvalidArgument, message)
    }

    pub fn cancelled() -> Self {
        Self::new(RuntimeErrorKind::Cancelled, "execution was cancelled")
    }

    pub fn row_limit(limit: usize) -> Self {
        Self::new(
            RuntimeErrorKind::RowLimitExceeded { limit },
            format!("script exceeded the row limit of {limit}"),
        )
    }

    pub fn no_storage(target: &str) -> Self {
        Self::new(
            RuntimeErrorKind::NoStorage,
            format!("no storage is available for `{target}`"),
        )
    }

    /// One error standing for all of `errors`; a single error is returned
    /// unchanged.
    pub fn aggregate(mut errors: Vec<RuntimeError>) -> Self {
        if errors.len() == 1 {
            if let Some(only) = errors.pop() {
                return only;
            }
        }
        let message = format!("{} evaluations failed", errors.len());
        Self::new(RuntimeErrorKind::Aggregate(errors), message)
    }

    /// Attach `span` unless a more precise one is already set.
    #[must_use]
    pub fn at(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }

    /// Whether `try ... catch` may handle this error. Limits and
    /// cancellation always unwind to the caller.
    pub fn is_catchable(&self) -> bool {
        !matches!(
            self.kind,
            RuntimeErrorKind::Cancelled
                | RuntimeErrorKind::RowLimitExceeded { .. }
        )
    }

    pub fn code(&self) -> ErrorCode {
        match self.kind {
            RuntimeErrorKind::Host => ErrorCode::E4001,
            RuntimeErrorKind::DivisionByZero => ErrorCode::E4002,
            RuntimeErrorKind::Overflow => ErrorCode::E4003,
            RuntimeErrorKind::IndexOutOfRange => ErrorCode::E4004,
            RuntimeErrorKind::InvalidArgument => ErrorCode::E4005,
            RuntimeErrorKind::Aggregate(_) => ErrorCode::E4006,
            RuntimeErrorKind::Cancelled => ErrorCode::E4007,
            RuntimeErrorKind::RowLimitExceeded { .. } => ErrorCode::E5002,
            RuntimeErrorKind::NoStorage => ErrorCode::E2005,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.code()).with_message(self.message.clone());
        if let Some(span) = self.span {
            diag = diag.with_label(span, "raised here");
        }
        if let RuntimeErrorKind::Aggregate(inner) = &self.kind {
            for err in inner {
                diag = diag.with_note(err.to_string());
            }
        }
        diag
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

impl std::error::Error for RuntimeError {}
