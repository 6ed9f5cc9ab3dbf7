//! The one error type the processor reports.

use std::time::Duration;

use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_runtime::{RuntimeError, RuntimeErrorKind};

/// Why a script did not produce a result.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Lexing, parsing, planning or compilation rejected the script.
    #[error("{0}")]
    Diagnostic(Diagnostic),

    /// The compiled program failed while running.
    #[error("{0}")]
    Runtime(RuntimeError),

    #[error("script exceeded the time limit of {} ms", .0.as_millis())]
    TimeLimitExceeded(Duration),

    #[error("script exceeded the row limit of {limit}")]
    RowLimitExceeded { limit: usize },

    /// Several evaluations of a batch failed.
    #[error("{} evaluations failed", .0.len())]
    Aggregate(Vec<ScriptError>),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScriptError {
    /// Fold batch failures into one error; a single failure is returned
    /// as is.
    pub(crate) fn aggregate(mut errors: Vec<ScriptError>) -> Self {
        if errors.len() == 1 {
            if let Some(only) = errors.pop() {
                return only;
            }
        }
        ScriptError::Aggregate(errors)
    }

    pub fn is_limit(&self) -> bool {
        matches!(
            self,
            ScriptError::TimeLimitExceeded(_) | ScriptError::RowLimitExceeded { .. }
        )
    }

    /// A diagnostic to show for this error. Spans in runtime errors refer
    /// to the script text.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ScriptError::Diagnostic(diagnostic) => diagnostic.clone(),
            ScriptError::Runtime(err) => err.to_diagnostic(),
            ScriptError::TimeLimitExceeded(_) => {
                Diagnostic::error(ErrorCode::E5001).with_message(self.to_string())
            }
            ScriptError::RowLimitExceeded { .. } => {
                Diagnostic::error(ErrorCode::E5002).with_message(self.to_string())
            }
            ScriptError::Aggregate(errors) => errors.iter().fold(
                Diagnostic::error(ErrorCode::E4006).with_message(self.to_string()),
                |diagnostic, err| diagnostic.with_note(err.to_string()),
            ),
            ScriptError::Io(_) => {
                Diagnostic::error(ErrorCode::E4001).with_message(self.to_string())
            }
        }
    }
}

impl From<Diagnostic> for ScriptError {
    fn from(diagnostic: Diagnostic) -> Self {
        ScriptError::Diagnostic(diagnostic)
    }
}

impl From<RuntimeError> for ScriptError {
    fn from(err: RuntimeError) -> Self {
        match err.kind {
            RuntimeErrorKind::RowLimitExceeded { limit } => ScriptError::RowLimitExceeded { limit },
            _ => ScriptError::Runtime(err),
        }
    }
}
