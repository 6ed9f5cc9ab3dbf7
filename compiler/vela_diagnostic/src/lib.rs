//! Diagnostics for every phase of the Vela processor.
//!
//! A [`Diagnostic`] pairs an [`ErrorCode`] with a message, labelled spans
//! and notes. Phases fail fast: each returns the first diagnostic it hits.
//! [`LineIndex`] turns byte spans into 1-based line/column positions and
//! [`render`] formats a diagnostic against its source text.

mod diagnostic;
mod emitter;
mod error_code;
mod line_index;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use emitter::render;
pub use error_code::{ErrorCode, Phase};
pub use line_index::{LineCol, LineIndex};
