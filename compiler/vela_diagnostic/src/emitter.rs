//! Plain-text rendering of diagnostics against their source.

use std::fmt::Write;

use crate::{Diagnostic, LineIndex};

/// Render `diagnostic` in the familiar compiler layout:
///
/// ```text
/// error[E2001]: unknown identifier `y`
///  --> 2:3
///   |
/// 2 |   y
///   |   ^ not found in this scope
/// ```
pub fn render(diagnostic: &Diagnostic, source: &str) -> String {
    let index = LineIndex::new(source);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}[{}]: {}",
        diagnostic.severity, diagnostic.code, diagnostic.message
    );

    for label in &diagnostic.labels {
        let start = index.span_start(label.span);
        let text = index.line_text(start.line);
        let gutter = start.line.to_string().len();
        let width = if label.span.is_empty() {
            1
        } else {
            label
                .span
                .slice(source)
                .lines()
                .next()
                .map_or(1, |first| first.chars().count().max(1))
        };
        let marker = if label.is_primary { '^' } else { '-' };

        let _ = writeln!(out, "{:gutter$}--> {start}", "");
        let _ = writeln!(out, "{:gutter$} |", "");
        let _ = writeln!(out, "{} | {text}", start.line);
        let _ = writeln!(
            out,
            "{:gutter$} | {}{} {}",
            "",
            " ".repeat(start.column.saturating_sub(1) as usize),
            marker.to_string().repeat(width),
            label.message
        );
    }
    for note in &diagnostic.notes {
        let _ = writeln!(out, "  = note: {note}");
    }
    out
}
