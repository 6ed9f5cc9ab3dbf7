//! Byte offset to line/column mapping.

use std::fmt;

use vela_ir::Span;

/// 1-based line and column (columns count characters, not bytes).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Line start offsets of one source text.
pub struct LineIndex<'src> {
    source: &'src str,
    starts: Vec<u32>,
}

impl<'src> LineIndex<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                starts.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        LineIndex { source, starts }
    }

    /// Position of byte `offset`. Offsets past the end map to the end.
    pub fn line_col(&self, offset: u32) -> LineCol {
        let line = match self.starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next.saturating_sub(1),
        };
        let start = self.starts[line] as usize;
        let end = (offset as usize).min(self.source.len());
        let column = self
            .source
            .get(start..end)
            .map_or(end.saturating_sub(start), |text| text.chars().count());
        LineCol {
            line: u32::try_from(line + 1).unwrap_or(u32::MAX),
            column: u32::try_from(column + 1).unwrap_or(u32::MAX),
        }
    }

    pub fn span_start(&self, span: Span) -> LineCol {
        self.line_col(span.start)
    }

    /// Text of the 1-based `line`, without its terminator.
    pub fn line_text(&self, line: u32) -> &'src str {
        let Some(index) = (line as usize).checked_sub(1) else {
            return "";
        };
        let Some(&start) = self.starts.get(index) else {
            return "";
        };
        let end = self
            .starts
            .get(index + 1)
            .map_or(self.source.len(), |&next| next as usize);
        self.source
            .get(start as usize..end)
            .unwrap_or_default()
            .trim_end_matches(['\n', '\r'])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn maps_offsets_to_lines() {
        let index = LineIndex::new("let x := 1\nreturn y\n");
        assert_eq!(index.line_col(0), LineCol { line: 1, column: 1 });
        assert_eq!(index.line_col(11), LineCol { line: 2, column: 1 });
        assert_eq!(index.line_col(18), LineCol { line: 2, column: 8 });
        assert_eq!(index.line_text(2), "return y");
    }

    #[test]
    fn columns_count_characters() {
        let index = LineIndex::new("'é' + x");
        assert_eq!(index.line_col(7).column, 7);
    }
}
