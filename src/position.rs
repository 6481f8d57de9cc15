use std::fmt;

/// A 1-based line and column in the source text. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 1 };

    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Maps positions inside one source text to [`Position`]s.
///
/// Every `&str` the grammar sees is a suffix of the source, so the byte offset of a
/// parser's remaining input is just the difference in lengths.
#[derive(Debug)]
pub(crate) struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
    /// Lines holding only ASCII, where byte and character columns agree
    ascii_lines: Vec<bool>,
}

impl<'a> LineIndex<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        let line_starts: Vec<usize> = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        let ascii_lines = source.split('\n').map(str::is_ascii).collect();

        Self {
            source,
            line_starts,
            ascii_lines,
        }
    }

    /// Position of the first character of `rest`, which must be a suffix of the source.
    pub(crate) fn position_of(&self, rest: &str) -> Position {
        debug_assert!(rest.len() <= self.source.len());
        self.position_at(self.source.len() - rest.len())
    }

    pub(crate) fn position_at(&self, offset: usize) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next_line) => next_line - 1,
        };
        let line_start = self.line_starts[line];

        let column = if self.ascii_lines[line] {
            offset - line_start
        } else {
            self.source[line_start..offset].chars().count()
        };

        Position {
            line: line + 1,
            column: column + 1,
        }
    }
}
