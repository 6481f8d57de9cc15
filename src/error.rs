use std::cmp::Ordering;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::str::Utf8Error;

use nom::error::{ErrorKind as NomErrorKind, ParseError};
use thiserror::Error;

use crate::position::Position;

/// Something the grammar would have accepted at a failure point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Char(char),
    Rule(&'static str),
    Terminator,
    EndOfInput,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Char(c) => write!(f, "{:?}", c),
            Expected::Rule(rule) => f.write_str(rule),
            Expected::Terminator => f.write_str("whitespace, a delimiter or end of input"),
            Expected::EndOfInput => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Problem {
    Syntax,
    UnevenMap(usize),
    Invariant(&'static str),
    TooDeep(usize),
}

/// The error type threaded through the nom combinators.
///
/// Keeps the failure that got farthest into the input. Alternatives failing at the
/// same point have their expectations merged, and a rule that fails without consuming
/// anything is reported by its name rather than by its first token.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GrammarError<'a> {
    pub(crate) input: &'a str,
    pub(crate) problem: Problem,
    pub(crate) expected: Vec<Expected>,
}

impl<'a> GrammarError<'a> {
    pub(crate) fn expected(input: &'a str, expected: Expected) -> Self {
        Self {
            input,
            problem: Problem::Syntax,
            expected: vec![expected],
        }
    }

    pub(crate) fn problem(input: &'a str, problem: Problem) -> Self {
        Self {
            input,
            problem,
            expected: vec![],
        }
    }

    fn merge_expected(&mut self, other: Vec<Expected>) {
        for e in other {
            if !self.expected.contains(&e) {
                self.expected.push(e);
            }
        }
    }
}

impl<'a> ParseError<&'a str> for GrammarError<'a> {
    fn from_error_kind(input: &'a str, _kind: NomErrorKind) -> Self {
        Self::problem(input, Problem::Syntax)
    }

    fn append(_input: &'a str, _kind: NomErrorKind, other: Self) -> Self {
        other
    }

    fn from_char(input: &'a str, c: char) -> Self {
        Self::expected(input, Expected::Char(c))
    }

    fn or(mut self, other: Self) -> Self {
        // Less input remaining means the failure happened later in the source
        match self.input.len().cmp(&other.input.len()) {
            Ordering::Less => self,
            Ordering::Greater => other,
            Ordering::Equal => {
                self.merge_expected(other.expected);
                self
            }
        }
    }

    fn add_context(input: &'a str, rule: &'static str, mut other: Self) -> Self {
        if other.input.len() == input.len() {
            other.expected = vec![Expected::Rule(rule)];
        }
        other
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{position}: {}", syntax_message(.found, .expected))]
    Syntax {
        position: Position,
        /// `None` at end of input
        found: Option<char>,
        expected: Vec<Expected>,
    },

    #[error("{position}: map literal must have an even number of forms, found {count}")]
    UnevenMap { position: Position, count: usize },

    #[error("{position}: internal parser error: {rule} did not produce a symbol")]
    Internal {
        position: Position,
        rule: &'static str,
    },

    #[error("{position}: forms are nested deeper than {limit} levels")]
    TooDeep { position: Position, limit: usize },

    #[error("input is not valid UTF-8: {0}")]
    Encoding(#[from] Utf8Error),

    #[error("failed to read input: {0}")]
    Read(#[source] io::Error),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}", file_message(.path, .source))]
    File {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Where in its input unit the parse failed, if this is a parse failure
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::Syntax { position, .. }
            | Error::UnevenMap { position, .. }
            | Error::Internal { position, .. }
            | Error::TooDeep { position, .. } => Some(*position),
            Error::File { source, .. } => source.position(),
            Error::Encoding(_) | Error::Read(_) | Error::Io { .. } => None,
        }
    }

    /// The error with any [`Error::File`] wrappers removed
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::File { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// The innermost file this error is attributed to
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Error::File { path, source } => source.path().or_else(|| Some(path.as_path())),
            Error::Io { path, .. } => Some(path.as_path()),
            _ => None,
        }
    }

    /// The error message without its position or path prefix
    pub fn message(&self) -> String {
        match self {
            Error::Syntax {
                found, expected, ..
            } => syntax_message(found, expected),
            Error::UnevenMap { count, .. } => format!(
                "map literal must have an even number of forms, found {}",
                count
            ),
            Error::Internal { rule, .. } => {
                format!("internal parser error: {} did not produce a symbol", rule)
            }
            Error::TooDeep { limit, .. } => {
                format!("forms are nested deeper than {} levels", limit)
            }
            Error::File { source, .. } => source.message(),
            Error::Encoding(_) | Error::Read(_) | Error::Io { .. } => self.to_string(),
        }
    }
}

/// Positions join the path as `path:line:col`; other causes follow after a colon and space
fn file_message(path: &std::path::Path, source: &Error) -> String {
    match source.position() {
        Some(_) => format!("{}:{}", path.display(), source),
        None => format!("{}: {}", path.display(), source),
    }
}

fn syntax_message(found: &Option<char>, expected: &[Expected]) -> String {
    let found = match found {
        Some(c) => format!("unexpected {:?}", c),
        None => "unexpected end of input".to_owned(),
    };

    match expected {
        [] => found,
        [only] => format!("{}, expected {}", found, only),
        _ => {
            let alternatives: Vec<String> = expected.iter().map(Expected::to_string).collect();
            format!("{}, expected one of {}", found, alternatives.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_keeps_farthest() {
        let source = "abcdef";
        let near = GrammarError::expected(&source[1..], Expected::Rule("near"));
        let far = GrammarError::expected(&source[4..], Expected::Rule("far"));

        assert_eq!(near.clone().or(far.clone()), far);
        assert_eq!(far.clone().or(near), far);
    }

    #[test]
    fn test_or_merges_same_point() {
        let source = "xyz";
        let a = GrammarError::expected(source, Expected::Rule("list"));
        let b = GrammarError::expected(source, Expected::Rule("vector"));
        let merged = a.clone().or(b).or(a);

        assert_eq!(
            merged.expected,
            vec![Expected::Rule("list"), Expected::Rule("vector")]
        );
    }

    #[test]
    fn test_context_names_rules_failing_at_their_start() {
        let source = "(1 2";
        let inner = GrammarError::from_char(source, '[');
        let labelled = GrammarError::add_context(source, "vector", inner);
        assert_eq!(labelled.expected, vec![Expected::Rule("vector")]);

        let deep = GrammarError::from_char("", ')');
        let kept = GrammarError::add_context(source, "list", deep);
        assert_eq!(kept.expected, vec![Expected::Char(')')]);
    }

    #[test]
    fn test_syntax_message() {
        let err = Error::Syntax {
            position: Position::new(2, 5),
            found: Some(')'),
            expected: vec![Expected::Rule("list"), Expected::Char(']')],
        };
        assert_eq!(
            err.to_string(),
            "2:5: unexpected ')', expected one of list, ']'"
        );

        let eof = Error::Syntax {
            position: Position::new(1, 3),
            found: None,
            expected: vec![Expected::Char('"')],
        };
        assert_eq!(eof.message(), "unexpected end of input, expected '\"'");
    }

    #[test]
    fn test_file_wrapping() {
        let inner = Error::UnevenMap {
            position: Position::new(4, 1),
            count: 3,
        };
        let err = Error::File {
            path: PathBuf::from("conf/app.edn"),
            source: Box::new(inner),
        };

        assert_eq!(err.position(), Some(Position::new(4, 1)));
        assert_eq!(err.path(), Some(std::path::Path::new("conf/app.edn")));
        assert!(matches!(err.root_cause(), Error::UnevenMap { count: 3, .. }));
        assert_eq!(
            err.to_string(),
            "conf/app.edn:4:1: map literal must have an even number of forms, found 3"
        );
    }

    #[test]
    fn test_file_wrapping_without_position() {
        let utf8 = std::str::from_utf8(&[0xff]).unwrap_err();
        let err = Error::File {
            path: PathBuf::from("a.edn"),
            source: Box::new(Error::Encoding(utf8)),
        };

        assert_eq!(err.position(), None);
        assert!(
            err.to_string().starts_with("a.edn: input is not valid UTF-8: "),
            "{}",
            err
        );
    }
}
