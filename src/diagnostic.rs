#![deny(unused_must_use)]

use std::fmt;

use colorful::{Color, Colorful};

use crate::{error::Error, position::Position};

/// A source-annotated report of a parse failure, such as an error or warning
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Where the caret points
    pub position: Position,

    /// The level of this diagnostic and its color (e.g. "error", "warning")
    pub level: (&'static str, Color),

    /// The message attached to the diagnostic
    pub level_message: Option<String>,

    /// The message to be placed after the caret
    pub below_message: Option<String>,

    /// The note to be placed after the message
    pub note: Option<String>,
}

macro_rules! builder_method {
    ($($name:ident: $ty:ty),*) => {
        $(
        #[allow(dead_code)]
        pub fn $name(self, $name: impl Into<$ty>) -> Self {
            Self {
                $name: Some($name.into()),
                ..self
            }
        }
        )*
    }
}

fn paint(enabled: bool, text: &str, color: Color) -> String {
    if enabled {
        text.color(color).to_string()
    } else {
        text.to_owned()
    }
}

impl Diagnostic {
    pub fn new(level: (&'static str, Color), position: Position) -> Self {
        Self {
            level,
            position,
            below_message: None,
            level_message: None,
            note: None,
        }
    }

    builder_method!(level_message: String, below_message: String, note: String);

    /// Describes a parse failure; errors without a position point at the start of input
    pub fn from_error(err: &Error) -> Self {
        let diagnostic = Self::new(("error", Color::Red), err.position().unwrap_or_default())
            .level_message(err.message());

        match err.root_cause() {
            Error::Syntax { found: None, .. } => diagnostic.below_message("input ends here"),
            Error::Syntax { .. } => diagnostic.below_message("not expected here"),
            Error::UnevenMap { .. } => diagnostic
                .below_message("in this map")
                .note("every key needs a value; comments and `#_` forms are not counted"),
            Error::TooDeep { .. } => diagnostic
                .below_message("nesting limit reached here")
                .note("raise the limit with `Reader::max_depth`"),
            Error::Internal { .. } => {
                diagnostic.note("this is a bug in the parser, not in the input")
            }
            _ => diagnostic,
        }
    }

    /// Renders the diagnostic against the text it refers to
    pub fn render(&self, input: &str, filename: &str, color: bool) -> String {
        Rendered {
            diagnostic: self,
            input,
            filename,
            color,
        }
        .to_string()
    }

    /// Prints the diagnostic to stderr
    pub fn show(&self, input: &str, filename: &str, color: bool) {
        eprint!("{}", self.render(input, filename, color));
    }
}

struct Rendered<'a> {
    diagnostic: &'a Diagnostic,
    input: &'a str,
    filename: &'a str,
    color: bool,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Diagnostic {
            position: Position { line, column },
            level: (level, level_color),
            ref level_message,
            ref below_message,
            ref note,
        } = *self.diagnostic;
        let color = self.color;

        let code_line = self.input.lines().nth(line.saturating_sub(1)).unwrap_or("");
        let indent = line.to_string().len() + 1;
        let gutter = paint(color, "|", Color::Blue);

        // header
        write!(f, "{}", paint(color, level, level_color))?;
        match level_message {
            Some(level_message) => writeln!(f, ": {}", level_message)?,
            None => writeln!(f)?,
        }

        // source location
        writeln!(
            f,
            "{}{} {}:{}:{}",
            " ".repeat(indent - 1),
            paint(color, "-->", Color::Blue),
            self.filename,
            line,
            column
        )?;

        writeln!(f, "{}{}", " ".repeat(indent), gutter)?;

        // code line
        writeln!(
            f,
            "{} {} {}",
            paint(color, &line.to_string(), Color::Blue),
            gutter,
            code_line
        )?;

        // bottom context
        write!(
            f,
            "{}{}{}{}",
            " ".repeat(indent),
            gutter,
            " ".repeat(column),
            paint(color, "^", Color::Yellow)
        )?;

        match below_message {
            Some(below_message) => {
                writeln!(f, " {}", paint(color, below_message, Color::Yellow))?
            }
            None => writeln!(f)?,
        }

        if let Some(note) = note {
            let note_label = if color {
                "note".bold().to_string()
            } else {
                "note".to_owned()
            };
            writeln!(
                f,
                "{}{} {}: {}",
                " ".repeat(indent),
                paint(color, "=", Color::Blue),
                note_label,
                note
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse_str;

    #[test]
    fn test_render_uneven_map() {
        let input = "{:a 1\n :b}";
        let err = parse_str(input).unwrap_err();
        let rendered = Diagnostic::from_error(&err).render(input, "app.edn", false);

        assert_eq!(
            rendered,
            "error: map literal must have an even number of forms, found 3\n \
             --> app.edn:1:1\n  \
             |\n\
             1 | {:a 1\n  \
             | ^ in this map\n  \
             = note: every key needs a value; comments and `#_` forms are not counted\n"
        );
    }

    #[test]
    fn test_render_points_at_column() {
        let input = "[1 2\n 3 )";
        let err = parse_str(input).unwrap_err();
        let rendered = Diagnostic::from_error(&err).render(input, "x.edn", false);

        assert!(rendered.contains("--> x.edn:2:4\n"), "{}", rendered);
        assert!(rendered.contains("2 |  3 )\n"), "{}", rendered);
        assert!(rendered.contains("  |    ^ not expected here\n"), "{}", rendered);
    }

    #[test]
    fn test_render_at_end_of_input() {
        let input = "(1 2";
        let err = parse_str(input).unwrap_err();
        let diagnostic = Diagnostic::from_error(&err);
        assert_eq!(diagnostic.position, Position::new(1, 5));

        let rendered = diagnostic.render(input, "x.edn", false);
        assert!(rendered.starts_with("error: unexpected end of input, expected ')'\n"));
        assert!(rendered.contains("^ input ends here"), "{}", rendered);
    }

    #[test]
    fn test_render_with_color_keeps_text() {
        let input = "{1}";
        let err = parse_str(input).unwrap_err();
        let rendered = Diagnostic::from_error(&err).render(input, "x.edn", true);
        assert!(rendered.contains(" x.edn:1:1\n"), "{}", rendered);
        assert!(rendered.contains("{1}"));
    }

    #[test]
    fn test_render_without_messages() {
        let diagnostic = Diagnostic::new(("warning", Color::Yellow), Position::new(2, 3));
        let rendered = diagnostic.render("a\nbcd", "w.edn", false);

        assert_eq!(rendered, "warning\n --> w.edn:2:3\n  |\n2 | bcd\n  |   ^\n");
    }
}
