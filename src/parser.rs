use std::cell::Cell;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{anychar, char, digit1, none_of, one_of},
    combinator::{map, opt, peek, recognize, verify},
    error::{context, ParseError},
    multi::fold_many0,
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
};
use num_bigint::BigInt;

use crate::{
    classify,
    error::{Error, Expected, GrammarError, Problem},
    position::LineIndex,
    value::{Kind, QualifiedName, ValueNode},
};

/// How many forms may enclose each other before parsing gives up
pub const DEFAULT_MAX_DEPTH: usize = 64;

type IResult<'a, T> = nom::IResult<&'a str, T, GrammarError<'a>>;

/// Names a grammar rule in error messages and traces its entry and exit
fn rule<'a, O, F>(name: &'static str, parser: F) -> impl Fn(&'a str) -> IResult<'a, O>
where
    F: Fn(&'a str) -> IResult<'a, O>,
{
    context(name, move |input: &'a str| {
        tracing::trace!(rule = name, remaining = input.len(), "enter");
        let result = parser(input);
        tracing::trace!(rule = name, matched = result.is_ok(), "exit");
        result
    })
}

fn satisfy<'a>(predicate: fn(char) -> bool) -> impl Fn(&'a str) -> IResult<'a, char> {
    verify(anychar, move |c: &char| predicate(*c))
}

/// The opening token of a reader macro or collection
fn opening<'a>(input: &'a str, token: &'static str) -> IResult<'a, &'a str> {
    tag(token)(input)
}

fn whitespace(input: &str) -> IResult<&str> {
    take_while(classify::is_whitespace)(input)
}

/// Succeeds without consuming anything at end of input or before a separator
fn terminator(input: &str) -> IResult<()> {
    match input.chars().next() {
        Some(c) if !classify::is_separator(c) => Err(nom::Err::Error(GrammarError::expected(
            input,
            Expected::Terminator,
        ))),
        _ => Ok((input, ())),
    }
}

fn nil(input: &str) -> IResult<Kind> {
    map(terminated(tag("nil"), terminator), |_| Kind::Nil)(input)
}

fn boolean(input: &str) -> IResult<Kind> {
    let literal = alt((map(tag("true"), |_| true), map(tag("false"), |_| false)));
    map(terminated(literal, terminator), Kind::Boolean)(input)
}

fn escape(input: &str) -> IResult<char> {
    let decode = |c: char| match c {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        // Covers `\\` and `\"` as well as unknown escapes
        other => other,
    };
    preceded(char('\\'), map(anychar, decode))(input)
}

fn string(input: &str) -> IResult<Kind> {
    let body = fold_many0(
        alt((escape, none_of("\"\\"))),
        String::new(),
        |mut s: String, c: char| {
            s.push(c);
            s
        },
    );
    map(delimited(char('"'), body, char('"')), Kind::String)(input)
}

fn character(input: &str) -> IResult<Kind> {
    let named = alt((
        map(tag("newline"), |_| '\n'),
        map(tag("return"), |_| '\r'),
        map(tag("space"), |_| ' '),
        map(tag("tab"), |_| '\t'),
    ));
    let literal = preceded(char('\\'), alt((named, none_of(" \r\t\n"))));
    map(terminated(literal, terminator), Kind::Character)(input)
}

fn number_text(input: &str) -> IResult<&str> {
    recognize(tuple((
        opt(one_of("+-")),
        digit1,
        opt(pair(char('.'), digit1)),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)
}

fn number(input: &str) -> IResult<Kind> {
    let (rest, text) = number_text(input)?;

    let kind = if text.contains(|c: char| matches!(c, '.' | 'e' | 'E')) {
        text.parse().ok().map(Kind::Float)
    } else {
        text.trim_start_matches('+')
            .parse::<BigInt>()
            .ok()
            .map(Kind::Integer)
    };

    match kind {
        Some(kind) => Ok((rest, kind)),
        None => Err(nom::Err::Error(GrammarError::expected(
            input,
            Expected::Rule("number"),
        ))),
    }
}

fn inner_symbol_chars(input: &str) -> IResult<&str> {
    take_while(classify::is_inner_symbol_char)(input)
}

fn symbol_part(input: &str) -> IResult<&str> {
    let (rest, first) = satisfy(classify::is_first_symbol_char)(input)?;

    // A leading sign or dot only continues into the non-numeric alphabet
    let sign_only = matches!(first, '+' | '-' | '.')
        && rest
            .chars()
            .next()
            .map_or(false, |c| !classify::is_non_numeric_symbol_char(c));

    let (rest, _) = if sign_only {
        (rest, "")
    } else {
        inner_symbol_chars(rest)?
    };

    Ok((rest, &input[..input.len() - rest.len()]))
}

fn symbol(input: &str) -> IResult<QualifiedName> {
    alt((
        map(
            separated_pair(symbol_part, char('/'), symbol_part),
            |(namespace, name)| QualifiedName::qualified(namespace, name),
        ),
        map(symbol_part, |name| QualifiedName::bare(name)),
    ))(input)
}

fn keyword(input: &str) -> IResult<Kind> {
    map(preceded(char(':'), symbol), Kind::Keyword)(input)
}

fn comment(input: &str) -> IResult<Kind> {
    map(
        preceded(char(';'), take_while(|c: char| c != '\n')),
        |text: &str| Kind::Comment(text.to_owned()),
    )(input)
}

fn tag_start(input: &str) -> IResult<char> {
    preceded(char('#'), peek(satisfy(char::is_alphabetic)))(input)
}

fn tag_name(input: &str) -> IResult<QualifiedName> {
    let (rest, _) = tag_start(input)?;

    // Any letter starts a symbol, so this cannot fail once the gate matched
    symbol(rest).map_err(|_| {
        nom::Err::Failure(GrammarError::problem(input, Problem::Invariant("tag")))
    })
}

/// Recursive part of the grammar, bound to one source text.
///
/// The collection and reader-macro rules call back into [`Parser::value`], which
/// counts how deeply forms are nested.
pub(crate) struct Parser<'a> {
    source: &'a str,
    lines: LineIndex<'a>,
    max_depth: usize,
    depth: Cell<usize>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(source: &'a str, max_depth: usize) -> Self {
        Self {
            source,
            lines: LineIndex::new(source),
            max_depth,
            depth: Cell::new(0),
        }
    }

    /// Parses one or more forms spanning the whole source
    pub(crate) fn forms(&self) -> Result<Vec<ValueNode>, Error> {
        let mut forms = Vec::new();
        let mut input = self.source;

        loop {
            let (rest, _) = whitespace(input).map_err(|e| self.error(e))?;
            if rest.is_empty() && !forms.is_empty() {
                return Ok(forms);
            }

            let (rest, form) = self.value(rest).map_err(|e| self.error(e))?;
            forms.push(form);
            input = rest;
        }
    }

    /// Parses exactly one form; anything but whitespace after it is an error
    pub(crate) fn single(&self) -> Result<ValueNode, Error> {
        let (rest, form) = self.value(self.source).map_err(|e| self.error(e))?;

        if rest.is_empty() {
            Ok(form)
        } else {
            Err(self.error(nom::Err::Error(GrammarError::expected(
                rest,
                Expected::EndOfInput,
            ))))
        }
    }

    fn error(&self, err: nom::Err<GrammarError<'a>>) -> Error {
        let err = match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
            // Only streaming parsers ask for more input
            nom::Err::Incomplete(_) => GrammarError::problem("", Problem::Syntax),
        };
        let position = self.lines.position_of(err.input);

        match err.problem {
            Problem::Syntax => Error::Syntax {
                position,
                found: err.input.chars().next(),
                expected: err.expected,
            },
            Problem::UnevenMap(count) => Error::UnevenMap { position, count },
            Problem::Invariant(rule) => Error::Internal { position, rule },
            Problem::TooDeep(limit) => Error::TooDeep { position, limit },
        }
    }

    pub(crate) fn value(&self, input: &'a str) -> IResult<'a, ValueNode> {
        let (input, _) = whitespace(input)?;
        let position = self.lines.position_of(input);

        let depth = self.depth.get() + 1;
        if depth > self.max_depth {
            return Err(nom::Err::Failure(GrammarError::problem(
                input,
                Problem::TooDeep(self.max_depth),
            )));
        }

        // Order matters: `#` forms before anything else, `nil` and booleans before
        // symbols, numbers before keywords and symbols.
        self.depth.set(depth);
        let result = alt((
            rule("comment", comment),
            rule("discard", |i| self.discard(i)),
            rule("tagged literal", |i| self.tagged(i)),
            rule("set", |i| self.set(i)),
            rule("list", |i| self.list(i)),
            rule("vector", |i| self.vector(i)),
            rule("map", |i| self.map_literal(i)),
            rule("nil", nil),
            rule("boolean", boolean),
            rule("number", number),
            rule("keyword", keyword),
            rule("symbol", map(symbol, Kind::Symbol)),
            rule("character", character),
            rule("string", string),
        ))(input);
        self.depth.set(depth - 1);

        let (rest, kind) = result?;
        let (rest, _) = whitespace(rest)?;
        Ok((rest, ValueNode::new(position, kind)))
    }

    fn discard(&self, input: &'a str) -> IResult<'a, Kind> {
        let (rest, _) = opening(input, "#_")?;
        let (rest, value) = self.value(rest)?;
        Ok((rest, Kind::Discard(Box::new(value))))
    }

    fn tagged(&self, input: &'a str) -> IResult<'a, Kind> {
        let (rest, tag) = tag_name(input)?;
        let (rest, value) = self.value(rest)?;
        Ok((rest, Kind::Tagged(tag, Box::new(value))))
    }

    fn set(&self, input: &'a str) -> IResult<'a, Kind> {
        let (rest, _) = opening(input, "#{")?;
        let (rest, children) = self.elements(rest, '}')?;
        Ok((rest, Kind::Set(children)))
    }

    fn list(&self, input: &'a str) -> IResult<'a, Kind> {
        let (rest, _) = opening(input, "(")?;
        let (rest, children) = self.elements(rest, ')')?;
        Ok((rest, Kind::List(children)))
    }

    fn vector(&self, input: &'a str) -> IResult<'a, Kind> {
        let (rest, _) = opening(input, "[")?;
        let (rest, children) = self.elements(rest, ']')?;
        Ok((rest, Kind::Vector(children)))
    }

    fn map_literal(&self, input: &'a str) -> IResult<'a, Kind> {
        let (rest, _) = opening(input, "{")?;
        let (rest, children) = self.elements(rest, '}')?;

        let count = children.iter().filter(|v| !v.is_trivia()).count();
        if count % 2 != 0 {
            return Err(nom::Err::Failure(GrammarError::problem(
                input,
                Problem::UnevenMap(count),
            )));
        }

        Ok((rest, Kind::Map(children)))
    }

    /// Forms up to and including the `close` delimiter
    fn elements(&self, mut input: &'a str, close: char) -> IResult<'a, Vec<ValueNode>> {
        let mut items = Vec::new();

        loop {
            let (rest, _) = whitespace(input)?;
            if let Some(rest) = rest.strip_prefix(close) {
                return Ok((rest, items));
            }
            if rest.is_empty() {
                return Err(nom::Err::Error(GrammarError::expected(
                    rest,
                    Expected::Char(close),
                )));
            }

            let (rest, item) = self.value(rest).map_err(|e| match e {
                nom::Err::Error(e) => {
                    nom::Err::Error(e.or(GrammarError::expected(rest, Expected::Char(close))))
                }
                other => other,
            })?;
            items.push(item);
            input = rest;
        }
    }
}
