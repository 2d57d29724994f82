//! A parser of Python-like literals, the input format of `set` commands.
//!
//! Accepted literals are integers, floats, quoted strings, the logical names `True`, `False`, `T`, `F`, `true`,
//! `false`, `TRUE` and `FALSE`, `None`, and lists or tuples of literals (`[1.0, 2.0]`, `(1, 2)` or `1, 2`).
//! `None` reads as the string `"None"`.

use std::{iter::Peekable, str::CharIndices};

use ezfio::{Nested, Scalar};
use thiserror::Error;

/// A literal parse error.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{message} at offset {offset}")]
pub struct LiteralError {
    message: String,
    offset: usize,
}

impl LiteralError {
    fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

/// Parse the value of a `set` command.
///
/// Empty input reads as `"None"`, and input which is not a literal reads as a raw string.
#[must_use]
pub fn parse_input(text: &str) -> Nested {
    if text.trim().is_empty() {
        return Nested::from("None");
    }
    parse_literal(text).unwrap_or_else(|err| {
        tracing::debug!(%err, "input is not a literal, using it as a string");
        Nested::from(text.trim())
    })
}

/// Parse a Python-like literal.
///
/// # Errors
/// Returns a [`LiteralError`] if `text` is not a literal.
pub fn parse_literal(text: &str) -> Result<Nested, LiteralError> {
    let mut parser = Parser {
        text,
        chars: text.char_indices().peekable(),
    };
    let items = parser.sequence(None)?;
    parser.skip_whitespace();
    if let Some(&(offset, c)) = parser.chars.peek() {
        return Err(LiteralError::new(format!("unexpected {c:?}"), offset));
    }
    match items {
        Sequence::Single(value) => Ok(value),
        Sequence::Tuple(items) => Ok(Nested::List(items)),
    }
}

enum Sequence {
    Single(Nested),
    Tuple(Vec<Nested>),
}

struct Parser<'a> {
    text: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl Parser<'_> {
    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.text.len(), |&(offset, _)| offset)
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    /// Comma separated values up to `close` (or the end of input for a top level tuple).
    fn sequence(&mut self, close: Option<char>) -> Result<Sequence, LiteralError> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            self.skip_whitespace();
            match self.chars.peek() {
                Some(&(_, c)) if Some(c) == close => break,
                None if close.is_none() => break,
                _ => {}
            }
            items.push(self.value()?);
            self.skip_whitespace();
            trailing_comma = self.chars.next_if(|&(_, c)| c == ',').is_some();
            if !trailing_comma {
                break;
            }
        }
        if close.is_none() && items.len() == 1 && !trailing_comma {
            if let Some(value) = items.pop() {
                return Ok(Sequence::Single(value));
            }
        }
        if items.is_empty() && close.is_none() {
            return Err(LiteralError::new("empty input", self.offset()));
        }
        Ok(Sequence::Tuple(items))
    }

    fn value(&mut self) -> Result<Nested, LiteralError> {
        self.skip_whitespace();
        let offset = self.offset();
        match self.chars.peek().map(|&(_, c)| c) {
            Some(open @ ('[' | '(')) => {
                self.chars.next();
                let close = if open == '[' { ']' } else { ')' };
                let items = self.sequence(Some(close))?;
                self.skip_whitespace();
                if self.chars.next_if(|&(_, c)| c == close).is_none() {
                    return Err(LiteralError::new(format!("expected {close:?}"), self.offset()));
                }
                match items {
                    Sequence::Tuple(items) => Ok(Nested::List(items)),
                    Sequence::Single(item) => Ok(Nested::List(vec![item])),
                }
            }
            Some(quote @ ('\'' | '"')) => {
                self.chars.next();
                self.string(quote, offset).map(Nested::from)
            }
            Some(_) => self.atom(offset),
            None => Err(LiteralError::new("expected a value", offset)),
        }
    }

    fn string(&mut self, quote: char, offset: usize) -> Result<String, LiteralError> {
        let mut value = String::new();
        loop {
            match self.chars.next() {
                Some((_, c)) if c == quote => return Ok(value),
                Some((_, '\\')) => match self.chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, c @ ('\\' | '\'' | '"'))) => value.push(c),
                    Some((_, c)) => {
                        value.push('\\');
                        value.push(c);
                    }
                    None => break,
                },
                Some((_, c)) => value.push(c),
                None => break,
            }
        }
        Err(LiteralError::new("unterminated string", offset))
    }

    fn atom(&mut self, offset: usize) -> Result<Nested, LiteralError> {
        let mut end = offset;
        while let Some((position, c)) = self
            .chars
            .next_if(|&(_, c)| !c.is_whitespace() && !matches!(c, ',' | '[' | ']' | '(' | ')'))
        {
            end = position + c.len_utf8();
        }
        let token = &self.text[offset..end];
        let scalar = match token {
            "True" | "true" | "TRUE" | "T" => Scalar::Logical(true),
            "False" | "false" | "FALSE" | "F" => Scalar::Logical(false),
            "None" => Scalar::from("None"),
            _ => parse_number(token)
                .ok_or_else(|| LiteralError::new(format!("invalid literal {token:?}"), offset))?,
        };
        Ok(Nested::Scalar(scalar))
    }
}

fn parse_number(token: &str) -> Option<Scalar> {
    let first = token.chars().next()?;
    if !(first.is_ascii_digit() || matches!(first, '+' | '-' | '.')) {
        return None;
    }
    if token.chars().any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E')) {
        return None;
    }
    let digits = token.replace('_', "");
    if let Ok(value) = digits.parse::<i64>() {
        return Some(i32::try_from(value).map_or(Scalar::Integer64(value), Scalar::Integer));
    }
    digits.parse::<f64>().ok().map(Scalar::Double)
}
