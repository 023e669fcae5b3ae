//! Turns source text into a tree of values.
//!
//! The grammar is small enough for a hand written recursive descent parser. It works on
//! bytes, everything with syntactic meaning is ASCII. Numbers and free-form symbols have to
//! be followed by whitespace or a bracket, a token that isn't is reported and skipped
//! ([ParseError::is_recoverable]). A list that never closes, a character that can't
//! start any token, or lists nested deeper than [MAX_NESTING] end compilation.

use crate::operator::Operator;
use crate::value::{Kind, List, Source, Span, Text, Value};
use thiserror::Error;

/// how deep lists may nest. Parsing, evaluating and freeing a list all recurse
pub const MAX_NESTING: usize = 256;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("not a valid number: `{token}`")]
    MalformedNumber { token: String, span: Span },

    #[error("number does not fit into 64 bits: `{token}`")]
    NumberOutOfRange { token: String, span: Span },

    #[error("not a valid symbol: `{token}`")]
    MalformedSymbol { token: String, span: Span },

    #[error("list is missing its closing `]`")]
    UnterminatedList { span: Span },

    #[error("unexpected character `{ch}`")]
    UnexpectedChar { ch: char, span: Span },

    #[error("lists are nested more than {MAX_NESTING} levels deep")]
    TooDeep { span: Span },
}

impl ParseError {
    /// recoverable errors only cost the offending token, the rest of the program is fine
    pub fn is_recoverable(&self) -> bool {
        use ParseError::*;
        matches!(
            self,
            MalformedNumber { .. } | NumberOutOfRange { .. } | MalformedSymbol { .. }
        )
    }

    pub fn span(&self) -> Span {
        use ParseError::*;
        match self {
            MalformedNumber { span, .. }
            | NumberOutOfRange { span, .. }
            | MalformedSymbol { span, .. }
            | UnterminatedList { span }
            | UnexpectedChar { span, .. }
            | TooDeep { span } => *span,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// the result of a successful compilation
#[derive(Debug)]
pub struct Compiled {
    /// a list with one element per top level value
    pub program: Value,
    /// tokens that were dropped from the program
    pub warnings: Vec<ParseError>,
}

pub struct Parser {
    src: Source,
    p: usize,
    depth: usize,
    warnings: Vec<ParseError>,
}

/// parses the whole source into a program list
pub fn compile(src: impl Into<Source>) -> ParseResult<Compiled> {
    let mut parser = Parser::new(src.into());
    let program = List::default();
    while !parser.at_end() {
        parser.parse_into(&program)?;
    }
    let span = Span::new(0, parser.src.len());
    Ok(Compiled {
        program: Value::new(Kind::List(program), span),
        warnings: parser.warnings,
    })
}

fn is_symbol_start(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

fn is_symbol_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || (c.is_ascii_punctuation() && !is_bracket(c))
}

fn is_bracket(c: u8) -> bool {
    c == b'[' || c == b']'
}

impl Parser {
    pub fn new(src: Source) -> Self {
        Parser {
            src,
            p: 0,
            depth: 0,
            warnings: vec![],
        }
    }

    pub fn at_end(&self) -> bool {
        self.p >= self.src.len()
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.p).copied()
    }

    pub fn trim_leading(&mut self) {
        while self.peek().map_or(false, |c| c.is_ascii_whitespace()) {
            self.p += 1;
        }
    }

    /// whitespace and brackets end a token, the end of the input doesn't
    fn at_terminator(&self) -> bool {
        self.peek()
            .map_or(false, |c| c.is_ascii_whitespace() || is_bracket(c))
    }

    /// moves past whatever is left of a malformed token
    fn skip_token(&mut self) {
        while !self.at_end() && !self.at_terminator() {
            self.p += 1;
        }
    }

    fn text(&self, span: Span) -> Text {
        Text::new(self.src.clone(), span)
    }

    /// Parses the next value. Returns `Ok(None)` if only whitespace is left. On a
    /// recoverable error the cursor is already past the bad token.
    pub fn parse_value(&mut self) -> ParseResult<Option<Value>> {
        self.trim_leading();
        let Some(c) = self.peek() else {
            return Ok(None);
        };

        if c.is_ascii_digit() {
            return self.parse_number().map(Some);
        }
        if c == b'[' {
            return self.parse_list().map(Some);
        }
        if let Some(op) = Operator::longest_prefix(&self.src[self.p..]) {
            let span = Span::new(self.p, self.p + op.name().len());
            self.p = span.end;
            return Ok(Some(Value::symbol(self.text(span), span)));
        }
        if is_symbol_start(c) {
            return self.parse_symbol().map(Some);
        }

        let ch = self.src[self.p..].chars().next().unwrap_or(char::REPLACEMENT_CHARACTER);
        Err(ParseError::UnexpectedChar {
            ch,
            span: Span::new(self.p, self.p + ch.len_utf8()),
        })
    }

    /// parses one value and appends it to `list`, recoverable errors are only recorded
    fn parse_into(&mut self, list: &List) -> ParseResult<()> {
        match self.parse_value() {
            Ok(Some(v)) => list.push(v),
            Ok(None) => {}
            Err(e) if e.is_recoverable() => self.warnings.push(e),
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn parse_number(&mut self) -> ParseResult<Value> {
        let start = self.p;
        while self.peek().map_or(false, |c| c.is_ascii_digit()) {
            self.p += 1;
        }
        if !self.at_terminator() {
            self.skip_token();
            return Err(ParseError::MalformedNumber {
                token: self.src[start..self.p].to_string(),
                span: Span::new(start, self.p),
            });
        }

        let span = Span::new(start, self.p);
        let token = &self.src[start..self.p];
        match token.parse::<i64>() {
            Ok(i) => Ok(Value::int(i, span)),
            Err(_) => Err(ParseError::NumberOutOfRange {
                token: token.to_string(),
                span,
            }),
        }
    }

    fn parse_list(&mut self) -> ParseResult<Value> {
        let start = self.p;
        if self.depth == MAX_NESTING {
            return Err(ParseError::TooDeep {
                span: Span::new(start, start + 1),
            });
        }
        self.depth += 1;
        let res = self.parse_list_items(start);
        self.depth -= 1;
        res
    }

    fn parse_list_items(&mut self, start: usize) -> ParseResult<Value> {
        self.p += 1;
        let list = List::default();
        loop {
            self.trim_leading();
            match self.peek() {
                None => {
                    return Err(ParseError::UnterminatedList {
                        span: Span::new(start, self.p),
                    })
                }
                Some(b']') => {
                    self.p += 1;
                    break;
                }
                Some(_) => self.parse_into(&list)?,
            }
        }
        Ok(Value::new(Kind::List(list), Span::new(start, self.p)))
    }

    fn parse_symbol(&mut self) -> ParseResult<Value> {
        let start = self.p;
        while self.peek().map_or(false, is_symbol_char) {
            self.p += 1;
        }
        if !self.at_terminator() {
            self.skip_token();
            return Err(ParseError::MalformedSymbol {
                token: self.src[start..self.p].to_string(),
                span: Span::new(start, self.p),
            });
        }

        let span = Span::new(start, self.p);
        Ok(match &self.src[start..self.p] {
            "true" => Value::boolean(true, span),
            "false" => Value::boolean(false, span),
            _ => Value::symbol(self.text(span), span),
        })
    }
}
