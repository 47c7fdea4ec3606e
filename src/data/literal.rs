//! Safe parser and renderer for the quoted literal cells of the interchange table.
//!
//! Cells look like `[('London', 'GPE'), ('Acme Corp', 'ORG')]` or
//! `[('company', 'accused', None)]`. Only plain data is accepted: lists, tuples,
//! strings, `None`, booleans and integers. Nothing is ever evaluated.

use std::fmt::Write as _;

use crate::{
    error::LiteralError,
    nlp::{relations::Relationship, Entity},
};

/// A parsed literal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
}

impl Literal {
    fn kind(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
        }
    }

    fn items(self) -> Option<Vec<Literal>> {
        match self {
            Self::List(items) | Self::Tuple(items) => Some(items),
            _ => None,
        }
    }
}

/// Parse a complete literal; trailing input other than whitespace is an error.
pub fn parse(input: &str) -> Result<Literal, LiteralError> {
    let mut parser = Parser::new(input);
    parser.skip_ws();
    let value = parser.value()?;
    parser.skip_ws();
    if parser.pos < parser.chars.len() {
        return Err(LiteralError::new(parser.pos, "unexpected trailing input"));
    }
    Ok(value)
}

/// Parse a sequence of `(text, label)` pairs.
pub fn parse_entities(input: &str) -> Result<Vec<Entity>, LiteralError> {
    let items = sequence(parse(input)?)?;
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            let fields = tuple_fields(item, 2, idx)?;
            let mut fields = fields.into_iter();
            let text = string_field(fields.next(), idx, "text")?;
            let label = string_field(fields.next(), idx, "label")?;
            Ok(Entity { text, label })
        })
        .collect()
}

/// Parse a sequence of `(subject, verb, object)` triples; the object may be `None`.
pub fn parse_relationships(input: &str) -> Result<Vec<Relationship>, LiteralError> {
    let items = sequence(parse(input)?)?;
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            let fields = tuple_fields(item, 3, idx)?;
            let mut fields = fields.into_iter();
            let subject = string_field(fields.next(), idx, "subject")?;
            let verb = string_field(fields.next(), idx, "verb")?;
            let object = match fields.next() {
                Some(Literal::None) => None,
                Some(Literal::Str(s)) => Some(s),
                other => {
                    return Err(LiteralError::new(
                        idx,
                        format!(
                            "item {idx}: object must be str or None, got {}",
                            other.map(|v| v.kind()).unwrap_or("nothing")
                        ),
                    ))
                }
            };
            Ok(Relationship {
                subject,
                verb,
                object,
            })
        })
        .collect()
}

/// Render entities as `[('text', 'LABEL'), ...]`.
pub fn render_entities(entities: &[Entity]) -> String {
    let mut out = String::from("[");
    for (idx, entity) in entities.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        out.push('(');
        push_str_repr(&mut out, &entity.text);
        out.push_str(", ");
        push_str_repr(&mut out, &entity.label);
        out.push(')');
    }
    out.push(']');
    out
}

/// Render triples as `[('subject', 'verb', 'object' | None), ...]`.
pub fn render_relationships(relationships: &[Relationship]) -> String {
    let mut out = String::from("[");
    for (idx, rel) in relationships.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        out.push('(');
        push_str_repr(&mut out, &rel.subject);
        out.push_str(", ");
        push_str_repr(&mut out, &rel.verb);
        out.push_str(", ");
        match &rel.object {
            Some(object) => push_str_repr(&mut out, object),
            None => out.push_str("None"),
        }
        out.push(')');
    }
    out.push(']');
    out
}

fn sequence(value: Literal) -> Result<Vec<Literal>, LiteralError> {
    let kind = value.kind();
    value
        .items()
        .ok_or_else(|| LiteralError::new(0, format!("expected a list, got {kind}")))
}

fn tuple_fields(item: Literal, arity: usize, idx: usize) -> Result<Vec<Literal>, LiteralError> {
    let kind = item.kind();
    let fields = item
        .items()
        .ok_or_else(|| LiteralError::new(idx, format!("item {idx}: expected a tuple, got {kind}")))?;
    if fields.len() != arity {
        return Err(LiteralError::new(
            idx,
            format!("item {idx}: expected {arity} fields, got {}", fields.len()),
        ));
    }
    Ok(fields)
}

fn string_field(field: Option<Literal>, idx: usize, name: &str) -> Result<String, LiteralError> {
    match field {
        Some(Literal::Str(s)) => Ok(s),
        other => Err(LiteralError::new(
            idx,
            format!(
                "item {idx}: {name} must be str, got {}",
                other.as_ref().map(Literal::kind).unwrap_or("nothing")
            ),
        )),
    }
}

/// Python-style `repr` of a string: single quotes unless the text contains a single
/// quote and no double quote.
fn push_str_repr(out: &mut String, value: &str) {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };
    out.push(quote);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

/// Deepest list/tuple nesting accepted in one cell.
const MAX_DEPTH: usize = 100;

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError::new(self.pos, message)
    }

    fn value(&mut self) -> Result<Literal, LiteralError> {
        match self.peek() {
            Some('[') => {
                self.pos += 1;
                self.nested(']').map(|(items, _)| Literal::List(items))
            }
            Some('(') => {
                self.pos += 1;
                let (items, trailing_comma) = self.nested(')')?;
                // `(x)` is just a parenthesised value; `(x,)` is a 1-tuple.
                if items.len() == 1 && !trailing_comma {
                    Ok(items.into_iter().next().unwrap_or(Literal::None))
                } else {
                    Ok(Literal::Tuple(items))
                }
            }
            Some(q @ ('\'' | '"')) => {
                self.pos += 1;
                self.string(q).map(Literal::Str)
            }
            Some(c) if c == '-' || c == '+' || c.is_ascii_digit() => self.integer(),
            Some(c) if c.is_ascii_alphabetic() => self.keyword(),
            Some(c) => Err(self.error(format!("unexpected character {c:?}"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn nested(&mut self, close: char) -> Result<(Vec<Literal>, bool), LiteralError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let items = self.items(close);
        self.depth -= 1;
        items
    }

    /// Comma separated values up to `close`. Returns whether a trailing comma was seen.
    fn items(&mut self, close: char) -> Result<(Vec<Literal>, bool), LiteralError> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok((items, trailing_comma));
            }
            items.push(self.value()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => trailing_comma = true,
                Some(c) if c == close => return Ok((items, false)),
                Some(c) => {
                    self.pos -= 1;
                    return Err(self.error(format!("expected ',' or {close:?}, got {c:?}")));
                }
                None => return Err(self.error(format!("unterminated sequence, expected {close:?}"))),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<String, LiteralError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => {
                    let escaped = self
                        .bump()
                        .ok_or_else(|| self.error("unterminated escape"))?;
                    match escaped {
                        '\\' => out.push('\\'),
                        '\'' => out.push('\''),
                        '"' => out.push('"'),
                        'n' => out.push('\n'),
                        'r' => out.push('\r'),
                        't' => out.push('\t'),
                        '0' => out.push('\0'),
                        '\n' => {}
                        'x' => out.push(self.hex_escape(2)?),
                        'u' => out.push(self.hex_escape(4)?),
                        'U' => out.push(self.hex_escape(8)?),
                        other => {
                            out.push('\\');
                            out.push(other);
                        }
                    }
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn hex_escape(&mut self, digits: usize) -> Result<char, LiteralError> {
        let start = self.pos;
        let end = start + digits;
        if end > self.chars.len() {
            return Err(self.error("truncated escape sequence"));
        }
        let hex: String = self.chars[start..end].iter().collect();
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(LiteralError::new(start, format!("invalid hex escape {hex:?}")));
        }
        let code = u32::from_str_radix(&hex, 16)
            .map_err(|_| LiteralError::new(start, format!("invalid hex escape {hex:?}")))?;
        self.pos = end;
        char::from_u32(code)
            .ok_or_else(|| LiteralError::new(start, format!("invalid code point {code:#x}")))
    }

    fn integer(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.pos += 1;
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.pos += 1;
        }
        let raw: String = self.chars[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();
        raw.parse()
            .map(Literal::Int)
            .map_err(|_| LiteralError::new(start, format!("invalid integer {raw:?}")))
    }

    fn keyword(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "None" => Ok(Literal::None),
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            _ => Err(LiteralError::new(
                start,
                format!("names are not allowed in literals: {word:?}"),
            )),
        }
    }
}
