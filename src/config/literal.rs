//! Restricted literal parser for configuration values.
//!
//! Saved workflows store numeric options in literal syntax (`5.0`, `[8,8]`,
//! `{'leafsize': 10}`, `True`). This parser accepts exactly that literal
//! subset and nothing that could execute:
//!
//! ```text
//! value   := "None" | "True" | "False" | number | string | seq | tuple | map
//! seq     := "[" (value ("," value)* ","?)? "]"
//! tuple   := "(" (value ("," value)* ","?)? ")"
//! map     := "{" (string ":" value ("," string ":" value)* ","?)? "}"
//! number  := [+-]? (digits ("." digits?)? | "." digits) ([eE] [+-]? digits)?
//! ```
//!
//! A parenthesised single value without a trailing comma is just that value.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// A parsed literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<Literal>),
    Map(BTreeMap<String, Literal>),
}

impl Literal {
    /// Short type name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Literal::None => "None",
            Literal::Bool(_) => "boolean",
            Literal::Int(_) => "integer",
            Literal::Float(_) => "float",
            Literal::Str(_) => "string",
            Literal::Seq(_) => "sequence",
            Literal::Map(_) => "mapping",
        }
    }

    /// Numeric value; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Literal::Int(v) => Some(v as f64),
            Literal::Float(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    /// Renders back in literal syntax; floats always keep a decimal point.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::None => f.write_str("None"),
            Literal::Bool(true) => f.write_str("True"),
            Literal::Bool(false) => f.write_str("False"),
            Literal::Int(v) => write!(f, "{v}"),
            Literal::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => write!(f, "{v:.1}"),
            Literal::Float(v) => write!(f, "{v}"),
            Literal::Str(s) => {
                f.write_str("'")?;
                for c in s.chars() {
                    match c {
                        '\\' => f.write_str("\\\\")?,
                        '\'' => f.write_str("\\'")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("'")
            }
            Literal::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Literal::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {v}", Literal::Str(k.clone()))?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Syntax error with the byte offset it was detected at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at offset {offset})")]
pub struct LiteralError {
    pub offset: usize,
    pub message: String,
}

/// Deepest nesting of sequences and mappings a literal may use.
pub const MAX_DEPTH: usize = 64;

/// Parse one literal; surrounding whitespace is ignored, anything else is not.
pub fn parse_literal(input: &str) -> Result<Literal, LiteralError> {
    let mut parser = Parser {
        src: input,
        pos: 0,
        depth: 0,
    };
    let value = parser.value()?;
    parser.skip_ws();
    if parser.pos < input.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn value(&mut self) -> Result<Literal, LiteralError> {
        self.skip_ws();
        if matches!(self.peek(), Some('[' | '(' | '{')) {
            if self.depth == MAX_DEPTH {
                return Err(self.error("nesting too deep"));
            }
            self.depth += 1;
            let value = self.container();
            self.depth -= 1;
            return value;
        }
        self.scalar()
    }

    fn container(&mut self) -> Result<Literal, LiteralError> {
        match self.peek() {
            Some('[') => {
                self.bump();
                let (items, _) = self.items(']')?;
                Ok(Literal::Seq(items))
            }
            Some('(') => {
                self.bump();
                let (mut items, trailing_comma) = self.items(')')?;
                if items.len() == 1 && !trailing_comma {
                    Ok(items.remove(0))
                } else {
                    Ok(Literal::Seq(items))
                }
            }
            Some('{') => {
                self.bump();
                self.map()
            }
            _ => self.scalar(),
        }
    }

    fn scalar(&mut self) -> Result<Literal, LiteralError> {
        match self.peek() {
            None => Err(self.error("expected a value")),
            Some('\'') | Some('"') => self.string().map(Literal::Str),
            Some(c) if c.is_ascii_digit() || matches!(c, '+' | '-' | '.') => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.name(),
            Some(c) => Err(self.error(format!("unexpected character `{c}`"))),
        }
    }

    /// Comma-separated values up to `close`. Also reports whether the last
    /// item was followed by a comma (needed for one-element tuples).
    fn items(&mut self, close: char) -> Result<(Vec<Literal>, bool), LiteralError> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            self.skip_ws();
            if self.eat(close) {
                return Ok((items, trailing_comma));
            }
            items.push(self.value()?);
            self.skip_ws();
            if self.eat(',') {
                trailing_comma = true;
                continue;
            }
            trailing_comma = false;
            if self.eat(close) {
                return Ok((items, trailing_comma));
            }
            return Err(match self.peek() {
                Some(c) => self.error(format!("expected `,` or `{close}`, found `{c}`")),
                None => self.error(format!("unclosed `{close}`")),
            });
        }
    }

    fn map(&mut self) -> Result<Literal, LiteralError> {
        let mut out = BTreeMap::new();
        loop {
            self.skip_ws();
            if self.eat('}') {
                return Ok(Literal::Map(out));
            }
            let key = match self.peek() {
                Some('\'') | Some('"') => self.string()?,
                None => return Err(self.error("unclosed `}`")),
                Some(_) => return Err(self.error("mapping keys must be quoted strings")),
            };
            self.skip_ws();
            if !self.eat(':') {
                return Err(self.error("expected `:` after mapping key"));
            }
            let value = self.value()?;
            out.insert(key, value);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat('}') {
                return Ok(Literal::Map(out));
            }
            return Err(match self.peek() {
                Some(c) => self.error(format!("expected `,` or `}}`, found `{c}`")),
                None => self.error("unclosed `}`"),
            });
        }
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        let start = self.pos;
        let Some(quote) = self.bump() else {
            return Err(self.error("expected a string"));
        };
        let mut out = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(LiteralError {
                        offset: start,
                        message: "unterminated string".to_string(),
                    });
                }
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c @ ('\\' | '\'' | '"')) => out.push(c),
                    Some(c) => {
                        out.push('\\');
                        out.push(c);
                    }
                    None => return Err(self.error("unterminated escape")),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn number(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some('+' | '-')) {
            self.bump();
        }
        let int_digits = self.digits();
        let mut is_float = false;
        let mut frac_digits = 0;
        if self.eat('.') {
            is_float = true;
            frac_digits = self.digits();
        }
        if int_digits == 0 && frac_digits == 0 {
            return Err(LiteralError {
                offset: start,
                message: "malformed number".to_string(),
            });
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            is_float = true;
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            if self.digits() == 0 {
                return Err(self.error("malformed exponent"));
            }
        }

        let text = &self.src[start..self.pos];
        if is_float {
            text.parse::<f64>().map(Literal::Float).map_err(|e| LiteralError {
                offset: start,
                message: format!("invalid float `{text}`: {e}"),
            })
        } else {
            text.parse::<i64>().map(Literal::Int).map_err(|e| LiteralError {
                offset: start,
                message: format!("invalid integer `{text}`: {e}"),
            })
        }
    }

    fn digits(&mut self) -> usize {
        let mut n = 0;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            n += 1;
        }
        n
    }

    fn name(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        match &self.src[start..self.pos] {
            "None" => Ok(Literal::None),
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            other => Err(LiteralError {
                offset: start,
                message: format!("unsupported name `{other}`"),
            }),
        }
    }
}
