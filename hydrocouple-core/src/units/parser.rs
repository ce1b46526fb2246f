//! Unit string parser.
//!
//! Accepts the CF/UDUNITS style used by water cycle datasets as well as the
//! more verbose operator forms:
//!
//! - Implicit products with signed exponents: `kg m-2 s-1`
//! - Explicit exponents: `m^2`, `m**2`
//! - Products and quotients: `kg*m`, `kg.m`, `kg/m2/s`, `W per m^2`
//! - Parentheses: `kg / (m2 s)`
//!
//! ```text
//! expression = term (('/' | 'per') term)*
//! term       = factor (('*' | '.' | ' ') factor)*
//! factor     = ('(' expression ')' | symbol | '1') exponent?
//! exponent   = ('^' | '**')? ('-' | '+')? [0-9]+
//! ```

use super::dimension::Dimension;
use super::registry::UNIT_REGISTRY;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty unit string")]
    Empty,
    #[error("unknown unit: '{0}'")]
    UnknownUnit(String),
    #[error("invalid exponent in '{0}'")]
    InvalidExponent(String),
    #[error("unexpected '{found}' at position {position}")]
    Unexpected { found: char, position: usize },
    #[error("unexpected end of unit string")]
    UnexpectedEnd,
}

/// A unit expressed as a product of symbols raised to integer powers.
///
/// `kg m-2 s-1` is stored as `{kg: 1, m: -2, s: -1}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedUnit {
    components: BTreeMap<String, i32>,
}

impl ParsedUnit {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseError::Empty);
        }

        let mut parser = Parser {
            chars: input.chars().collect(),
            pos: 0,
        };
        let unit = parser.expression()?;
        parser.skip_whitespace();
        match parser.peek() {
            None => Ok(unit),
            Some(c) => Err(ParseError::Unexpected {
                found: c,
                position: parser.pos,
            }),
        }
    }

    fn symbol(symbol: String, exp: i32) -> Self {
        Self {
            components: BTreeMap::from([(symbol, exp)]),
        }
        .pruned()
    }

    fn pruned(mut self) -> Self {
        self.components.retain(|_, exp| *exp != 0);
        self
    }

    pub fn components(&self) -> &BTreeMap<String, i32> {
        &self.components
    }

    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        let mut components = self.components.clone();
        for (symbol, exp) in &other.components {
            *components.entry(symbol.clone()).or_insert(0) += exp;
        }
        Self { components }.pruned()
    }

    #[must_use]
    pub fn divide(&self, other: &Self) -> Self {
        self.multiply(&other.powi(-1))
    }

    #[must_use]
    pub fn powi(&self, exp: i32) -> Self {
        Self {
            components: self
                .components
                .iter()
                .map(|(symbol, e)| (symbol.clone(), e * exp))
                .collect(),
        }
        .pruned()
    }

    /// Physical dimension of the whole expression.
    pub fn dimension(&self) -> Result<Dimension, ParseError> {
        self.components
            .iter()
            .try_fold(Dimension::DIMENSIONLESS, |acc, (symbol, &exp)| {
                let info = UNIT_REGISTRY
                    .lookup(symbol)
                    .ok_or_else(|| ParseError::UnknownUnit(symbol.clone()))?;
                Ok(acc * info.dimension.powi(exp as i8))
            })
    }

    /// Multiplier converting a value in this unit to SI base units.
    pub fn to_si_factor(&self) -> Result<f64, ParseError> {
        self.components
            .iter()
            .try_fold(1.0, |acc, (symbol, &exp)| {
                let info = UNIT_REGISTRY
                    .lookup(symbol)
                    .ok_or_else(|| ParseError::UnknownUnit(symbol.clone()))?;
                Ok(acc * info.to_si_factor.powi(exp))
            })
    }

    /// Origin offset of the unit.
    ///
    /// Only a lone shifted unit (e.g. `degC`) has an offset; inside a compound
    /// expression the unit denotes an interval and the offset is dropped.
    pub fn to_si_offset(&self) -> f64 {
        let mut components = self.components.iter();
        match (components.next(), components.next()) {
            (Some((symbol, exp)), None) if *exp == 1 => UNIT_REGISTRY
                .lookup(symbol)
                .map(|info| info.to_si_offset)
                .unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Canonical representation: symbols in alphabetical order with signed exponents.
    pub fn normalized(&self) -> String {
        if self.components.is_empty() {
            return "1".to_string();
        }
        self.components
            .iter()
            .map(|(symbol, exp)| match exp {
                1 => symbol.clone(),
                _ => format!("{symbol}{exp}"),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ParsedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.normalized())
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        let end = self.pos + keyword.len();
        end <= self.chars.len()
            && self.chars[self.pos..end].iter().copied().eq(keyword.chars())
            && !self
                .chars
                .get(end)
                .is_some_and(|c| c.is_ascii_alphanumeric())
    }

    fn expression(&mut self) -> Result<ParsedUnit, ParseError> {
        let mut unit = self.term()?;
        loop {
            self.skip_whitespace();
            if self.peek() == Some('/') {
                self.pos += 1;
            } else if self.at_keyword("per") {
                self.pos += 3;
            } else {
                return Ok(unit);
            }
            unit = unit.divide(&self.term()?);
        }
    }

    fn term(&mut self) -> Result<ParsedUnit, ParseError> {
        let mut unit = self.factor()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('*') | Some('.') | Some('\u{00B7}') => {
                    self.pos += 1;
                    unit = unit.multiply(&self.factor()?);
                }
                Some(c) if (c.is_ascii_alphabetic() || c == '(' || c == '1')
                    && !self.at_keyword("per") =>
                {
                    unit = unit.multiply(&self.factor()?);
                }
                _ => return Ok(unit),
            }
        }
    }

    fn factor(&mut self) -> Result<ParsedUnit, ParseError> {
        self.skip_whitespace();
        let base = match self.peek() {
            None => return Err(ParseError::UnexpectedEnd),
            Some('(') => {
                self.pos += 1;
                let inner = self.expression()?;
                self.skip_whitespace();
                if self.peek() != Some(')') {
                    return Err(self.peek().map_or(ParseError::UnexpectedEnd, |c| {
                        ParseError::Unexpected {
                            found: c,
                            position: self.pos,
                        }
                    }));
                }
                self.pos += 1;
                inner
            }
            Some('1') => {
                self.pos += 1;
                ParsedUnit::default()
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                {
                    self.pos += 1;
                }
                ParsedUnit::symbol(self.chars[start..self.pos].iter().collect(), 1)
            }
            Some(c) => {
                return Err(ParseError::Unexpected {
                    found: c,
                    position: self.pos,
                })
            }
        };

        Ok(base.powi(self.exponent()?))
    }

    fn exponent(&mut self) -> Result<i32, ParseError> {
        let start = self.pos;
        let mut marker = false;
        if self.peek() == Some('^') {
            self.pos += 1;
            marker = true;
        } else if self.chars[self.pos..].starts_with(&['*', '*']) {
            self.pos += 2;
            marker = true;
        }

        let digits_start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.pos += 1;
        }
        let sign_end = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }

        if self.pos == sign_end {
            if marker || sign_end != digits_start {
                let text: String = self.chars[start..self.pos].iter().collect();
                return Err(ParseError::InvalidExponent(text));
            }
            return Ok(1);
        }

        let text: String = self.chars[digits_start..self.pos].iter().collect();
        text.parse()
            .map_err(|_| ParseError::InvalidExponent(text.clone()))
    }
}
