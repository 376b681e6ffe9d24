// Copyright (c) 2025 - Cowboy AI, Inc.
//! Selector Algebra
//!
//! A [`Query`] is plain data: an [`Operator`], a key and a value set. It can
//! be built in code, deserialized, or parsed from the familiar selector
//! syntax:
//!
//! ```text
//! stage=prod          stage==prod
//! stage!=prod
//! owner in (alice, bob)
//! owner notin (alice, bob)
//! ```
//!
//! | Operator | Values | Keeps a resource when |
//! |---|---|---|
//! | `MatchEqual` | exactly 1 | the value equals it |
//! | `MatchNotEqual` | exactly 1 | the value differs (or is missing) |
//! | `MatchIn` | any | the value is in the set |
//! | `MatchNotIn` | any | the value is not in the set (or is missing) |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Selector validation and parse errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// Numeric operator code outside the defined set
    #[error("invalid operator code {0}")]
    InvalidOperator(u8),

    /// Operator name outside the defined set
    #[error("invalid operator `{0}`")]
    UnknownOperator(String),

    /// Single-valued operator used with zero or several values
    #[error("operator `{op}` takes exactly one value, got {count}")]
    WrongArity { op: Operator, count: usize },

    /// Selector text could not be parsed
    #[error("cannot parse selector `{input}`: {reason}")]
    Parse { input: String, reason: String },
}

/// Selector operator
///
/// Serializes as its selector text; deserializes from either the text or
/// the numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "OperatorRepr", into = "String")]
pub enum Operator {
    /// Value equals the single given value
    MatchEqual,
    /// Value is a member of the given set
    MatchIn,
    /// Value differs from the single given value
    MatchNotEqual,
    /// Value is absent from the given set
    MatchNotIn,
}

impl Operator {
    /// Canonical selector text
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::MatchEqual => "=",
            Operator::MatchIn => "in",
            Operator::MatchNotEqual => "!=",
            Operator::MatchNotIn => "notin",
        }
    }

    /// Numeric code (0-3)
    pub fn code(&self) -> u8 {
        match self {
            Operator::MatchEqual => 0,
            Operator::MatchIn => 1,
            Operator::MatchNotEqual => 2,
            Operator::MatchNotIn => 3,
        }
    }

    /// Whether the operator takes exactly one value
    pub fn is_single_valued(&self) -> bool {
        matches!(self, Operator::MatchEqual | Operator::MatchNotEqual)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<u8> for Operator {
    type Error = SelectorError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Operator::MatchEqual),
            1 => Ok(Operator::MatchIn),
            2 => Ok(Operator::MatchNotEqual),
            3 => Ok(Operator::MatchNotIn),
            other => Err(SelectorError::InvalidOperator(other)),
        }
    }
}

impl FromStr for Operator {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" | "==" => Ok(Operator::MatchEqual),
            "in" => Ok(Operator::MatchIn),
            "!=" => Ok(Operator::MatchNotEqual),
            "notin" => Ok(Operator::MatchNotIn),
            other => Err(SelectorError::UnknownOperator(other.to_string())),
        }
    }
}

impl TryFrom<String> for Operator {
    type Error = SelectorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OperatorRepr {
    Code(u64),
    Text(String),
}

impl TryFrom<OperatorRepr> for Operator {
    type Error = SelectorError;

    fn try_from(repr: OperatorRepr) -> Result<Self, Self::Error> {
        match repr {
            OperatorRepr::Code(code) => {
                let code = u8::try_from(code).unwrap_or(u8::MAX);
                Operator::try_from(code)
            }
            OperatorRepr::Text(text) => text.parse(),
        }
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.as_str().to_string()
    }
}

/// A selector: operator, key and value set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Relation to test
    pub op: Operator,
    /// Label key or attribute name
    pub key: String,
    /// Values to compare against
    #[serde(default)]
    pub values: Vec<String>,
}

impl Query {
    /// Build a query from parts
    pub fn new<I, S>(op: Operator, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            op,
            key: key.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// `key = value`
    pub fn equal(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(Operator::MatchEqual, key, [value.into()])
    }

    /// `key != value`
    pub fn not_equal(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(Operator::MatchNotEqual, key, [value.into()])
    }

    /// `key in (values)`
    pub fn is_in<I, S>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Operator::MatchIn, key, values)
    }

    /// `key notin (values)`
    pub fn not_in<I, S>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Operator::MatchNotIn, key, values)
    }

    /// Check operator arity
    pub fn validate(&self) -> Result<(), SelectorError> {
        if self.op.is_single_valued() && self.values.len() != 1 {
            return Err(SelectorError::WrongArity {
                op: self.op,
                count: self.values.len(),
            });
        }
        Ok(())
    }

    /// Test a resource's value (`None` when the key is missing)
    ///
    /// Assumes [`Query::validate`] passed.
    pub fn matches(&self, value: Option<&str>) -> bool {
        let member = value.is_some_and(|v| self.values.iter().any(|candidate| candidate == v));

        match self.op {
            Operator::MatchEqual => value.is_some() && self.values.first().map(String::as_str) == value,
            Operator::MatchNotEqual => self.values.first().map(String::as_str) != value,
            Operator::MatchIn => member,
            Operator::MatchNotIn => !member,
        }
    }

    /// Parse selector text
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let text = input.trim();
        let fail = |reason: &str| SelectorError::Parse {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        if let Some(open) = text.find('(') {
            let mut head = text[..open].split_whitespace();
            let (Some(key), Some(op), None) = (head.next(), head.next(), head.next()) else {
                return Err(fail("expected `key in (...)` or `key notin (...)`"));
            };

            let op: Operator = op.parse()?;
            if op.is_single_valued() {
                return Err(fail("set syntax requires `in` or `notin`"));
            }

            let body = text[open + 1..]
                .strip_suffix(')')
                .ok_or_else(|| fail("missing closing parenthesis"))?;
            let values = body
                .split(',')
                .map(str::trim)
                .filter(|value| !value.is_empty());

            return Ok(Self::new(op, key, values));
        }

        let (key, op, value) = if let Some((key, value)) = text.split_once("!=") {
            (key, Operator::MatchNotEqual, value)
        } else if let Some((key, value)) = text.split_once("==") {
            (key, Operator::MatchEqual, value)
        } else if let Some((key, value)) = text.split_once('=') {
            (key, Operator::MatchEqual, value)
        } else {
            return Err(fail("no operator found"));
        };

        let key = key.trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(fail("key must be a single non-empty word"));
        }

        Ok(Self::new(op, key, [value.trim()]))
    }
}

impl FromStr for Query {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.op.is_single_valued() {
            let value = self.values.first().map(String::as_str).unwrap_or("");
            write!(f, "{}{}{}", self.key, self.op, value)
        } else {
            write!(f, "{} {} ({})", self.key, self.op, self.values.join(", "))
        }
    }
}
