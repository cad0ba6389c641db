// Field extraction shared by the tool output parsers

use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("missing field `{field}` (position {index}) in line: {line}")]
    MissingField {
        field: &'static str,
        index: usize,
        line: String,
    },
    #[error("field `{field}` has invalid value {value:?}: {reason}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("latency summary not found in tool output")]
    MissingSummary,
}

/// Returns the token at `index`, or a `MissingField` error naming the line.
pub fn field<'a>(
    tokens: &[&'a str],
    index: usize,
    name: &'static str,
    line: &str,
) -> Result<&'a str, ParseError> {
    tokens.get(index).copied().ok_or_else(|| ParseError::MissingField {
        field: name,
        index,
        line: line.trim().to_string(),
    })
}

/// Parses a numeric token, keeping the offending text in the error.
pub fn number<T>(name: &'static str, value: &str) -> Result<T, ParseError>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse::<T>().map_err(|e| ParseError::InvalidNumber {
        field: name,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Splits a `a/b` style token, requiring at least `min` segments.
pub fn segments<'a>(
    token: &'a str,
    min: usize,
    name: &'static str,
    line: &str,
) -> Result<Vec<&'a str>, ParseError> {
    let parts: Vec<&str> = token.split('/').collect();
    if parts.len() < min {
        return Err(ParseError::MissingField {
            field: name,
            index: parts.len(),
            line: line.trim().to_string(),
        });
    }
    Ok(parts)
}
