//! `M:SS` and `M:SS-M:SS` time expressions.
//!
//! Minutes have no width limit; seconds are exactly two digits and are not
//! checked against 59. Parsing stops after the expression and hands back the
//! unconsumed text.

use thiserror::Error;

use crate::block::timestamp::Timestamp;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("expected a digit at offset {0}")]
    ExpectedDigit(usize),
    #[error("expected ':' at offset {0}")]
    ExpectedColon(usize),
    #[error("expected two digits of seconds at offset {0}")]
    ExpectedSeconds(usize),
    #[error("time value out of range")]
    Overflow,
}

impl TimestampError {
    fn shifted(self, by: usize) -> Self {
        match self {
            TimestampError::ExpectedDigit(at) => TimestampError::ExpectedDigit(at + by),
            TimestampError::ExpectedColon(at) => TimestampError::ExpectedColon(at + by),
            TimestampError::ExpectedSeconds(at) => TimestampError::ExpectedSeconds(at + by),
            TimestampError::Overflow => TimestampError::Overflow,
        }
    }
}

/// Parse a single `M:SS` at the start of `text` into seconds.
pub fn parse_simple(text: &str) -> Result<(u32, &str), TimestampError> {
    let bytes = text.as_bytes();
    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return Err(TimestampError::ExpectedDigit(0));
    }
    if bytes.get(digits) != Some(&b':') {
        return Err(TimestampError::ExpectedColon(digits));
    }

    let at = digits + 1;
    let (tens, ones) = match bytes.get(at..at + 2) {
        Some(&[t, o]) if t.is_ascii_digit() && o.is_ascii_digit() => (t - b'0', o - b'0'),
        _ => return Err(TimestampError::ExpectedSeconds(at)),
    };

    let minutes: u32 = text[..digits]
        .parse()
        .map_err(|_| TimestampError::Overflow)?;
    let seconds = u32::from(tens * 10 + ones);
    let total = minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or(TimestampError::Overflow)?;

    Ok((total, &text[at + 2..]))
}

/// Parse `M:SS` or `M:SS-M:SS` at the start of `text`.
pub fn parse(text: &str) -> Result<(Timestamp, &str), TimestampError> {
    let (from, rest) = parse_simple(text)?;
    let Some(second) = rest.strip_prefix('-') else {
        return Ok((Timestamp::at(from), rest));
    };

    let offset = text.len() - second.len();
    let (to, rest) = parse_simple(second).map_err(|e| e.shifted(offset))?;
    Ok((Timestamp::range(from, to), rest))
}
