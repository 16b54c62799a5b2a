//! Capability values and their tabular encoding.
//!
//! A capability is one of four categorical tags. In the roster store it is
//! written as an integer, in CSV cells as `-1`, `0`, `1` or `w`.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────
// Capability
// ─────────────────────────────────────────────────────────────────

/// Four-state skill proficiency tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Capability {
    /// Cannot do this work (-1).
    Excluded,
    /// Fallback/helper (0). Absence of a value means Passive.
    #[default]
    Passive,
    /// Primary skill (1).
    Active,
    /// Assisted/learning, scheduled with a modifier (2, written `w`).
    Weighted,
}

impl Capability {
    /// Integer form used by the roster store.
    pub fn value(self) -> i8 {
        match self {
            Capability::Excluded => -1,
            Capability::Passive => 0,
            Capability::Active => 1,
            Capability::Weighted => 2,
        }
    }

    /// Inverse of [`Capability::value`].
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            -1 => Some(Capability::Excluded),
            0 => Some(Capability::Passive),
            1 => Some(Capability::Active),
            2 => Some(Capability::Weighted),
            _ => None,
        }
    }

    /// Cell text written to CSV.
    pub fn encode(self) -> &'static str {
        match self {
            Capability::Excluded => "-1",
            Capability::Passive => "0",
            Capability::Active => "1",
            Capability::Weighted => "w",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.encode())
    }
}

impl Serialize for Capability {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.value())
    }
}

// ─────────────────────────────────────────────────────────────────
// Raw input kinds
// ─────────────────────────────────────────────────────────────────

/// Untrusted cell content, classified before decoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawCell<'a> {
    /// Empty, whitespace, or a null marker (`nan`, `none`).
    Absent,
    /// A number. Text cells qualify only as `-?digits` with an optional
    /// all-zero fraction, so `+1`, `1e0` and `1.5` stay text.
    Numeric(f64),
    /// Everything else.
    Text(&'a str),
}

impl<'a> RawCell<'a> {
    /// Classify a textual cell.
    pub fn classify(text: &'a str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("nan")
            || trimmed.eq_ignore_ascii_case("none")
        {
            return RawCell::Absent;
        }
        if !is_integral_text(trimmed) {
            return RawCell::Text(trimmed);
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => RawCell::Numeric(n),
            _ => RawCell::Text(trimmed),
        }
    }

    /// Classify a JSON value from the roster store. Arrays, objects and
    /// booleans have no cell form and yield `None`.
    pub fn from_json(value: &'a serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(RawCell::Absent),
            serde_json::Value::Number(n) => n.as_f64().map(RawCell::Numeric),
            serde_json::Value::String(s) => Some(RawCell::classify(s)),
            _ => None,
        }
    }
}

/// `-?[0-9]+(\.0*)?`
fn is_integral_text(text: &str) -> bool {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let (int, frac) = match unsigned.split_once('.') {
        Some((int, frac)) => (int, frac),
        None => (unsigned, ""),
    };
    !int.is_empty() && int.bytes().all(|b| b.is_ascii_digit()) && frac.bytes().all(|b| b == b'0')
}

impl fmt::Display for RawCell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawCell::Absent => Ok(()),
            RawCell::Numeric(n) => write!(f, "{}", n),
            RawCell::Text(s) => f.write_str(s),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Codec
// ─────────────────────────────────────────────────────────────────

/// Decode a classified cell.
pub fn decode(raw: RawCell<'_>) -> Result<Capability> {
    match raw {
        RawCell::Absent => Ok(Capability::Passive),
        RawCell::Numeric(n) if n.fract() == 0.0 => {
            Capability::from_value(n as i64).ok_or_else(|| Error::invalid_value(raw.to_string()))
        }
        RawCell::Numeric(_) => Err(Error::invalid_value(raw.to_string())),
        RawCell::Text(s) if s.eq_ignore_ascii_case("w") => Ok(Capability::Weighted),
        RawCell::Text(s) => Err(Error::invalid_value(s)),
    }
}

/// Decode a CSV cell. The error carries the cell exactly as written.
pub fn decode_str(text: &str) -> Result<Capability> {
    decode(RawCell::classify(text)).map_err(|_| Error::invalid_value(text))
}

/// Encode a value for a CSV cell.
pub fn encode(value: Capability) -> &'static str {
    value.encode()
}
