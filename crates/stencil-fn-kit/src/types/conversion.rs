//! Coercion of loosely-typed template values into declared parameter types.
//!
//! Every supported source/destination pair is listed in [`try_convert`]; text
//! that does not fit any pair gets a destination-specific parse in
//! [`parse_text`] so that failures can name the literal that was rejected.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::trace;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::{BOOL_FALSE_TOKEN, BOOL_TRUE_TOKEN, DATETIME_FORMATS, DATE_FORMATS};

use super::type_compatibility::{ConvertibilityChecker, TypeChecker};
use super::types::{Type, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ConversionErrorKind {
    /// No rule bridges the source and destination types.
    Unconvertible,
    /// Text matched a destination family but failed its format-specific parse.
    ParseFailure,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConversionError {
    pub kind: ConversionErrorKind,
    pub value: Value,
    pub destination: Type,
}

impl ConversionError {
    pub fn new(kind: ConversionErrorKind, value: Value, destination: Type) -> Self {
        ConversionError { kind, value, destination }
    }

    pub fn unconvertible(value: Value, destination: Type) -> Self {
        Self::new(ConversionErrorKind::Unconvertible, value, destination)
    }

    pub fn parse_failure(text: &str, destination: Type) -> Self {
        Self::new(ConversionErrorKind::ParseFailure, Value::string(text), destination)
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ConversionErrorKind::ParseFailure => {
                write!(f, "unable to parse '{}' as {}", self.value, self.destination)
            }
            ConversionErrorKind::Unconvertible => write!(
                f,
                "no conversion from {} '{}' to {}",
                self.value.type_name(),
                self.value,
                self.destination
            ),
        }
    }
}

impl std::error::Error for ConversionError {}

pub type ConversionOutcome = Result<Value, ConversionError>;

/// Stateless converter from raw values to declared destination types.
pub struct ValueConverter;

impl ValueConverter {
    /// Convert `value` so that it satisfies `destination`.
    ///
    /// The rules are applied in order: nulls resolve to the destination's
    /// default; values already of the destination type (or one of its
    /// subtypes) pass through untouched; pairs accepted by the
    /// [`ConvertibilityChecker`] go through the built-in conversion table;
    /// remaining text gets a destination-specific parse; anything else is
    /// unconvertible.
    pub fn convert(value: &Value, destination: &Type) -> ConversionOutcome {
        if value.is_null() {
            trace!("null resolved to the default of {}", destination);
            return Ok(destination.default_value());
        }

        if TypeChecker::matches(value, destination) {
            return Ok(value.clone());
        }

        if ConvertibilityChecker::is_value_convertible(value, destination) {
            if let Some(converted) = try_convert(value, destination.underlying()) {
                trace!("converted {} to {}", value.type_name(), destination);
                return Ok(converted);
            }
        }

        if let Value::String(text) = value {
            if text.trim().is_empty() && destination.is_nullable() {
                trace!("blank text resolved to null for {}", destination);
                return Ok(Value::Null);
            }
            return parse_text(text, destination.underlying());
        }

        Err(ConversionError::unconvertible(value.clone(), destination.clone()))
    }
}

/// Built-in conversion table. Returns `None` for every pair without a rule,
/// and for values outside the destination's range.
pub(crate) fn try_convert(value: &Value, destination: &Type) -> Option<Value> {
    let destination = destination.underlying();
    if TypeChecker::matches(value, destination) {
        return Some(value.clone());
    }
    match (value, destination) {
        (Value::Null, _) => None,
        (Value::String(_), Type::Enum(_)) => None,
        (Value::String(text), _) => parse_text(text, destination).ok(),

        (Value::Integer(i), Type::Float) => Some(Value::Float(*i as f64)),
        (Value::Integer(i), Type::Decimal) => Some(Value::Decimal(Decimal::from(*i))),
        (Value::Integer(i), Type::Byte) => u8::try_from(*i).ok().map(Value::Byte),
        (Value::Integer(i), Type::Bool) => Some(Value::Bool(*i != 0)),
        (Value::Integer(i), Type::Char) => {
            u32::try_from(*i).ok().and_then(char::from_u32).map(Value::Char)
        }

        (Value::Float(f), Type::Integer) => float_to_integer(*f).map(Value::Integer),
        (Value::Float(f), Type::Byte) => {
            float_to_integer(*f).and_then(|i| u8::try_from(i).ok()).map(Value::Byte)
        }
        (Value::Float(f), Type::Decimal) => Decimal::from_f64(*f).map(Value::Decimal),
        (Value::Float(f), Type::Bool) => Some(Value::Bool(*f != 0.0)),

        (Value::Decimal(d), Type::Integer) => {
            d.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
                .to_i64()
                .map(Value::Integer)
        }
        (Value::Decimal(d), Type::Byte) => {
            d.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
                .to_u8()
                .map(Value::Byte)
        }
        (Value::Decimal(d), Type::Float) => d.to_f64().map(Value::Float),
        (Value::Decimal(d), Type::Bool) => Some(Value::Bool(!d.is_zero())),

        (Value::Byte(b), Type::Integer) => Some(Value::Integer(i64::from(*b))),
        (Value::Byte(b), Type::Float) => Some(Value::Float(f64::from(*b))),
        (Value::Byte(b), Type::Decimal) => Some(Value::Decimal(Decimal::from(*b))),
        (Value::Byte(b), Type::Bool) => Some(Value::Bool(*b != 0)),
        (Value::Byte(b), Type::Char) => Some(Value::Char(char::from(*b))),

        (Value::Bool(b), Type::Integer) => Some(Value::Integer(i64::from(*b))),
        (Value::Bool(b), Type::Float) => Some(Value::Float(if *b { 1.0 } else { 0.0 })),
        (Value::Bool(b), Type::Decimal) => {
            Some(Value::Decimal(if *b { Decimal::ONE } else { Decimal::ZERO }))
        }
        (Value::Bool(b), Type::Byte) => Some(Value::Byte(u8::from(*b))),

        (Value::Char(c), Type::Integer) => Some(Value::Integer(i64::from(u32::from(*c)))),
        (Value::Char(c), Type::Byte) => u8::try_from(*c).ok().map(Value::Byte),

        (Value::Enum(member), Type::Integer) => {
            i64::try_from(member.ordinal).ok().map(Value::Integer)
        }

        (Value::Object(_), _) => None,
        (_, Type::String) => Some(Value::String(value.to_string())),
        _ => None,
    }
}

/// Destination-specific parse of `text`; `destination` must already be
/// unwrapped from any nullable wrapper.
pub(crate) fn parse_text(text: &str, destination: &Type) -> ConversionOutcome {
    let parsed = match destination {
        Type::String => Some(Value::string(text)),
        Type::Integer | Type::Float | Type::Decimal | Type::Byte => {
            parse_numeric(text, destination)
        }
        Type::Bool => parse_bool(text).map(Value::Bool),
        Type::DateTime => parse_datetime(text).map(Value::DateTime),
        Type::Char => parse_char(text).map(Value::Char),
        Type::Enum(definition) => definition.member(text).map(Value::Enum),
        Type::Nullable(inner) => return parse_text(text, inner),
        Type::Object(_) | Type::Any => {
            return Err(ConversionError::unconvertible(Value::string(text), destination.clone()))
        }
    };
    parsed.ok_or_else(|| ConversionError::parse_failure(text, destination.clone()))
}

/// Culture-invariant parse of `text` into one of the numeric families.
pub(crate) fn parse_numeric(text: &str, destination: &Type) -> Option<Value> {
    match destination.underlying() {
        Type::Integer => parse_integer(text).map(Value::Integer),
        Type::Byte => parse_integer(text).and_then(|i| u8::try_from(i).ok()).map(Value::Byte),
        Type::Float => parse_float(text).map(Value::Float),
        Type::Decimal => parse_decimal(text).map(Value::Decimal),
        _ => None,
    }
}

fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<i64>().ok()
}

/// Sign, digits, an optional `.` fraction and an optional exponent. Rejects the
/// `inf`/`NaN` spellings `f64::from_str` would otherwise accept.
fn is_invariant_number(text: &str, allow_exponent: bool) -> bool {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(idx) if allow_exponent => (&unsigned[..idx], Some(&unsigned[idx + 1..])),
        Some(_) => return false,
        None => (unsigned, None),
    };
    let mut parts = mantissa.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next().unwrap_or_default();
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() && fraction.is_empty() {
        return false;
    }
    if !all_digits(whole) || !all_digits(fraction) {
        return false;
    }
    match exponent {
        None => true,
        Some(exp) => {
            let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !exp.is_empty() && all_digits(exp)
        }
    }
}

fn parse_float(text: &str) -> Option<f64> {
    let text = text.trim();
    if !is_invariant_number(text, true) {
        return None;
    }
    text.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if !is_invariant_number(text, true) {
        return None;
    }
    let text = text.strip_prefix('+').unwrap_or(text);
    if text.contains(['e', 'E']) {
        Decimal::from_scientific(text).ok()
    } else {
        Decimal::from_str(text).ok()
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case(BOOL_TRUE_TOKEN) {
        Some(true)
    } else if text.eq_ignore_ascii_case(BOOL_FALSE_TOKEN) {
        Some(false)
    } else {
        None
    }
}

fn parse_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Banker's rounding to the nearest integer, `None` when out of range.
fn float_to_integer(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let rounded = value.round_ties_even();
    // i64::MAX is not representable as f64; 2^63 is the first value out of range.
    if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return None;
    }
    Some(rounded as i64)
}
