//! Typed containers for flag values.
//!
//! Every flag owns a [`FlagValue`]: a closed sum over the supported value
//! kinds, dispatched by pattern matching. A box knows how to parse itself
//! from argument text ([`set`](FlagValue::set)) and render itself back
//! ([`render`](FlagValue::render)); the dispatcher only ever asks a box
//! whether it is boolean, which governs the no-argument-consumption rule
//! for `-f` / `--flag` forms.

use std::fmt;

use crate::duration::{Duration, parse_duration};
use crate::error::ValueError;

/// Side-effecting callback backing a function flag.
///
/// Invoked with the flag's textual value each time the flag is seen. A
/// returned error is treated as a value-coercion failure for that token.
pub type FlagCallback = Box<dyn FnMut(&str) -> Result<(), ValueError> + Send>;

/// The typed value owned by one flag.
///
/// # Examples
///
/// ```
/// use cmdtree_core::FlagValue;
///
/// let mut count = FlagValue::Int(5);
/// count.set("0x10").unwrap();
/// assert_eq!(count.as_isize(), Some(16));
/// assert_eq!(count.render(), "16");
///
/// // Failed coercion leaves the previous value undisturbed.
/// assert!(count.set("abc").is_err());
/// assert_eq!(count.as_isize(), Some(16));
/// ```
pub enum FlagValue {
    /// Boolean. The only kind for which [`is_boolean`](Self::is_boolean)
    /// holds.
    Bool(bool),
    /// Word-sized signed integer.
    Int(isize),
    /// 64-bit signed integer.
    Int64(i64),
    /// Word-sized unsigned integer.
    Uint(usize),
    /// 64-bit unsigned integer.
    Uint64(u64),
    /// String; `set` always succeeds.
    Str(String),
    /// 64-bit floating point.
    Float(f64),
    /// Signed duration (`1h30m` grammar).
    Duration(Duration),
    /// Side-effecting callback. Renders as the empty string and is not
    /// retrievable through the typed accessors.
    Func(FlagCallback),
}

impl fmt::Debug for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            FlagValue::Int(v) => f.debug_tuple("Int").field(v).finish(),
            FlagValue::Int64(v) => f.debug_tuple("Int64").field(v).finish(),
            FlagValue::Uint(v) => f.debug_tuple("Uint").field(v).finish(),
            FlagValue::Uint64(v) => f.debug_tuple("Uint64").field(v).finish(),
            FlagValue::Str(v) => f.debug_tuple("Str").field(v).finish(),
            FlagValue::Float(v) => f.debug_tuple("Float").field(v).finish(),
            FlagValue::Duration(v) => f.debug_tuple("Duration").field(v).finish(),
            FlagValue::Func(_) => f.write_str("Func(..)"),
        }
    }
}

// Boolean literals accepted by `set`. The historical package documentation
// also advertised y/n/yes/no forms; the coercion logic never honored them
// and they remain rejected here.
fn parse_bool(text: &str) -> Result<bool, ValueError> {
    match text {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(ValueError::Parse),
    }
}

// Splits an integer literal into sign, radix, and digit text. Accepts an
// optional leading sign and the 0x/0o/0b prefixes; anything else is decimal.
fn int_parts(text: &str) -> Result<(bool, u32, &str), ValueError> {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (radix, digits) = if let Some(d) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        (16, d)
    } else if let Some(d) = rest.strip_prefix("0o").or_else(|| rest.strip_prefix("0O")) {
        (8, d)
    } else if let Some(d) = rest.strip_prefix("0b").or_else(|| rest.strip_prefix("0B")) {
        (2, d)
    } else {
        (10, rest)
    };
    if digits.is_empty() {
        return Err(ValueError::Parse);
    }
    Ok((negative, radix, digits))
}

fn parse_signed(text: &str, min: i128, max: i128) -> Result<i128, ValueError> {
    let (negative, radix, digits) = int_parts(text)?;
    let magnitude = u128::from_str_radix(digits, radix).map_err(|e| {
        match e.kind() {
            std::num::IntErrorKind::PosOverflow => ValueError::Range,
            _ => ValueError::Parse,
        }
    })?;
    let value = i128::try_from(magnitude).map_err(|_| ValueError::Range)?;
    let value = if negative { -value } else { value };
    if value < min || value > max {
        return Err(ValueError::Range);
    }
    Ok(value)
}

fn parse_unsigned(text: &str, max: u128) -> Result<u128, ValueError> {
    let (negative, radix, digits) = int_parts(text)?;
    if negative {
        return Err(ValueError::Parse);
    }
    let value = u128::from_str_radix(digits, radix).map_err(|e| {
        match e.kind() {
            std::num::IntErrorKind::PosOverflow => ValueError::Range,
            _ => ValueError::Parse,
        }
    })?;
    if value > max {
        return Err(ValueError::Range);
    }
    Ok(value)
}

impl FlagValue {
    /// Coerces `text` into this box's type and stores it.
    ///
    /// On failure the previous value is undisturbed. Syntactic problems
    /// yield [`ValueError::Parse`]; well-formed values outside the type's
    /// range yield [`ValueError::Range`].
    ///
    /// Integer literals accept an optional leading sign and the `0x`, `0o`,
    /// and `0b` prefixes. Unsigned boxes reject a leading `-`. Boolean
    /// literals are exactly `1 0 t f T F true false TRUE FALSE True False`.
    pub fn set(&mut self, text: &str) -> Result<(), ValueError> {
        match self {
            FlagValue::Bool(v) => *v = parse_bool(text)?,
            FlagValue::Int(v) => {
                *v = parse_signed(text, isize::MIN as i128, isize::MAX as i128)? as isize;
            }
            FlagValue::Int64(v) => {
                *v = parse_signed(text, i64::MIN as i128, i64::MAX as i128)? as i64;
            }
            FlagValue::Uint(v) => *v = parse_unsigned(text, usize::MAX as u128)? as usize,
            FlagValue::Uint64(v) => *v = parse_unsigned(text, u64::MAX as u128)? as u64,
            FlagValue::Str(v) => *v = text.to_string(),
            FlagValue::Float(v) => *v = text.parse().map_err(|_| ValueError::Parse)?,
            FlagValue::Duration(v) => *v = parse_duration(text)?,
            FlagValue::Func(callback) => callback(text)?,
        }
        Ok(())
    }

    /// Renders the current value as text, the inverse of [`set`](Self::set).
    ///
    /// Function boxes render as the empty string.
    pub fn render(&self) -> String {
        match self {
            FlagValue::Bool(v) => v.to_string(),
            FlagValue::Int(v) => v.to_string(),
            FlagValue::Int64(v) => v.to_string(),
            FlagValue::Uint(v) => v.to_string(),
            FlagValue::Uint64(v) => v.to_string(),
            FlagValue::Str(v) => v.clone(),
            FlagValue::Float(v) => v.to_string(),
            FlagValue::Duration(v) => v.to_string(),
            FlagValue::Func(_) => String::new(),
        }
    }

    /// True only for the boolean box. Governs the dispatcher's
    /// no-argument-consumption rule: `-f`/`--flag` with no value is legal
    /// only when this holds.
    pub fn is_boolean(&self) -> bool {
        matches!(self, FlagValue::Bool(_))
    }

    /// Placeholder name for this kind in usage text; empty for booleans.
    pub fn kind(&self) -> &'static str {
        match self {
            FlagValue::Bool(_) => "",
            FlagValue::Int(_) | FlagValue::Int64(_) => "int",
            FlagValue::Uint(_) | FlagValue::Uint64(_) => "uint",
            FlagValue::Str(_) => "string",
            FlagValue::Float(_) => "float",
            FlagValue::Duration(_) => "duration",
            FlagValue::Func(_) => "value",
        }
    }

    /// A fresh box of the same kind holding its zero value. Used for
    /// zero-default detection in usage rendering. `None` for function
    /// boxes, which have no meaningful zero.
    pub fn zeroed(&self) -> Option<FlagValue> {
        match self {
            FlagValue::Bool(_) => Some(FlagValue::Bool(false)),
            FlagValue::Int(_) => Some(FlagValue::Int(0)),
            FlagValue::Int64(_) => Some(FlagValue::Int64(0)),
            FlagValue::Uint(_) => Some(FlagValue::Uint(0)),
            FlagValue::Uint64(_) => Some(FlagValue::Uint64(0)),
            FlagValue::Str(_) => Some(FlagValue::Str(String::new())),
            FlagValue::Float(_) => Some(FlagValue::Float(0.0)),
            FlagValue::Duration(_) => Some(FlagValue::Duration(Duration::ZERO)),
            FlagValue::Func(_) => None,
        }
    }

    /// The boolean value, if this is a boolean box.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The word-sized signed integer value, if present.
    pub fn as_isize(&self) -> Option<isize> {
        match self {
            FlagValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The 64-bit signed integer value, if present.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FlagValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// The word-sized unsigned integer value, if present.
    pub fn as_usize(&self) -> Option<usize> {
        match self {
            FlagValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    /// The 64-bit unsigned integer value, if present.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FlagValue::Uint64(v) => Some(*v),
            _ => None,
        }
    }

    /// The string value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlagValue::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// The floating-point value, if present.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FlagValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// The duration value, if present.
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            FlagValue::Duration(v) => Some(*v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_defaults() {
        let boxes = [
            FlagValue::Bool(true),
            FlagValue::Int(-42),
            FlagValue::Int64(1 << 40),
            FlagValue::Uint(7),
            FlagValue::Uint64(u64::MAX),
            FlagValue::Str("hello world".into()),
            FlagValue::Float(2.5),
            FlagValue::Duration(Duration::from_secs(5400)),
        ];
        for mut value in boxes {
            let text = value.render();
            value.set(&text).unwrap();
            assert_eq!(value.render(), text);
        }
    }

    #[test]
    fn test_bool_literal_set_is_exact() {
        let mut v = FlagValue::Bool(false);
        for ok in ["1", "t", "T", "true", "TRUE", "True"] {
            v.set(ok).unwrap();
            assert_eq!(v.as_bool(), Some(true));
        }
        for ok in ["0", "f", "F", "false", "FALSE", "False"] {
            v.set(ok).unwrap();
            assert_eq!(v.as_bool(), Some(false));
        }
        // The doc-advertised yes/no forms are not honored.
        for bad in ["y", "n", "yes", "no", "Yes", "NO", "tRuE", "2", ""] {
            assert_eq!(v.set(bad), Err(ValueError::Parse));
        }
    }

    #[test]
    fn test_int_prefixed_forms() {
        let mut v = FlagValue::Int64(0);
        v.set("1234").unwrap();
        assert_eq!(v.as_i64(), Some(1234));
        v.set("-0x10").unwrap();
        assert_eq!(v.as_i64(), Some(-16));
        v.set("0o17").unwrap();
        assert_eq!(v.as_i64(), Some(15));
        v.set("0b101").unwrap();
        assert_eq!(v.as_i64(), Some(5));
        v.set("+7").unwrap();
        assert_eq!(v.as_i64(), Some(7));
    }

    #[test]
    fn test_int_overflow_is_range_error() {
        let mut v = FlagValue::Int64(3);
        assert_eq!(v.set("9223372036854775808"), Err(ValueError::Range));
        // previous value undisturbed
        assert_eq!(v.as_i64(), Some(3));
        v.set("9223372036854775807").unwrap();
        assert_eq!(v.as_i64(), Some(i64::MAX));
        v.set("-9223372036854775808").unwrap();
        assert_eq!(v.as_i64(), Some(i64::MIN));
    }

    #[test]
    fn test_unsigned_rejects_leading_minus() {
        let mut v = FlagValue::Uint64(9);
        assert_eq!(v.set("-1"), Err(ValueError::Parse));
        assert_eq!(v.as_u64(), Some(9));
        assert_eq!(v.set("18446744073709551616"), Err(ValueError::Range));
    }

    #[test]
    fn test_malformed_is_parse_error() {
        let mut v = FlagValue::Int(0);
        assert_eq!(v.set("abc"), Err(ValueError::Parse));
        assert_eq!(v.set(""), Err(ValueError::Parse));
        assert_eq!(v.set("0x"), Err(ValueError::Parse));

        let mut v = FlagValue::Float(0.0);
        assert_eq!(v.set("not-a-float"), Err(ValueError::Parse));
        v.set("2.5e3").unwrap();
        assert_eq!(v.as_f64(), Some(2500.0));
    }

    #[test]
    fn test_func_box_runs_callback() {
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut v = FlagValue::Func(Box::new(move |text| {
            sink.lock().unwrap().push(text.to_string());
            Ok(())
        }));
        v.set("one").unwrap();
        v.set("two").unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["one", "two"]);
        assert_eq!(v.render(), "");
        assert!(!v.is_boolean());
        assert_eq!(v.as_str(), None);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(FlagValue::Bool(false).kind(), "");
        assert_eq!(FlagValue::Int(0).kind(), "int");
        assert_eq!(FlagValue::Uint64(0).kind(), "uint");
        assert_eq!(FlagValue::Duration(Duration::ZERO).kind(), "duration");
    }
}
