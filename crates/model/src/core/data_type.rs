//! The closed set of column value types.
//!
//! Every variant shares the same two-operation contract: [`DataType::set`]
//! turns raw input into the canonical storage string (or refuses it with a
//! [`ValidationError`]), and [`DataType::get`] reads a stored string back as
//! a native [`Value`]. Values in the sentinel namespace pass through both
//! operations untouched.

use crate::{
    core::{sentinel, value::Value},
    error::{UnknownTypeError, ValidationError, ValidationReason},
};
use chrono::{Datelike, NaiveDate, Weekday};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, collections::HashSet, fmt, str::FromStr};

/// Largest integer magnitude that survives a round trip through an IEEE-754 double.
pub const MAX_SAFE_INTEGER: i128 = 9_007_199_254_740_991;

const STORAGE_DATE_FORMAT: &str = "%Y-%m-%d";

lazy_static! {
    static ref FALSE_WORDS: HashSet<&'static str> = [
        "0", "no", "false", "off", "null", "undefined", "nan", "none", ""
    ]
    .into_iter()
    .collect();
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Integer,
    Float,
    Boolean,
    Day,
    Week,
    Month,
    Year,
    #[default]
    String,
}

impl DataType {
    pub const ALL: [DataType; 8] = [
        DataType::Integer,
        DataType::Float,
        DataType::Boolean,
        DataType::Day,
        DataType::Week,
        DataType::Month,
        DataType::Year,
        DataType::String,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::Boolean => "boolean",
            DataType::Day => "day",
            DataType::Week => "week",
            DataType::Month => "month",
            DataType::Year => "year",
            DataType::String => "string",
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(
            self,
            DataType::Day | DataType::Week | DataType::Month | DataType::Year
        )
    }

    /// Physical column type used when the table is created.
    pub fn postgres_name(&self) -> Cow<'static, str> {
        match self {
            // The safe integer range needs 54 bits, so INTEGER is too narrow.
            DataType::Integer => Cow::Borrowed("BIGINT"),
            DataType::Float => Cow::Borrowed("REAL"),
            DataType::Boolean => Cow::Borrowed("BOOLEAN"),
            DataType::Day | DataType::Week | DataType::Month | DataType::Year => {
                Cow::Borrowed("DATE")
            }
            DataType::String => Cow::Borrowed("TEXT"),
        }
    }

    /// Normalizes raw input into its canonical storage string.
    pub fn set(&self, raw: &str) -> Result<String, ValidationError> {
        if sentinel::is_sentinel(raw) {
            return Ok(raw.to_string());
        }

        match self {
            DataType::Integer => parse_integer(raw)
                .map(|v| v.to_string())
                .map_err(|reason| ValidationError::new(*self, raw, reason)),
            DataType::Float => parse_float(raw)
                .map(|v| ryu::Buffer::new().format_finite(v).to_string())
                .map_err(|reason| ValidationError::new(*self, raw, reason)),
            DataType::Boolean => Ok(parse_boolean(raw).to_string()),
            DataType::Day | DataType::Week | DataType::Month | DataType::Year => {
                let date = self.parse_date(raw)?;
                Ok(date.format(STORAGE_DATE_FORMAT).to_string())
            }
            DataType::String => Ok(raw.to_string()),
        }
    }

    /// Reads a stored string back as a native value.
    pub fn get(&self, stored: &str) -> Result<Value, ValidationError> {
        if sentinel::is_sentinel(stored) {
            return Ok(Value::String(stored.to_string()));
        }
        if stored.is_empty() && *self != DataType::Boolean {
            return Ok(Value::Null);
        }

        match self {
            DataType::Integer => parse_integer(stored)
                .map(|v| Value::Int(v as i64))
                .map_err(|reason| ValidationError::new(*self, stored, reason)),
            DataType::Float => parse_float(stored)
                .map(Value::Float)
                .map_err(|reason| ValidationError::new(*self, stored, reason)),
            DataType::Boolean => Ok(Value::Boolean(parse_boolean(stored))),
            DataType::Day | DataType::Week | DataType::Month | DataType::Year => {
                self.parse_date(stored).map(Value::Date)
            }
            DataType::String => Ok(Value::String(stored.to_string())),
        }
    }

    /// Renders a native value in the canonical external display format.
    pub fn display(&self, value: &Value) -> String {
        match (self, value) {
            (DataType::Year, Value::Date(d)) => d.format("%Y").to_string(),
            (DataType::Month, Value::Date(d)) => d.format("%Y-%m").to_string(),
            (DataType::Day, Value::Date(d)) => d.format(STORAGE_DATE_FORMAT).to_string(),
            (DataType::Week, Value::Date(d)) => {
                let week = d.iso_week();
                format!("{} wk {}", week.year(), week.week())
            }
            (DataType::Float, Value::Float(v)) if v.is_finite() => {
                ryu::Buffer::new().format_finite(*v).to_string()
            }
            (_, Value::Null) => String::new(),
            (_, Value::String(s)) => s.clone(),
            (_, other) => other.to_string(),
        }
    }

    fn parse_date(&self, raw: &str) -> Result<NaiveDate, ValidationError> {
        let date = parse_calendar_date(raw.trim())
            .ok_or_else(|| ValidationError::new(*self, raw, ValidationReason::NotParseable))?;

        let truncated = match self {
            DataType::Week => {
                let week = date.iso_week();
                NaiveDate::from_isoywd_opt(week.year(), week.week(), Weekday::Mon)
            }
            DataType::Month => date.with_day(1),
            DataType::Year => date.with_ordinal(1),
            _ => Some(date),
        };

        truncated.ok_or_else(|| ValidationError::new(*self, raw, ValidationReason::NotParseable))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = UnknownTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "integer" | "int" => Ok(DataType::Integer),
            "float" | "real" | "number" => Ok(DataType::Float),
            "boolean" | "bool" => Ok(DataType::Boolean),
            "day" | "date" => Ok(DataType::Day),
            "week" => Ok(DataType::Week),
            "month" => Ok(DataType::Month),
            "year" => Ok(DataType::Year),
            "string" | "text" => Ok(DataType::String),
            _ => Err(UnknownTypeError(s.to_string())),
        }
    }
}

/// Leading-prefix integer parse: surrounding junk after the digits is ignored,
/// so `"2g"` reads as `2` and `"2.7"` as `2`.
fn parse_integer(raw: &str) -> Result<i128, ValidationReason> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Err(ValidationReason::NotParseable);
    }

    let significant = rest[..digits].trim_start_matches('0');
    if significant.len() > 16 {
        return Err(ValidationReason::OutsideSafeRange);
    }

    let magnitude: i128 = if significant.is_empty() {
        0
    } else {
        significant
            .parse()
            .map_err(|_| ValidationReason::NotParseable)?
    };
    if magnitude > MAX_SAFE_INTEGER {
        return Err(ValidationReason::OutsideSafeRange);
    }

    Ok(if negative { -magnitude } else { magnitude })
}

/// Leading-prefix float parse in the same spirit as [`parse_integer`].
fn parse_float(raw: &str) -> Result<f64, ValidationReason> {
    let s = raw.trim_start();
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    if unsigned.starts_with("Infinity") {
        return Err(ValidationReason::Infinite);
    }

    let end = float_prefix_len(s);
    if end == 0 {
        return Err(ValidationReason::NotParseable);
    }

    let value: f64 = s[..end]
        .parse()
        .map_err(|_| ValidationReason::NotParseable)?;
    if value.is_infinite() {
        return Err(ValidationReason::Infinite);
    }
    Ok(value)
}

/// Length of the longest prefix of `s` shaped like `[+-]digits[.digits][e[+-]digits]`.
fn float_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if mantissa_digits > 0 || j > frac_start {
            mantissa_digits += j - frac_start;
            i = j;
        }
    }

    if mantissa_digits == 0 {
        return 0;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    i
}

fn parse_boolean(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    !FALSE_WORDS.contains(lowered.as_str())
}

/// Accepts `YYYY`, `YYYY-MM`, `YYYY-MM-DD` (with an optional time suffix),
/// and the week display form `YYYY wk W`.
fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    if let Some((year, week)) = s.split_once(" wk ") {
        let year: i32 = year.trim().parse().ok()?;
        let week: u32 = week.trim().parse().ok()?;
        return NaiveDate::from_isoywd_opt(year, week, Weekday::Mon);
    }

    let bytes = s.as_bytes();
    let all_digits = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);

    match bytes.len() {
        4 if all_digits(0..4) => NaiveDate::from_ymd_opt(s.parse().ok()?, 1, 1),
        7 if all_digits(0..4) && bytes[4] == b'-' && all_digits(5..7) => {
            NaiveDate::from_ymd_opt(s[..4].parse().ok()?, s[5..7].parse().ok()?, 1)
        }
        n if n >= 10 && s.is_char_boundary(10) => {
            if n > 10 && !matches!(bytes[10], b'T' | b' ') {
                return None;
            }
            NaiveDate::parse_from_str(&s[..10], STORAGE_DATE_FORMAT).ok()
        }
        _ => None,
    }
}
