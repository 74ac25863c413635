//! Per-type value casters and their inverse encoders.
//!
//! Every caster is a pure function of the raw cell and the configuration the
//! owning [`crate::field::Field`] hands it. Casters never consult the
//! missing-value set; that filter is applied by the schema before a caster is
//! reached.
//!
//! Temporal casters understand three kinds of format:
//!
//! - `default`: a fixed ISO-style pattern per type
//! - `any`: an ordered list of known patterns, first full match wins
//! - anything else: an explicit strftime pattern (a legacy `fmt:` prefix is
//!   stripped)

use std::{fmt::Write as _, sync::OnceLock};

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::{
    data::{GeoPoint, Value, YearMonth},
    error::CastError,
};

pub const DEFAULT_FORMAT: &str = "default";
pub const ANY_FORMAT: &str = "any";

pub const DEFAULT_DATE_PATTERN: &str = "%Y-%m-%d";
pub const DEFAULT_TIME_PATTERN: &str = "%H:%M:%S";
pub const DEFAULT_DATETIME_PATTERN: &str = "%Y-%m-%dT%H:%M:%SZ";

const ANY_DATE_PATTERNS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const ANY_TIME_PATTERNS: &[&str] = &[
    "%H:%M:%S",
    "%H:%M:%S%.f",
    "%H:%M",
    "%I:%M:%S %p",
    "%I:%M %p",
];

const ANY_DATETIME_PATTERNS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn email_pattern() -> &'static Regex {
    EMAIL_PATTERN.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("email pattern compiles")
    })
}

fn explicit_pattern(format: &str) -> &str {
    format.strip_prefix("fmt:").unwrap_or(format)
}

fn is_number_special(value: &str) -> Option<f64> {
    if value.eq_ignore_ascii_case("nan") {
        Some(f64::NAN)
    } else if value.eq_ignore_ascii_case("inf") || value.eq_ignore_ascii_case("+inf") {
        Some(f64::INFINITY)
    } else if value.eq_ignore_ascii_case("-inf") {
        Some(f64::NEG_INFINITY)
    } else {
        None
    }
}

/// Strips currency/percent style adornments around a numeric literal while
/// keeping a leading sign, e.g. `"-$1,000"` -> `"-1,000"`, `"95%"` -> `"95"`.
fn strip_number_adornments(value: &str) -> String {
    let keep_leading = |c: char| c.is_ascii_digit() || matches!(c, '.' | '-' | '+');
    let body = value.trim_start_matches(|c: char| !keep_leading(c));
    let (sign, body) = match body.chars().next() {
        Some(c @ ('-' | '+')) => (Some(c), &body[1..]),
        _ => (None, body),
    };
    let body = body
        .trim_start_matches(|c: char| !(c.is_ascii_digit() || c == '.'))
        .trim_end_matches(|c: char| !(c.is_ascii_digit() || c == '.'));
    let mut out = String::with_capacity(body.len() + 1);
    if let Some(sign) = sign {
        out.push(sign);
    }
    out.push_str(body);
    out
}

pub fn cast_integer(value: &str, bare_number: bool) -> Result<Value, CastError> {
    let trimmed = value.trim();
    let candidate = if bare_number {
        trimmed.to_string()
    } else {
        strip_number_adornments(trimmed)
    };
    candidate
        .parse::<i64>()
        .map(Value::Integer)
        .map_err(|_| CastError::Integer {
            raw: value.to_string(),
        })
}

pub fn cast_number(
    value: &str,
    decimal_char: &str,
    group_char: &str,
    bare_number: bool,
) -> Result<Value, CastError> {
    let trimmed = value.trim();
    if let Some(special) = is_number_special(trimmed) {
        return Ok(Value::Number(special));
    }
    let fail = || CastError::Number {
        raw: value.to_string(),
    };

    let mut normalized = if group_char.is_empty() {
        trimmed.to_string()
    } else {
        trimmed.replace(group_char, "")
    };
    if !decimal_char.is_empty() && decimal_char != "." {
        normalized = normalized.replace(decimal_char, ".");
    }
    if !bare_number {
        normalized = strip_number_adornments(&normalized);
    }
    // f64's parser also accepts words like "infinity"; only plain numerals pass here.
    if normalized.is_empty()
        || !normalized
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
    {
        return Err(fail());
    }
    normalized
        .parse::<f64>()
        .map(Value::Number)
        .map_err(|_| fail())
}

pub fn cast_boolean(
    value: &str,
    true_values: &[String],
    false_values: &[String],
) -> Result<Value, CastError> {
    let folded = value.trim().to_lowercase();
    let matches = |literal: &String| literal.to_lowercase() == folded;
    if true_values.iter().any(matches) {
        return Ok(Value::Boolean(true));
    }
    if false_values.iter().any(matches) {
        return Ok(Value::Boolean(false));
    }
    Err(CastError::Boolean {
        raw: value.to_string(),
    })
}

pub fn cast_string(value: &str, format: &str) -> Result<Value, CastError> {
    let valid = match format {
        DEFAULT_FORMAT => true,
        "email" => email_pattern().is_match(value),
        "uri" => url::Url::parse(value).is_ok(),
        "binary" => BASE64.decode(value).is_ok(),
        "uuid" => Uuid::parse_str(value).is_ok(),
        other => {
            return Err(CastError::UnsupportedFormat {
                kind: "string",
                format: other.to_string(),
            });
        }
    };
    if valid {
        Ok(Value::String(value.to_string()))
    } else {
        Err(CastError::StringFormat {
            raw: value.to_string(),
            format: format.to_string(),
        })
    }
}

pub fn cast_date(value: &str, format: &str) -> Result<Value, CastError> {
    let trimmed = value.trim();
    let parsed = match format {
        DEFAULT_FORMAT => NaiveDate::parse_from_str(trimmed, DEFAULT_DATE_PATTERN).ok(),
        ANY_FORMAT => ANY_DATE_PATTERNS
            .iter()
            .find_map(|pattern| NaiveDate::parse_from_str(trimmed, pattern).ok()),
        explicit => NaiveDate::parse_from_str(trimmed, explicit_pattern(explicit)).ok(),
    };
    parsed.map(Value::Date).ok_or_else(|| CastError::Temporal {
        raw: value.to_string(),
        kind: "date",
        format: format.to_string(),
    })
}

pub fn cast_time(value: &str, format: &str) -> Result<Value, CastError> {
    let trimmed = value.trim();
    let parsed = match format {
        DEFAULT_FORMAT => NaiveTime::parse_from_str(trimmed, DEFAULT_TIME_PATTERN).ok(),
        ANY_FORMAT => ANY_TIME_PATTERNS
            .iter()
            .find_map(|pattern| NaiveTime::parse_from_str(trimmed, pattern).ok()),
        explicit => NaiveTime::parse_from_str(trimmed, explicit_pattern(explicit)).ok(),
    };
    parsed.map(Value::Time).ok_or_else(|| CastError::Temporal {
        raw: value.to_string(),
        kind: "time",
        format: format.to_string(),
    })
}

fn pattern_has_offset(pattern: &str) -> bool {
    pattern.contains("%z") || pattern.contains("%:z") || pattern.contains("%#z")
}

fn parse_datetime_pattern(value: &str, pattern: &str) -> Option<NaiveDateTime> {
    if pattern_has_offset(pattern) {
        DateTime::parse_from_str(value, pattern)
            .ok()
            .map(|dt| dt.naive_utc())
    } else {
        NaiveDateTime::parse_from_str(value, pattern).ok()
    }
}

/// Offset-bearing inputs are normalized to UTC; everything else stays naive.
pub fn cast_datetime(value: &str, format: &str) -> Result<Value, CastError> {
    let trimmed = value.trim();
    let parsed = match format {
        DEFAULT_FORMAT => NaiveDateTime::parse_from_str(trimmed, DEFAULT_DATETIME_PATTERN).ok(),
        ANY_FORMAT => DateTime::parse_from_rfc3339(trimmed)
            .ok()
            .map(|dt| dt.naive_utc())
            .or_else(|| {
                ANY_DATETIME_PATTERNS
                    .iter()
                    .find_map(|pattern| NaiveDateTime::parse_from_str(trimmed, pattern).ok())
            }),
        explicit => parse_datetime_pattern(trimmed, explicit_pattern(explicit)),
    };
    parsed.map(Value::DateTime).ok_or_else(|| CastError::Temporal {
        raw: value.to_string(),
        kind: "datetime",
        format: format.to_string(),
    })
}

pub fn cast_year(value: &str) -> Result<Value, CastError> {
    value
        .trim()
        .parse::<i32>()
        .map(Value::Year)
        .map_err(|_| CastError::Year {
            raw: value.to_string(),
        })
}

pub fn cast_year_month(value: &str) -> Result<Value, CastError> {
    let fail = || CastError::YearMonth {
        raw: value.to_string(),
    };
    let (year, month) = value.trim().split_once('-').ok_or_else(fail)?;
    let all_digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(year, 4) || !all_digits(month, 2) {
        return Err(fail());
    }
    let year: i32 = year.parse().map_err(|_| fail())?;
    let month: u32 = month.parse().map_err(|_| fail())?;
    if !(1..=12).contains(&month) {
        return Err(fail());
    }
    Ok(Value::YearMonth(YearMonth { year, month }))
}

fn parse_json(value: &str, kind: &'static str) -> Result<JsonValue, CastError> {
    serde_json::from_str(value).map_err(|err| CastError::Structured {
        raw: value.to_string(),
        kind,
        reason: err.to_string(),
    })
}

pub fn cast_object(value: &str) -> Result<Value, CastError> {
    match parse_json(value, "object")? {
        JsonValue::Object(map) => Ok(Value::Object(map)),
        other => Err(CastError::Structured {
            raw: value.to_string(),
            kind: "object",
            reason: format!("top-level value is {}", json_kind(&other)),
        }),
    }
}

pub fn cast_array(value: &str) -> Result<Value, CastError> {
    match parse_json(value, "array")? {
        JsonValue::Array(items) => Ok(Value::Array(items)),
        other => Err(CastError::Structured {
            raw: value.to_string(),
            kind: "array",
            reason: format!("top-level value is {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

pub fn cast_geopoint(value: &str, format: &str) -> Result<Value, CastError> {
    let fail = || CastError::GeoPoint {
        raw: value.to_string(),
        format: format.to_string(),
    };
    let (lon, lat) = match format {
        DEFAULT_FORMAT => {
            let (lon, lat) = value.split_once(',').ok_or_else(fail)?;
            let lon: f64 = lon.trim().parse().map_err(|_| fail())?;
            let lat: f64 = lat.trim().parse().map_err(|_| fail())?;
            (lon, lat)
        }
        "array" => match serde_json::from_str::<JsonValue>(value).map_err(|_| fail())? {
            JsonValue::Array(items) if items.len() == 2 => {
                let lon = items[0].as_f64().ok_or_else(fail)?;
                let lat = items[1].as_f64().ok_or_else(fail)?;
                (lon, lat)
            }
            _ => return Err(fail()),
        },
        "object" => match serde_json::from_str::<JsonValue>(value).map_err(|_| fail())? {
            JsonValue::Object(map) => {
                let lon = map.get("lon").and_then(JsonValue::as_f64).ok_or_else(fail)?;
                let lat = map.get("lat").and_then(JsonValue::as_f64).ok_or_else(fail)?;
                (lon, lat)
            }
            _ => return Err(fail()),
        },
        other => {
            return Err(CastError::UnsupportedFormat {
                kind: "geopoint",
                format: other.to_string(),
            });
        }
    };
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(fail());
    }
    Ok(Value::GeoPoint(GeoPoint { lon, lat }))
}

pub fn cast_any(value: &str) -> Result<Value, CastError> {
    Ok(Value::String(value.to_string()))
}

fn encode_mismatch(value: &Value, kind: &str) -> CastError {
    CastError::Encode {
        value: format!("{} value '{}'", value.kind(), value.as_display()),
        kind: kind.to_string(),
    }
}

fn render_temporal<T: std::fmt::Display>(
    rendered: T,
    value: &Value,
    kind: &str,
) -> Result<String, CastError> {
    let mut out = String::new();
    write!(out, "{rendered}").map_err(|_| encode_mismatch(value, kind))?;
    Ok(out)
}

pub fn encode_integer(value: &Value) -> Result<String, CastError> {
    match value {
        Value::Integer(i) => Ok(i.to_string()),
        other => Err(encode_mismatch(other, "integer")),
    }
}

pub fn encode_number(value: &Value, decimal_char: &str) -> Result<String, CastError> {
    let Value::Number(f) = value else {
        return Err(encode_mismatch(value, "number"));
    };
    if !f.is_finite() {
        return Ok(value.as_display());
    }
    let rendered = f.to_string();
    if decimal_char.is_empty() || decimal_char == "." {
        Ok(rendered)
    } else {
        Ok(rendered.replace('.', decimal_char))
    }
}

pub fn encode_boolean(
    value: &Value,
    true_values: &[String],
    false_values: &[String],
) -> Result<String, CastError> {
    match value {
        Value::Boolean(true) => Ok(true_values
            .first()
            .cloned()
            .unwrap_or_else(|| "true".to_string())),
        Value::Boolean(false) => Ok(false_values
            .first()
            .cloned()
            .unwrap_or_else(|| "false".to_string())),
        other => Err(encode_mismatch(other, "boolean")),
    }
}

pub fn encode_string(value: &Value, format: &str) -> Result<String, CastError> {
    match value {
        Value::String(s) => {
            cast_string(s, format)?;
            Ok(s.clone())
        }
        other => Err(encode_mismatch(other, "string")),
    }
}

fn output_pattern<'a>(format: &'a str, default: &'a str) -> &'a str {
    match format {
        DEFAULT_FORMAT | ANY_FORMAT => default,
        explicit => explicit_pattern(explicit),
    }
}

pub fn encode_date(value: &Value, format: &str) -> Result<String, CastError> {
    match value {
        Value::Date(d) => render_temporal(
            d.format(output_pattern(format, DEFAULT_DATE_PATTERN)),
            value,
            "date",
        ),
        other => Err(encode_mismatch(other, "date")),
    }
}

pub fn encode_time(value: &Value, format: &str) -> Result<String, CastError> {
    match value {
        Value::Time(t) => render_temporal(
            t.format(output_pattern(format, DEFAULT_TIME_PATTERN)),
            value,
            "time",
        ),
        other => Err(encode_mismatch(other, "time")),
    }
}

pub fn encode_datetime(value: &Value, format: &str) -> Result<String, CastError> {
    match value {
        Value::DateTime(dt) => render_temporal(
            dt.and_utc()
                .format(output_pattern(format, DEFAULT_DATETIME_PATTERN)),
            value,
            "datetime",
        ),
        other => Err(encode_mismatch(other, "datetime")),
    }
}

pub fn encode_year(value: &Value) -> Result<String, CastError> {
    match value {
        Value::Year(y) => Ok(y.to_string()),
        other => Err(encode_mismatch(other, "year")),
    }
}

pub fn encode_year_month(value: &Value) -> Result<String, CastError> {
    match value {
        Value::YearMonth(ym) => Ok(ym.to_string()),
        other => Err(encode_mismatch(other, "yearmonth")),
    }
}

pub fn encode_object(value: &Value) -> Result<String, CastError> {
    match value {
        Value::Object(_) => Ok(value.as_display()),
        other => Err(encode_mismatch(other, "object")),
    }
}

pub fn encode_array(value: &Value) -> Result<String, CastError> {
    match value {
        Value::Array(_) => Ok(value.as_display()),
        other => Err(encode_mismatch(other, "array")),
    }
}

pub fn encode_geopoint(value: &Value, format: &str) -> Result<String, CastError> {
    let Value::GeoPoint(point) = value else {
        return Err(encode_mismatch(value, "geopoint"));
    };
    match format {
        DEFAULT_FORMAT => Ok(point.to_string()),
        "array" => Ok(serde_json::json!([point.lon, point.lat]).to_string()),
        "object" => Ok(serde_json::json!({"lon": point.lon, "lat": point.lat}).to_string()),
        other => Err(CastError::UnsupportedFormat {
            kind: "geopoint",
            format: other.to_string(),
        }),
    }
}
