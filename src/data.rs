use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Map, Value as JsonValue};

/// A typed cell produced by casting a text cell under a field's type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Number(f64),
    Boolean(bool),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Year(i32),
    YearMonth(YearMonth),
    GeoPoint(GeoPoint),
    Object(Map<String, JsonValue>),
    Array(Vec<JsonValue>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl Value {
    /// Name of the semantic kind carried by this value.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
            Value::Year(_) => "year",
            Value::YearMonth(_) => "yearmonth",
            Value::GeoPoint(_) => "geopoint",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Integer(i) => i.to_string(),
            Value::Number(f) => {
                if f.is_nan() {
                    "NaN".to_string()
                } else if f.is_infinite() {
                    if f.is_sign_negative() { "-INF" } else { "INF" }.to_string()
                } else {
                    f.to_string()
                }
            }
            Value::Boolean(b) => b.to_string(),
            Value::String(s) => s.clone(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Time(t) => t.format("%H:%M:%S").to_string(),
            Value::DateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            Value::Year(y) => y.to_string(),
            Value::YearMonth(ym) => ym.to_string(),
            Value::GeoPoint(p) => p.to_string(),
            Value::Object(map) => JsonValue::Object(map.clone()).to_string(),
            Value::Array(items) => JsonValue::Array(items.clone()).to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lon, self.lat)
    }
}
