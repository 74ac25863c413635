//! Column descriptors: a named, typed, formatted field plus the type-specific
//! configuration its caster consumes.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    cast,
    data::Value,
    error::{Error, Result},
};

pub const DEFAULT_FIELD_FORMAT: &str = cast::DEFAULT_FORMAT;
pub const DEFAULT_DECIMAL_CHAR: &str = ".";
pub const DEFAULT_GROUP_CHAR: &str = "";
pub const DEFAULT_BARE_NUMBER: bool = true;
pub const DEFAULT_TRUE_VALUES: &[&str] = &["yes", "y", "true", "t", "1"];
pub const DEFAULT_FALSE_VALUES: &[&str] = &["no", "n", "false", "f", "0"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FieldType {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
    Date,
    Time,
    DateTime,
    Year,
    YearMonth,
    Object,
    Array,
    GeoPoint,
    Any,
    /// A type name no caster exists for. Kept so descriptors still load;
    /// casting through such a field fails with [`Error::InvalidType`].
    Unsupported(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::DateTime => "datetime",
            FieldType::Year => "year",
            FieldType::YearMonth => "yearmonth",
            FieldType::Object => "object",
            FieldType::Array => "array",
            FieldType::GeoPoint => "geopoint",
            FieldType::Any => "any",
            FieldType::Unsupported(name) => name,
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &[
            "string",
            "integer",
            "number",
            "boolean",
            "date",
            "time",
            "datetime",
            "year",
            "yearmonth",
            "object",
            "array",
            "geopoint",
            "any",
        ]
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, FieldType::Unsupported(_))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = std::convert::Infallible;

    /// Type names are matched exactly; anything else becomes
    /// [`FieldType::Unsupported`].
    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match value {
            "string" => FieldType::String,
            "integer" => FieldType::Integer,
            "number" => FieldType::Number,
            "boolean" => FieldType::Boolean,
            "date" => FieldType::Date,
            "time" => FieldType::Time,
            "datetime" => FieldType::DateTime,
            "year" => FieldType::Year,
            "yearmonth" => FieldType::YearMonth,
            "object" => FieldType::Object,
            "array" => FieldType::Array,
            "geopoint" => FieldType::GeoPoint,
            "any" => FieldType::Any,
            other => FieldType::Unsupported(other.to_string()),
        })
    }
}

impl Serialize for FieldType {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let token = String::deserialize(deserializer)?;
        let Ok(parsed) = FieldType::from_str(&token);
        Ok(parsed)
    }
}

/// A column descriptor. Built from a descriptor (defaults filled in by
/// normalization), by inference, or programmatically through [`Field::new`]
/// and the `with_*` setters; treated as read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    pub format: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub true_values: Vec<String>,
    pub false_values: Vec<String>,
    pub decimal_char: String,
    pub group_char: String,
    pub bare_number: bool,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Field {
            name: name.into(),
            field_type,
            format: DEFAULT_FIELD_FORMAT.to_string(),
            title: None,
            description: None,
            true_values: owned(DEFAULT_TRUE_VALUES),
            false_values: owned(DEFAULT_FALSE_VALUES),
            decimal_char: DEFAULT_DECIMAL_CHAR.to_string(),
            group_char: DEFAULT_GROUP_CHAR.to_string(),
            bare_number: DEFAULT_BARE_NUMBER,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_true_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.true_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_false_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.false_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_decimal_char(mut self, decimal_char: impl Into<String>) -> Self {
        self.decimal_char = decimal_char.into();
        self
    }

    pub fn with_group_char(mut self, group_char: impl Into<String>) -> Self {
        self.group_char = group_char.into();
        self
    }

    pub fn with_bare_number(mut self, bare_number: bool) -> Self {
        self.bare_number = bare_number;
        self
    }

    /// Casts a single text cell using this field's type and configuration.
    ///
    /// The missing-value filter is not applied here; see
    /// [`crate::schema::Schema::cast_value`].
    pub fn cast_value(&self, value: &str) -> Result<Value> {
        let format = self.format.as_str();
        let cast = match &self.field_type {
            FieldType::String => cast::cast_string(value, format),
            FieldType::Integer => cast::cast_integer(value, self.bare_number),
            FieldType::Number => cast::cast_number(
                value,
                &self.decimal_char,
                &self.group_char,
                self.bare_number,
            ),
            FieldType::Boolean => cast::cast_boolean(value, &self.true_values, &self.false_values),
            FieldType::Date => cast::cast_date(value, format),
            FieldType::Time => cast::cast_time(value, format),
            FieldType::DateTime => cast::cast_datetime(value, format),
            FieldType::Year => cast::cast_year(value),
            FieldType::YearMonth => cast::cast_year_month(value),
            FieldType::Object => cast::cast_object(value),
            FieldType::Array => cast::cast_array(value),
            FieldType::GeoPoint => cast::cast_geopoint(value, format),
            FieldType::Any => cast::cast_any(value),
            FieldType::Unsupported(name) => return Err(Error::InvalidType(name.clone())),
        };
        cast.map_err(|reason| Error::Cast {
            field: self.name.clone(),
            reason,
        })
    }

    pub fn test_value(&self, value: &str) -> bool {
        self.cast_value(value).is_ok()
    }

    /// Renders a typed value back into cell text under this field's
    /// configuration. The value's kind must match the field type.
    pub fn encode_value(&self, value: &Value) -> Result<String> {
        let format = self.format.as_str();
        let encoded = match &self.field_type {
            FieldType::String => cast::encode_string(value, format),
            FieldType::Integer => cast::encode_integer(value),
            FieldType::Number => cast::encode_number(value, &self.decimal_char),
            FieldType::Boolean => {
                cast::encode_boolean(value, &self.true_values, &self.false_values)
            }
            FieldType::Date => cast::encode_date(value, format),
            FieldType::Time => cast::encode_time(value, format),
            FieldType::DateTime => cast::encode_datetime(value, format),
            FieldType::Year => cast::encode_year(value),
            FieldType::YearMonth => cast::encode_year_month(value),
            FieldType::Object => cast::encode_object(value),
            FieldType::Array => cast::encode_array(value),
            FieldType::GeoPoint => cast::encode_geopoint(value, format),
            FieldType::Any => Ok(value.as_display()),
            FieldType::Unsupported(name) => return Err(Error::InvalidType(name.clone())),
        };
        encoded.map_err(|reason| Error::Cast {
            field: self.name.clone(),
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CastError;

    #[test]
    fn new_field_carries_defaults() {
        let field = Field::new("flag", FieldType::Boolean);
        assert_eq!(field.format, "default");
        assert_eq!(field.true_values, vec!["yes", "y", "true", "t", "1"]);
        assert_eq!(field.false_values, vec!["no", "n", "false", "f", "0"]);
        assert_eq!(field.decimal_char, ".");
        assert_eq!(field.group_char, "");
        assert!(field.bare_number);
    }

    #[test]
    fn unknown_type_is_invalid_type_error() {
        let field = Field::new("x", "t1".parse().unwrap());
        assert_eq!(field.field_type, FieldType::Unsupported("t1".to_string()));
        let err = field.cast_value("1").unwrap_err();
        assert!(matches!(err, Error::InvalidType(ref name) if name == "t1"));
        assert_eq!(err.to_string(), "invalid field type: t1");
    }

    #[test]
    fn cast_errors_name_the_field() {
        let field = Field::new("age", FieldType::Integer);
        match field.cast_value("ten") {
            Err(Error::Cast { field, reason }) => {
                assert_eq!(field, "age");
                assert_eq!(
                    reason,
                    CastError::Integer {
                        raw: "ten".to_string()
                    }
                );
            }
            other => panic!("expected cast error, got {other:?}"),
        }
    }

    #[test]
    fn custom_boolean_literals_replace_defaults() {
        let field = Field::new("flag", FieldType::Boolean)
            .with_true_values(["sim"])
            .with_false_values(["não"]);
        assert_eq!(field.cast_value("SIM").unwrap(), Value::Boolean(true));
        assert!(!field.test_value("yes"));
        assert_eq!(field.encode_value(&Value::Boolean(false)).unwrap(), "não");
    }

    #[test]
    fn locale_number_round_trips() {
        let field = Field::new("amount", FieldType::Number)
            .with_decimal_char(",")
            .with_group_char(".");
        let value = field.cast_value("1.250,75").unwrap();
        assert_eq!(value, Value::Number(1250.75));
        assert_eq!(field.encode_value(&value).unwrap(), "1250,75");
    }

    #[test]
    fn field_type_names_round_trip() {
        for name in FieldType::variants() {
            let parsed: FieldType = name.parse().unwrap();
            assert!(parsed.is_supported());
            assert_eq!(parsed.as_str(), *name);
        }
    }
}
