//! Schema model: ordered fields, primary/foreign key declarations, the
//! schema-wide missing-value filter, and structural validation.
//!
//! ## Responsibilities
//!
//! - Field lookup by name (first match, case-sensitive)
//! - Missing-value filtering ahead of every cast
//! - Row-level casting and encoding on top of [`Field::cast_value`] and
//!   [`Field::encode_value`]
//! - Consistency checks for field names and key references
//!
//! Descriptor (JSON/YAML) reading and writing lives in
//! [`crate::descriptor`].

use crate::{
    data::Value,
    error::{Error, Result, ValidationError},
    field::Field,
};

pub const DEFAULT_MISSING_VALUES: &[&str] = &[""];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ForeignKeyReference {
    pub resource: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ForeignKey {
    pub fields: Vec<String>,
    pub reference: ForeignKeyReference,
}

impl ForeignKey {
    pub fn new<I, J, S, T>(fields: I, resource: impl Into<String>, reference_fields: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        ForeignKey {
            fields: fields.into_iter().map(Into::into).collect(),
            reference: ForeignKeyReference {
                resource: resource.into(),
                fields: reference_fields.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.reference.fields.is_empty() && self.reference.resource.is_empty()
    }
}

/// Describes a table: field order equals column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub fields: Vec<Field>,
    pub primary_key: Vec<String>,
    pub foreign_keys: ForeignKey,
    pub missing_values: Vec<String>,
}

impl Default for Schema {
    fn default() -> Self {
        Schema {
            fields: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: ForeignKey::default(),
            missing_values: DEFAULT_MISSING_VALUES.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl Schema {
    pub fn from_fields(fields: Vec<Field>) -> Self {
        Schema {
            fields,
            ..Schema::default()
        }
    }

    pub fn with_primary_key<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_foreign_keys(mut self, foreign_keys: ForeignKey) -> Self {
        self.foreign_keys = foreign_keys;
        self
    }

    pub fn with_missing_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn headers(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Returns the position and field whose name equals `name` exactly.
    /// The first match wins when names repeat.
    pub fn get_field(&self, name: &str) -> Option<(usize, &Field)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, field)| field.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }

    pub fn is_missing(&self, value: &str) -> bool {
        self.missing_values.iter().any(|missing| missing == value)
    }

    /// Literal written for a missing value when encoding.
    pub fn missing_value_literal(&self) -> &str {
        self.missing_values.first().map(String::as_str).unwrap_or("")
    }

    /// Checks the schema for internal consistency, reporting the first
    /// violation. Duplicate field names are not checked.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if let Some(index) = self.fields.iter().position(|f| f.name.is_empty()) {
            return Err(ValidationError::MissingName { index });
        }
        if let Some(name) = self.primary_key.iter().find(|pk| !self.has_field(pk)) {
            return Err(ValidationError::PrimaryKey { name: name.clone() });
        }
        if let Some(name) = self
            .foreign_keys
            .fields
            .iter()
            .find(|fk| !self.has_field(fk))
        {
            return Err(ValidationError::ForeignKey { name: name.clone() });
        }
        let fields = self.foreign_keys.fields.len();
        let reference = self.foreign_keys.reference.fields.len();
        if fields != reference {
            return Err(ValidationError::ForeignKeyArity { fields, reference });
        }
        Ok(())
    }

    /// Casts `value` under the named field. Cells equal to one of the
    /// missing values yield `Ok(None)` without reaching the caster.
    pub fn cast_value(&self, name: &str, value: &str) -> Result<Option<Value>> {
        let (_, field) = self
            .get_field(name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))?;
        self.cast_with(field, value)
    }

    fn cast_with(&self, field: &Field, value: &str) -> Result<Option<Value>> {
        if self.is_missing(value) {
            return Ok(None);
        }
        field.cast_value(value).map(Some)
    }

    /// Casts every cell of a row positionally. A standalone row reports
    /// shape errors as row 1.
    pub fn cast_row<S: AsRef<str>>(&self, row: &[S]) -> Result<Vec<Option<Value>>> {
        self.cast_row_at(1, row)
    }

    pub(crate) fn cast_row_at<S: AsRef<str>>(
        &self,
        row_number: usize,
        row: &[S],
    ) -> Result<Vec<Option<Value>>> {
        self.ensure_row_shape(row_number, row.len())?;
        self.fields
            .iter()
            .zip(row)
            .map(|(field, cell)| self.cast_with(field, cell.as_ref()))
            .collect()
    }

    /// Casts a whole table; row numbers in errors are 1-based.
    pub fn cast_table<S: AsRef<str>>(&self, rows: &[Vec<S>]) -> Result<Vec<Vec<Option<Value>>>> {
        rows.iter()
            .enumerate()
            .map(|(idx, row)| self.cast_row_at(idx + 1, row))
            .collect()
    }

    /// Renders typed cells back to text. `None` becomes the first missing
    /// value literal.
    pub fn encode_row(&self, values: &[Option<Value>]) -> Result<Vec<String>> {
        self.ensure_row_shape(1, values.len())?;
        self.fields
            .iter()
            .zip(values)
            .map(|(field, value)| match value {
                Some(value) => field.encode_value(value),
                None => Ok(self.missing_value_literal().to_string()),
            })
            .collect()
    }

    fn ensure_row_shape(&self, row: usize, found: usize) -> Result<()> {
        if found != self.fields.len() {
            return Err(Error::ShapeMismatch {
                row,
                expected: self.fields.len(),
                found,
            });
        }
        Ok(())
    }
}
