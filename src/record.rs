//! Statically declared mapping between schema columns and a record type.
//!
//! A [`RecordMapping`] pairs schema fields with getter/setter closures on a
//! user record. Column names are resolved against the schema once, when the
//! mapping is built, so decoding and encoding rows never searches by name.
//!
//! ```
//! use table_schema::{Field, FieldType, RecordMapping, Schema};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: i64,
//! }
//!
//! let schema = Schema::from_fields(vec![
//!     Field::new("Name", FieldType::String),
//!     Field::new("Age", FieldType::Integer),
//! ]);
//! let mapping = RecordMapping::<Person>::builder(&schema)
//!     .column("name", |p: &Person| p.name.clone(), |p, v| p.name = v)
//!     .column("age", |p: &Person| p.age, |p, v| p.age = v)
//!     .build()
//!     .unwrap();
//!
//! let person = mapping.decode_row(&["Foo", "42"]).unwrap();
//! assert_eq!(person, Person { name: "Foo".into(), age: 42 });
//! assert_eq!(mapping.encode_row(&person).unwrap(), vec!["Foo", "42"]);
//! ```

use std::any::type_name;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::{
    data::Value,
    error::{Error, Result},
    schema::Schema,
};

/// Conversion from a cast cell into a record member.
pub trait FromValue: Sized {
    /// Returns the value back when its kind does not fit `Self`.
    fn from_value(value: Value) -> std::result::Result<Self, Value>;

    /// Member value for a missing cell; `None` leaves the member untouched.
    fn from_missing() -> Option<Self> {
        None
    }
}

/// Conversion from a record member into a typed cell (`None` is missing).
pub trait IntoValue {
    fn into_value(self) -> Option<Value>;
}

macro_rules! value_conversions {
    ($ty:ty, $variant:ident) => {
        impl FromValue for $ty {
            fn from_value(value: Value) -> std::result::Result<Self, Value> {
                match value {
                    Value::$variant(inner) => Ok(inner),
                    other => Err(other),
                }
            }
        }

        impl IntoValue for $ty {
            fn into_value(self) -> Option<Value> {
                Some(Value::$variant(self))
            }
        }
    };
}

value_conversions!(f64, Number);
value_conversions!(bool, Boolean);
value_conversions!(String, String);
value_conversions!(NaiveDate, Date);
value_conversions!(NaiveTime, Time);
value_conversions!(NaiveDateTime, DateTime);

impl FromValue for i64 {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Integer(i) => Ok(i),
            Value::Year(y) => Ok(i64::from(y)),
            other => Err(other),
        }
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Option<Value> {
        Some(Value::Integer(self))
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        match value {
            Value::Integer(i) => i32::try_from(i).map_err(|_| Value::Integer(i)),
            Value::Year(y) => Ok(y),
            other => Err(other),
        }
    }
}

impl IntoValue for i32 {
    fn into_value(self) -> Option<Value> {
        Some(Value::Integer(i64::from(self)))
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        Ok(value)
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Option<Value> {
        Some(self)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> std::result::Result<Self, Value> {
        T::from_value(value).map(Some)
    }

    fn from_missing() -> Option<Self> {
        Some(None)
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Option<Value> {
        self.and_then(IntoValue::into_value)
    }
}

type Setter<R> = Box<dyn Fn(&mut R, Option<Value>) -> Result<()> + Send + Sync>;
type Getter<R> = Box<dyn Fn(&R) -> Option<Value> + Send + Sync>;

enum ColumnKey {
    /// Matched against field names ignoring ASCII case.
    Name(String),
    /// Matched against field names exactly.
    Tag(String),
}

struct PendingColumn<R> {
    key: ColumnKey,
    get: Getter<R>,
    set: Setter<R>,
}

struct Binding<R> {
    index: usize,
    get: Getter<R>,
    set: Setter<R>,
}

pub struct RecordMappingBuilder<'s, R> {
    schema: &'s Schema,
    columns: Vec<PendingColumn<R>>,
}

impl<'s, R: 'static> RecordMappingBuilder<'s, R> {
    /// Binds a record member to the schema field whose name matches `name`
    /// ignoring ASCII case.
    pub fn column<T, G, S>(self, name: &str, get: G, set: S) -> Self
    where
        T: FromValue + IntoValue + 'static,
        G: Fn(&R) -> T + Send + Sync + 'static,
        S: Fn(&mut R, T) + Send + Sync + 'static,
    {
        self.push(ColumnKey::Name(name.to_string()), get, set)
    }

    /// Binds a record member to the schema field named exactly `tag`.
    pub fn column_tagged<T, G, S>(self, tag: &str, get: G, set: S) -> Self
    where
        T: FromValue + IntoValue + 'static,
        G: Fn(&R) -> T + Send + Sync + 'static,
        S: Fn(&mut R, T) + Send + Sync + 'static,
    {
        self.push(ColumnKey::Tag(tag.to_string()), get, set)
    }

    fn push<T, G, S>(mut self, key: ColumnKey, get: G, set: S) -> Self
    where
        T: FromValue + IntoValue + 'static,
        G: Fn(&R) -> T + Send + Sync + 'static,
        S: Fn(&mut R, T) + Send + Sync + 'static,
    {
        let column = match &key {
            ColumnKey::Name(name) | ColumnKey::Tag(name) => name.clone(),
        };
        let setter: Setter<R> = Box::new(move |record, value| {
            let typed = match value {
                Some(value) => T::from_value(value).map_err(|value| Error::Mapping {
                    column: column.clone(),
                    message: format!(
                        "cannot store {} value '{}' in {}",
                        value.kind(),
                        value.as_display(),
                        type_name::<T>()
                    ),
                })?,
                None => match T::from_missing() {
                    Some(typed) => typed,
                    None => return Ok(()),
                },
            };
            set(record, typed);
            Ok(())
        });
        let getter: Getter<R> = Box::new(move |record| get(record).into_value());
        self.columns.push(PendingColumn {
            key,
            get: getter,
            set: setter,
        });
        self
    }

    /// Resolves every declared column against the schema.
    pub fn build(self) -> Result<RecordMapping<R>> {
        let schema = self.schema;
        let bindings = self
            .columns
            .into_iter()
            .map(|column| {
                let index = match &column.key {
                    ColumnKey::Name(name) => schema
                        .fields
                        .iter()
                        .position(|f| f.name.eq_ignore_ascii_case(name))
                        .ok_or_else(|| Error::UnknownField(name.clone()))?,
                    ColumnKey::Tag(tag) => schema
                        .get_field(tag)
                        .map(|(index, _)| index)
                        .ok_or_else(|| Error::UnknownField(tag.clone()))?,
                };
                Ok(Binding {
                    index,
                    get: column.get,
                    set: column.set,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RecordMapping {
            schema: schema.clone(),
            bindings,
        })
    }
}

/// Row ⇄ record mapping resolved against one schema.
pub struct RecordMapping<R> {
    schema: Schema,
    bindings: Vec<Binding<R>>,
}

impl<R: 'static> RecordMapping<R> {
    pub fn builder(schema: &Schema) -> RecordMappingBuilder<'_, R> {
        RecordMappingBuilder {
            schema,
            columns: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Casts a row and stores each mapped cell into a fresh record.
    /// Unmapped columns are not cast.
    pub fn decode_row<S: AsRef<str>>(&self, row: &[S]) -> Result<R>
    where
        R: Default,
    {
        self.decode_row_at(1, row)
    }

    fn decode_row_at<S: AsRef<str>>(&self, row_number: usize, row: &[S]) -> Result<R>
    where
        R: Default,
    {
        if row.len() != self.schema.fields.len() {
            return Err(Error::ShapeMismatch {
                row: row_number,
                expected: self.schema.fields.len(),
                found: row.len(),
            });
        }
        let mut record = R::default();
        for binding in &self.bindings {
            let field = &self.schema.fields[binding.index];
            let cell = row[binding.index].as_ref();
            let value = if self.schema.is_missing(cell) {
                None
            } else {
                Some(field.cast_value(cell)?)
            };
            (binding.set)(&mut record, value)?;
        }
        Ok(record)
    }

    pub fn decode_table<S: AsRef<str>>(&self, rows: &[Vec<S>]) -> Result<Vec<R>>
    where
        R: Default,
    {
        rows.iter()
            .enumerate()
            .map(|(idx, row)| self.decode_row_at(idx + 1, row))
            .collect()
    }

    /// Renders a record as a row in schema column order. Columns without a
    /// binding, and members that produce no value, are written as the
    /// schema's missing-value literal.
    pub fn encode_row(&self, record: &R) -> Result<Vec<String>> {
        let mut row = vec![self.schema.missing_value_literal().to_string(); self.schema.fields.len()];
        for binding in &self.bindings {
            if let Some(value) = (binding.get)(record) {
                row[binding.index] = self.schema.fields[binding.index].encode_value(&value)?;
            }
        }
        Ok(row)
    }

    pub fn encode_table(&self, records: &[R]) -> Result<Vec<Vec<String>>> {
        records.iter().map(|record| self.encode_row(record)).collect()
    }
}
