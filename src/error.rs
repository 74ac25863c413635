use thiserror::Error;

/// Convenience result type for schema, casting, and inference operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reason a single text cell could not be cast to (or rendered from) a typed value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastError {
    #[error("'{raw}' is not a valid integer")]
    Integer { raw: String },

    #[error("'{raw}' is not a valid number")]
    Number { raw: String },

    #[error("'{raw}' does not match any configured true or false value")]
    Boolean { raw: String },

    #[error("'{raw}' is not a valid {kind} for format '{format}'")]
    Temporal {
        raw: String,
        kind: &'static str,
        format: String,
    },

    #[error("'{raw}' is not a valid year")]
    Year { raw: String },

    #[error("'{raw}' is not a valid year-month (expected YYYY-MM)")]
    YearMonth { raw: String },

    #[error("'{raw}' is not a valid {kind}: {reason}")]
    Structured {
        raw: String,
        kind: &'static str,
        reason: String,
    },

    #[error("'{raw}' is not a valid {format} string")]
    StringFormat { raw: String, format: String },

    #[error("'{raw}' is not a valid geopoint for format '{format}'")]
    GeoPoint { raw: String, format: String },

    #[error("format '{format}' is not supported for {kind} fields")]
    UnsupportedFormat { kind: &'static str, format: String },

    #[error("cannot encode {value} as {kind}")]
    Encode { value: String, kind: String },
}

/// Schema consistency violation reported by [`crate::schema::Schema::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid field at position {index}: attribute name is mandatory")]
    MissingName { index: usize },

    #[error("invalid primary key: no such field '{name}'")]
    PrimaryKey { name: String },

    #[error("invalid foreign key: no such field '{name}'")]
    ForeignKey { name: String },

    #[error(
        "invalid foreign key: foreignKey.fields has {fields} entries but foreignKey.reference.fields has {reference}"
    )]
    ForeignKeyArity { fields: usize, reference: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    /// The field declares a type no caster exists for.
    #[error("invalid field type: {0}")]
    InvalidType(String),

    /// A cell of the named field failed to cast.
    #[error("field '{field}': {reason}")]
    Cast { field: String, reason: CastError },

    /// Row length differs from the header (or field) count.
    #[error("not a table: row {row} has {found} cell(s) but {expected} column(s) were declared")]
    ShapeMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no such field: '{0}'")]
    UnknownField(String),

    /// A typed value does not fit the record member it is mapped to.
    #[error("column '{column}': {message}")]
    Mapping { column: String, message: String },

    /// The descriptor document could not be decoded into a schema.
    #[error("invalid schema descriptor: {0}")]
    Descriptor(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Descriptor(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Descriptor(err.to_string())
    }
}
