//! Type inference: synthesizes a [`Schema`] from a header row and sample rows.
//!
//! Every non-missing cell is probed against the candidate types in
//! precedence order (most restrictive first):
//!
//! `integer → boolean → date → datetime → time → yearmonth → object → array → number → string`
//!
//! Two strategies decide a column from those probes:
//!
//! - [`InferMode::Strict`]: each cell is classified as the first candidate
//!   that casts it. A column with a single classification takes it. A mixed
//!   column infers as `string` when any cell is classified as time,
//!   yearmonth, object, array or string; otherwise the most frequent
//!   classification wins, ties going to the earlier candidate.
//! - [`InferMode::ImplicitCasting`]: the column starts at its first cell's
//!   classification and, when a later cell does not fit, widens along a fixed
//!   chain (`boolean → integer → number → string`) to the first type every
//!   cell seen so far casts under.
//!
//! Probes always use default format and configuration, and cells matching the
//! missing-value set are skipped entirely.

use log::debug;

use crate::{
    error::{Error, Result},
    field::{Field, FieldType},
    schema::{DEFAULT_MISSING_VALUES, Schema},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InferMode {
    #[default]
    Strict,
    ImplicitCasting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidate {
    Integer,
    Boolean,
    Date,
    DateTime,
    Time,
    YearMonth,
    Object,
    Array,
    Number,
    String,
}

const PRECEDENCE: [Candidate; 10] = [
    Candidate::Integer,
    Candidate::Boolean,
    Candidate::Date,
    Candidate::DateTime,
    Candidate::Time,
    Candidate::YearMonth,
    Candidate::Object,
    Candidate::Array,
    Candidate::Number,
    Candidate::String,
];

impl Candidate {
    fn rank(self) -> usize {
        PRECEDENCE
            .iter()
            .position(|c| *c == self)
            .unwrap_or(PRECEDENCE.len() - 1)
    }

    fn field_type(self) -> FieldType {
        match self {
            Candidate::Integer => FieldType::Integer,
            Candidate::Boolean => FieldType::Boolean,
            Candidate::Date => FieldType::Date,
            Candidate::DateTime => FieldType::DateTime,
            Candidate::Time => FieldType::Time,
            Candidate::YearMonth => FieldType::YearMonth,
            Candidate::Object => FieldType::Object,
            Candidate::Array => FieldType::Array,
            Candidate::Number => FieldType::Number,
            Candidate::String => FieldType::String,
        }
    }

    /// Whether a strict-mode column mixing this type with others is settled
    /// by majority; any non-voting type in a mixed column makes it a string.
    fn votes(self) -> bool {
        matches!(
            self,
            Candidate::Integer
                | Candidate::Boolean
                | Candidate::Date
                | Candidate::DateTime
                | Candidate::Number
        )
    }

    /// Wider types a column may move to when this candidate rejects a cell.
    fn widening(self) -> &'static [Candidate] {
        match self {
            Candidate::Boolean => &[Candidate::Integer, Candidate::Number, Candidate::String],
            Candidate::Integer => &[Candidate::Number, Candidate::String],
            _ => &[Candidate::String],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferOptions {
    pub mode: InferMode,
    /// Cells equal to one of these are ignored and carried into the schema.
    pub missing_values: Vec<String>,
    /// Maximum number of rows to inspect (0 means every row).
    pub sample_rows: usize,
}

impl Default for InferOptions {
    fn default() -> Self {
        InferOptions {
            mode: InferMode::Strict,
            missing_values: DEFAULT_MISSING_VALUES.iter().map(|v| v.to_string()).collect(),
            sample_rows: 0,
        }
    }
}

impl InferOptions {
    pub fn implicit_casting() -> Self {
        InferOptions {
            mode: InferMode::ImplicitCasting,
            ..InferOptions::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnProfile {
    name: String,
    inferred: FieldType,
    observed: usize,
    missing: usize,
    tallies: Vec<(FieldType, usize)>,
}

impl ColumnProfile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inferred(&self) -> &FieldType {
        &self.inferred
    }

    /// Number of non-missing cells inspected.
    pub fn observed(&self) -> usize {
        self.observed
    }

    pub fn missing(&self) -> usize {
        self.missing
    }

    /// How many cells were classified as each type, in precedence order.
    /// Types with no cells are omitted.
    pub fn tallies(&self) -> &[(FieldType, usize)] {
        &self.tallies
    }

    /// Cells whose own classification differs from the inferred type.
    pub fn outliers(&self) -> usize {
        self.tallies
            .iter()
            .filter(|(ty, _)| *ty != self.inferred)
            .map(|(_, count)| count)
            .sum()
    }
}

#[derive(Debug, Clone)]
pub struct InferenceReport {
    rows_read: usize,
    columns: Vec<ColumnProfile>,
}

impl InferenceReport {
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    pub fn columns(&self) -> &[ColumnProfile] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Reusable inference engine; holds one probe field per candidate type.
#[derive(Debug, Clone)]
pub struct Inferrer {
    options: InferOptions,
    probes: Vec<Field>,
}

impl Default for Inferrer {
    fn default() -> Self {
        Inferrer::new(InferOptions::default())
    }
}

impl Inferrer {
    pub fn new(options: InferOptions) -> Self {
        let probes = PRECEDENCE
            .iter()
            .map(|candidate| Field::new("", candidate.field_type()))
            .collect();
        Inferrer { options, probes }
    }

    pub fn options(&self) -> &InferOptions {
        &self.options
    }

    pub fn infer<H, C>(&self, headers: &[H], rows: &[Vec<C>]) -> Result<Schema>
    where
        H: AsRef<str>,
        C: AsRef<str>,
    {
        self.infer_with_report(headers, rows)
            .map(|(schema, _)| schema)
    }

    pub fn infer_with_report<H, C>(
        &self,
        headers: &[H],
        rows: &[Vec<C>],
    ) -> Result<(Schema, InferenceReport)>
    where
        H: AsRef<str>,
        C: AsRef<str>,
    {
        let rows = match self.options.sample_rows {
            0 => rows,
            limit => &rows[..limit.min(rows.len())],
        };
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(Error::ShapeMismatch {
                    row: idx + 1,
                    expected: headers.len(),
                    found: row.len(),
                });
            }
        }

        let mut fields = Vec::with_capacity(headers.len());
        let mut columns = Vec::with_capacity(headers.len());
        for (col, header) in headers.iter().enumerate() {
            let cells = rows.iter().map(|row| row[col].as_ref());
            let profile = self.profile_column(header.as_ref(), cells);
            debug!(
                "Column '{}' inferred as {} ({} observed, {} missing, {} outlier(s))",
                profile.name,
                profile.inferred,
                profile.observed,
                profile.missing,
                profile.outliers()
            );
            fields.push(Field::new(header.as_ref(), profile.inferred.clone()));
            columns.push(profile);
        }

        let schema = Schema::from_fields(fields).with_missing_values(self.options.missing_values.clone());
        let report = InferenceReport {
            rows_read: rows.len(),
            columns,
        };
        Ok((schema, report))
    }

    fn probe(&self, candidate: Candidate) -> &Field {
        &self.probes[candidate.rank()]
    }

    fn accepts(&self, candidate: Candidate, cell: &str) -> bool {
        candidate == Candidate::String || self.probe(candidate).test_value(cell)
    }

    fn classify(&self, cell: &str) -> Candidate {
        PRECEDENCE
            .iter()
            .copied()
            .find(|candidate| self.accepts(*candidate, cell))
            .unwrap_or(Candidate::String)
    }

    fn is_missing(&self, cell: &str) -> bool {
        self.options.missing_values.iter().any(|m| m == cell)
    }

    fn profile_column<'a, I>(&self, name: &str, cells: I) -> ColumnProfile
    where
        I: Iterator<Item = &'a str>,
    {
        let mut counts = [0usize; PRECEDENCE.len()];
        let mut missing = 0usize;
        let mut seen: Vec<&str> = Vec::new();
        let mut current: Option<Candidate> = None;

        for cell in cells {
            if self.is_missing(cell) {
                missing += 1;
                continue;
            }
            let class = self.classify(cell);
            counts[class.rank()] += 1;
            if self.options.mode == InferMode::ImplicitCasting {
                seen.push(cell);
                current = Some(match current {
                    None => class,
                    Some(candidate) if self.accepts(candidate, cell) => candidate,
                    Some(candidate) => self.widen(name, candidate, &seen),
                });
            }
        }

        let observed = counts.iter().sum();
        let decided = match self.options.mode {
            InferMode::Strict => decide_strict(&counts),
            InferMode::ImplicitCasting => current.unwrap_or(Candidate::String),
        };
        let tallies = PRECEDENCE
            .iter()
            .zip(counts)
            .filter(|(_, count)| *count > 0)
            .map(|(candidate, count)| (candidate.field_type(), count))
            .collect();

        ColumnProfile {
            name: name.to_string(),
            inferred: decided.field_type(),
            observed,
            missing,
            tallies,
        }
    }

    fn widen(&self, name: &str, from: Candidate, seen: &[&str]) -> Candidate {
        let widened = from
            .widening()
            .iter()
            .copied()
            .find(|wider| seen.iter().all(|cell| self.accepts(*wider, cell)))
            .unwrap_or(Candidate::String);
        debug!(
            "Column '{}' widened from {} to {} after {} cell(s)",
            name,
            from.field_type(),
            widened.field_type(),
            seen.len()
        );
        widened
    }
}

fn decide_strict(counts: &[usize; PRECEDENCE.len()]) -> Candidate {
    let present: Vec<Candidate> = PRECEDENCE
        .into_iter()
        .filter(|candidate| counts[candidate.rank()] > 0)
        .collect();
    match present.as_slice() {
        [] => Candidate::String,
        [only] => *only,
        mixed if mixed.iter().any(|candidate| !candidate.votes()) => Candidate::String,
        mixed => mixed
            .iter()
            .copied()
            .rev()
            .max_by_key(|candidate| counts[candidate.rank()])
            .unwrap_or(Candidate::String),
    }
}

/// Infers a schema using [`InferMode::Strict`] and default options.
pub fn infer<H, C>(headers: &[H], rows: &[Vec<C>]) -> Result<Schema>
where
    H: AsRef<str>,
    C: AsRef<str>,
{
    Inferrer::default().infer(headers, rows)
}

/// Infers a schema using [`InferMode::ImplicitCasting`] and default options.
pub fn infer_implicit_casting<H, C>(headers: &[H], rows: &[Vec<C>]) -> Result<Schema>
where
    H: AsRef<str>,
    C: AsRef<str>,
{
    Inferrer::new(InferOptions::implicit_casting()).infer(headers, rows)
}
