pub mod cast;
pub mod cli;
pub mod data;
pub mod descriptor;
pub mod error;
pub mod field;
pub mod infer;
pub mod io_utils;
pub mod record;
pub mod schema;

use std::{env, path::Path, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use itertools::Itertools;
use log::{LevelFilter, debug, info, warn};

use crate::cli::{Cli, Commands};

pub use crate::{
    data::{GeoPoint, Value, YearMonth},
    descriptor::{KeyList, SchemaDescriptor},
    error::{CastError, Error, ValidationError},
    field::{Field, FieldType},
    infer::{InferMode, InferOptions, InferenceReport, Inferrer, infer, infer_implicit_casting},
    record::{FromValue, IntoValue, RecordMapping},
    schema::{ForeignKey, ForeignKeyReference, Schema},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("table_schema", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Infer(args) => handle_infer(&args),
        Commands::Validate(args) => handle_validate(&args),
        Commands::Verify(args) => handle_verify(&args),
    }
}

fn handle_infer(args: &cli::InferArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    info!(
        "Inferring schema from '{}' with delimiter '{}'",
        args.input.display(),
        printable_delimiter(delimiter)
    );

    let mut reader = io_utils::open_csv_reader_from_path(&args.input, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)
        .with_context(|| format!("Reading headers from {:?}", args.input))?;
    let limit = (args.sample_rows > 0).then_some(args.sample_rows);
    let rows = io_utils::read_rows(&mut reader, encoding, limit)
        .with_context(|| format!("Reading rows from {:?}", args.input))?;

    let mut options = if args.implicit {
        InferOptions::implicit_casting()
    } else {
        InferOptions::default()
    };
    if !args.missing_values.is_empty() {
        options.missing_values = args.missing_values.clone();
    }
    options.sample_rows = args.sample_rows;

    let (schema, report) = Inferrer::new(options)
        .infer_with_report(&headers, &rows)
        .with_context(|| format!("Inferring schema from {:?}", args.input))?;
    for column in report.columns() {
        debug!(
            "{}: {} [{}]",
            column.name(),
            column.inferred(),
            column
                .tallies()
                .iter()
                .map(|(ty, count)| format!("{ty}={count}"))
                .join(", ")
        );
    }

    match &args.output {
        Some(path) => {
            schema
                .save(path)
                .with_context(|| format!("Writing schema to {path:?}"))?;
            info!(
                "Inferred schema for {} column(s) from {} row(s) written to {:?}",
                schema.fields.len(),
                report.rows_read(),
                path
            );
        }
        None => {
            let rendered = if args.yaml {
                schema.to_yaml_string()?
            } else {
                schema.to_json_string()?
            };
            println!("{}", rendered.trim_end());
        }
    }
    Ok(())
}

fn handle_validate(args: &cli::ValidateArgs) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    schema
        .validate()
        .with_context(|| format!("Validating schema {:?}", args.schema))?;
    for field in schema.fields.iter().filter(|f| !f.field_type.is_supported()) {
        warn!(
            "Field '{}' has unsupported type '{}'; cells will not cast (known types: {})",
            field.name,
            field.field_type,
            FieldType::variants().iter().join(", ")
        );
    }
    info!(
        "Schema {:?} is valid ({} field(s))",
        args.schema,
        schema.fields.len()
    );
    Ok(())
}

fn handle_verify(args: &cli::VerifyArgs) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    schema
        .validate()
        .with_context(|| format!("Validating schema {:?}", args.schema))?;
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    for input in &args.inputs {
        let rows = verify_file(&schema, input, args.delimiter, encoding)
            .with_context(|| format!("Verifying {input:?}"))?;
        info!("✓ {} row(s) in {:?} match the schema", rows, input);
    }
    Ok(())
}

fn verify_file(
    schema: &Schema,
    input: &Path,
    delimiter: Option<u8>,
    encoding: &'static encoding_rs::Encoding,
) -> Result<usize> {
    let delimiter = io_utils::resolve_input_delimiter(input, delimiter);
    let mut reader = io_utils::open_csv_reader_from_path(input, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)?;
    let expected = schema.headers();
    if headers != expected {
        bail!(
            "Header mismatch: expected [{}] but found [{}]",
            expected.iter().join(", "),
            headers.iter().join(", ")
        );
    }

    let mut record = csv::ByteRecord::new();
    let mut row_number = 0;
    while reader.read_byte_record(&mut record)? {
        row_number += 1;
        let row = io_utils::decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {row_number}"))?;
        schema
            .cast_row_at(row_number, &row)
            .with_context(|| format!("Row {row_number}"))?;
    }
    Ok(row_number)
}

fn load_schema(path: &Path) -> Result<Schema> {
    Schema::load(path).with_context(|| format!("Loading schema from {path:?}"))
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
