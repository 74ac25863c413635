use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Infer, validate, and check table schemas for CSV data",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Infer a table schema descriptor from a CSV file
    Infer(InferArgs),
    /// Check a schema descriptor for internal consistency
    Validate(ValidateArgs),
    /// Cast every cell of one or more CSV files against a schema descriptor
    Verify(VerifyArgs),
}

#[derive(Debug, Args)]
pub struct InferArgs {
    /// Input CSV file to inspect ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Destination descriptor path (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Widen column types as conflicting cells appear instead of voting
    #[arg(long)]
    pub implicit: bool,
    /// Number of data rows to sample (0 means full scan)
    #[arg(long, default_value_t = 0)]
    pub sample_rows: usize,
    /// Cell literal treated as missing (repeatable; defaults to the empty string)
    #[arg(long = "missing-value", action = clap::ArgAction::Append)]
    pub missing_values: Vec<String>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Emit YAML instead of JSON when writing to stdout
    #[arg(long)]
    pub yaml: bool,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Schema descriptor (.json, .yml, or .yaml)
    #[arg(short, long)]
    pub schema: PathBuf,
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Schema descriptor describing the expected columns
    #[arg(short, long)]
    pub schema: PathBuf,
    /// One or more CSV files to verify
    #[arg(short = 'i', long = "input", required = true, action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// CSV delimiter character
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding for input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
