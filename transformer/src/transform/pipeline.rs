//! Streaming pipeline: CSV in, JSON array out.
//!
//! Rows are pulled one at a time from the CSV reader, validated, and handed
//! to the JSON writer before the next row is read, so memory use does not
//! grow with the input size.
//!
//! # Example
//!
//! ```rust,ignore
//! use custform::{run, TransformOptions};
//!
//! let summary = run(&TransformOptions::default())?;
//! println!("{} written, {} skipped", summary.processed, summary.errors);
//! ```

use csv::{ByteRecord, Reader};
use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use crate::country::{CountryLookup, CountryResolver, DEFAULT_COUNTRIES_PATH};
use crate::error::{PipelineError, PipelineResult, RowError, ValidationError};
use crate::logs::{log_error, log_info, log_success, log_warning};
use crate::models::UserRecord;
use crate::parser::{csv_reader, decode_record, is_header_row, open_csv, strip_bom};

use super::validator::RowValidator;

/// Diagnostics kept in the summary. Later failures are still counted and logged.
pub const MAX_DIAGNOSTICS: usize = 100;

const INDENT: &[u8] = b"    ";

/// Options for a file-to-file run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformOptions {
    /// Input CSV file
    pub input: PathBuf,

    /// Output JSON file (created or truncated)
    pub output: PathBuf,

    /// Country reference file
    pub countries: PathBuf,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from("input.csv"),
            output: PathBuf::from("output.json"),
            countries: PathBuf::from(DEFAULT_COUNTRIES_PATH),
        }
    }
}

/// Why a row was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowDiagnostic {
    /// Line of the input file where the row starts (1-based)
    pub line: u64,
    /// Validation message
    pub message: String,
    /// Offending data, as reported by [`ValidationError::payload`]
    pub payload: Value,
}

/// Counts of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Records that passed validation
    pub processed: usize,
    /// Rows that were skipped
    pub errors: usize,
    /// First [`MAX_DIAGNOSTICS`] skipped rows
    pub diagnostics: Vec<RowDiagnostic>,
}

impl RunSummary {
    fn record_failure(&mut self, line: u64, err: &ValidationError) {
        self.errors += 1;
        if self.diagnostics.len() < MAX_DIAGNOSTICS {
            self.diagnostics.push(RowDiagnostic {
                line,
                message: err.to_string(),
                payload: err.payload(),
            });
        }
    }
}

// =============================================================================
// Reading
// =============================================================================

/// Lazy, single-pass sequence of validated records.
///
/// Bad rows are skipped and counted. A system error (unreadable CSV, missing
/// country table) is yielded once, then the stream ends.
pub struct RecordStream<'v, R, C> {
    reader: Reader<R>,
    validator: &'v RowValidator<C>,
    record: ByteRecord,
    rows_read: u64,
    summary: RunSummary,
    done: bool,
}

impl<'v, R: Read, C: CountryResolver> RecordStream<'v, R, C> {
    pub fn new(reader: Reader<R>, validator: &'v RowValidator<C>) -> Self {
        Self {
            reader,
            validator,
            record: ByteRecord::new(),
            rows_read: 0,
            summary: RunSummary::default(),
            done: false,
        }
    }

    /// Counts so far. Final once the stream is exhausted.
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn into_summary(self) -> RunSummary {
        self.summary
    }

    fn finish(&mut self) {
        self.done = true;
        log_success(format!(
            "Processed {} valid records, {} errors encountered.",
            self.summary.processed, self.summary.errors
        ));
    }

    fn fail(&mut self, err: PipelineError) -> Option<PipelineResult<UserRecord>> {
        self.done = true;
        log_error(err.to_string());
        Some(Err(err))
    }
}

impl<R: Read, C: CountryResolver> Iterator for RecordStream<'_, R, C> {
    type Item = PipelineResult<UserRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.reader.read_byte_record(&mut self.record) {
                Ok(true) => {}
                Ok(false) => {
                    self.finish();
                    return None;
                }
                Err(err) => return self.fail(err.into()),
            }

            self.rows_read += 1;
            let line = self
                .record
                .position()
                .map(|pos| pos.line())
                .unwrap_or(self.rows_read);

            let mut fields = decode_record(&self.record);
            if self.rows_read == 1 {
                strip_bom(&mut fields);
                if is_header_row(&fields) {
                    continue;
                }
            }

            match self.validator.validate(&fields) {
                Ok(user) => {
                    self.summary.processed += 1;
                    return Some(Ok(user));
                }
                Err(RowError::Invalid(err)) => {
                    log_warning(format!("Error processing line {}: {}", line, err));
                    self.summary.record_failure(line, &err);
                }
                Err(RowError::Country(err)) => return self.fail(err.into()),
            }
        }
        None
    }
}

impl<R: Read, C: CountryResolver> FusedIterator for RecordStream<'_, R, C> {}

/// Stream validated records from any CSV source.
pub fn process<R: Read, C: CountryResolver>(
    source: R,
    validator: &RowValidator<C>,
) -> RecordStream<'_, R, C> {
    RecordStream::new(csv_reader(source), validator)
}

/// Stream validated records from a CSV file.
pub fn process_file<'v, C: CountryResolver>(
    path: &Path,
    validator: &'v RowValidator<C>,
) -> PipelineResult<RecordStream<'v, File, C>> {
    Ok(RecordStream::new(open_csv(path)?, validator))
}

// =============================================================================
// Writing
// =============================================================================

/// Write records as a pretty-printed JSON array, one record at a time.
///
/// Layout: `[`, then each object indented by 4 spaces and separated by `,`
/// plus newline, then `]`. The first error from `records` stops the write and
/// is returned. The sink is flushed on success.
///
/// # Returns
/// Number of records written.
pub fn write_json<I, W>(records: I, mut sink: W) -> PipelineResult<usize>
where
    I: IntoIterator<Item = PipelineResult<UserRecord>>,
    W: Write,
{
    let mut buf = Vec::new();
    let mut written = 0usize;

    sink.write_all(b"[\n")?;

    for record in records {
        let record = record?;
        if written > 0 {
            sink.write_all(b",\n")?;
        }

        buf.clear();
        encode_record(&record, &mut buf)?;
        write_indented(&mut sink, &buf)?;
        written += 1;
    }

    sink.write_all(b"\n]")?;
    sink.flush()?;
    Ok(written)
}

/// Pretty JSON for one record, 4-space indentation.
fn encode_record(record: &UserRecord, buf: &mut Vec<u8>) -> PipelineResult<()> {
    let mut ser = Serializer::with_formatter(buf, PrettyFormatter::with_indent(INDENT));
    record
        .serialize(&mut ser)
        .map_err(|source| PipelineError::Encode { id: record.id(), source })
}

/// Copy `json` into `sink`, every line shifted right by one level.
fn write_indented<W: Write>(sink: &mut W, json: &[u8]) -> std::io::Result<()> {
    for (i, line) in json.split(|b| *b == b'\n').enumerate() {
        if i > 0 {
            sink.write_all(b"\n")?;
        }
        sink.write_all(INDENT)?;
        sink.write_all(line)?;
    }
    Ok(())
}

// =============================================================================
// File to file
// =============================================================================

/// Transform `input` into `output` with an existing validator.
///
/// The input is opened before the output is created, so a missing input never
/// truncates an existing output file. Both files are closed on every path.
pub fn transform_file<C: CountryResolver>(
    input: &Path,
    output: &Path,
    validator: &RowValidator<C>,
) -> PipelineResult<RunSummary> {
    log_info(format!("Processing CSV file {}", input.display()));
    let mut stream = process_file(input, validator)?;

    let sink = File::create(output).map_err(|source| PipelineError::CreateOutput {
        path: output.to_path_buf(),
        source,
    })?;

    log_info(format!("Writing JSON output to {}", output.display()));
    write_json(stream.by_ref(), BufWriter::new(sink))?;

    Ok(stream.into_summary())
}

/// Run the whole transformation described by `options`.
pub fn run(options: &TransformOptions) -> PipelineResult<RunSummary> {
    let lookup = CountryLookup::with_path(&options.countries);
    let validator = RowValidator::new(&lookup);
    transform_file(&options.input, &options.output, &validator)
}
