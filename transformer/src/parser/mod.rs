//! Streaming CSV source.
//!
//! Builds a `csv` reader that yields raw records one at a time, decodes their
//! fields to text and recognizes the optional header row. Nothing here knows
//! what a valid customer looks like; that is the validator's job.

use csv::{ByteRecord, Reader, ReaderBuilder};
use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

/// Number of fields in a customer row.
pub const FIELD_COUNT: usize = 7;

/// Column names of the optional header row, in order.
pub const EXPECTED_HEADERS: [&str; FIELD_COUNT] = [
    "id",
    "first_name",
    "last_name",
    "email",
    "signup_date",
    "amount_spent",
    "country_code",
];

const UTF8_BOM: char = '\u{feff}';

/// Wrap a reader in a comma separated CSV reader.
///
/// Headers are not consumed (the stream decides whether the first record is
/// a header) and rows may have any width so that shape problems surface as
/// row-level failures instead of reader errors.
pub fn csv_reader<R: Read>(reader: R) -> Reader<R> {
    ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .flexible(true)
        // Larger internal buffer, fewer syscalls
        .buffer_capacity(1 << 16)
        .from_reader(reader)
}

/// Open a CSV file for streaming.
pub fn open_csv(path: &Path) -> PipelineResult<Reader<File>> {
    if !path.exists() {
        return Err(PipelineError::InputNotFound(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|source| PipelineError::OpenInput {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(csv_reader(file))
}

/// Decode one field. Invalid UTF-8 is read as Windows-1252.
pub fn decode_field(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes).0,
    }
}

/// Decode every field of a raw record.
pub fn decode_record(record: &ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| decode_field(field).into_owned())
        .collect()
}

/// Remove a UTF-8 byte order mark from the first field, if any.
pub fn strip_bom(fields: &mut [String]) {
    if let Some(first) = fields.first_mut() {
        if first.starts_with(UTF8_BOM) {
            first.remove(0);
        }
    }
}

/// Whether a record is the header row.
///
/// Names are compared trimmed and case-insensitively, order matters.
pub fn is_header_row<S: AsRef<str>>(fields: &[S]) -> bool {
    fields.len() == FIELD_COUNT
        && fields
            .iter()
            .zip(EXPECTED_HEADERS)
            .all(|(field, expected)| field.as_ref().trim().to_lowercase() == expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(csv: &str) -> Vec<Vec<String>> {
        let mut rdr = csv_reader(csv.as_bytes());
        let mut record = ByteRecord::new();
        let mut rows = Vec::new();
        while rdr.read_byte_record(&mut record).unwrap() {
            rows.push(decode_record(&record));
        }
        rows
    }

    #[test]
    fn test_quoted_fields() {
        let rows = read_all("1,\"Doe, John\",\"say \"\"hi\"\"\"\n");
        assert_eq!(rows[0], vec!["1", "Doe, John", "say \"hi\""]);
    }

    #[test]
    fn test_variable_width_rows() {
        let rows = read_all("a,b,c\n1,2\n1,2,3,4\n");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].len(), 2);
        assert_eq!(rows[2].len(), 4);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let rows = read_all("a,b\n\n1,2\n");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_header_detection() {
        assert!(is_header_row(&EXPECTED_HEADERS));
        assert!(is_header_row(&[
            " ID ", "First_Name", "LAST_NAME", "email", "signup_date", "amount_spent", "Country_Code",
        ]));
    }

    #[test]
    fn test_header_detection_is_order_sensitive() {
        assert!(!is_header_row(&[
            "first_name", "id", "last_name", "email", "signup_date", "amount_spent", "country_code",
        ]));
        assert!(!is_header_row(&["id", "first_name"]));
        assert!(!is_header_row(&[
            "1", "john", "doe", "john@example.com", "2023-11-15", "250.50", "US",
        ]));
    }

    #[test]
    fn test_strip_bom() {
        let mut fields = vec!["\u{feff}id".to_string(), "first_name".to_string()];
        strip_bom(&mut fields);
        assert_eq!(fields[0], "id");

        let mut empty: Vec<String> = Vec::new();
        strip_bom(&mut empty);
    }

    #[test]
    fn test_latin1_fallback() {
        // "Zoé" in Windows-1252
        let bytes: &[u8] = &[0x5A, 0x6F, 0xE9];
        assert_eq!(decode_field(bytes), "Zoé");
        assert!(matches!(decode_field("Zoé".as_bytes()), Cow::Borrowed(_)));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_csv(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::InputNotFound(_)));
        assert!(err.to_string().contains("missing.csv"));
    }
}
