//! CSV reader with encoding and delimiter auto-detection.
//!
//! Turns raw bytes into string rows keyed by normalized header names.
//! No transaction-specific logic here beyond the required-column check.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::{CsvError, CsvResult};

/// Header characters that collapse into a single `_`.
static HEADER_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("static regex"));

/// One data row as read from the file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based line in the source (header is line 1).
    pub line: usize,
    /// Cell values keyed by normalized header.
    pub fields: HashMap<String, String>,
    /// Cells exactly as read, in header order.
    pub cells: Vec<String>,
}

impl RawRow {
    /// Build a row from `(header, value)` pairs; headers are normalized.
    pub fn from_pairs<'a>(line: usize, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let pairs: Vec<(&str, &str)> = pairs.into_iter().collect();
        Self {
            line,
            fields: pairs.iter().map(|(k, v)| (normalize_header(k), v.to_string())).collect(),
            cells: pairs.iter().map(|(_, v)| v.to_string()).collect(),
        }
    }

    /// Trimmed cell value; `None` when the column is absent or the cell blank.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Data rows in file order
    pub rows: Vec<RawRow>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Normalized column headers, in file order
    pub headers: Vec<String>,
}

/// Normalize a header name: trimmed, lower-cased, non-alphanumeric runs
/// collapsed to `_`.
///
/// `"Purchase Date"`, `"purchase-date"` and `" PURCHASE_DATE "` all map to
/// `purchase_date`.
pub fn normalize_header(raw: &str) -> String {
    let lowered = raw.trim().trim_start_matches('\u{feff}').to_lowercase();
    HEADER_SEPARATORS
        .replace_all(&lowered, "_")
        .trim_matches('_')
        .to_string()
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Invalid UTF-8 falls back to Windows-1252, the usual encoding of
/// spreadsheet exports that claim to be UTF-8 but are not.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        },
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        label => {
            let enc = encoding_rs::Encoding::for_label(label.as_bytes())
                .ok_or_else(|| CsvError::EncodingError(format!("Unsupported encoding '{}'", label)))?;
            enc.decode(bytes).0.into_owned()
        }
    };

    Ok(decoded.trim_start_matches('\u{feff}').to_string())
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV file with auto-detection of encoding and delimiter.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
///
/// Valid UTF-8 is taken as is; chardet only sees the other inputs.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    let encoding = match std::str::from_utf8(bytes) {
        Ok(_) => "utf-8".to_string(),
        Err(_) => detect_encoding(bytes),
    };

    let content = match decode_content(bytes, &encoding) {
        Ok(content) => content,
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    };

    let delimiter = detect_delimiter(&content);

    parse_string_with_metadata(&content, delimiter, encoding)
}

/// Parse a CSV string with an explicit delimiter.
pub fn parse_str(content: &str, delimiter: char) -> CsvResult<Vec<RawRow>> {
    parse_string_with_metadata(content, delimiter, "utf-8".to_string()).map(|r| r.rows)
}

/// Parse CSV string with explicit delimiter and return metadata.
pub fn parse_string_with_metadata(content: &str, delimiter: char, encoding: String) -> CsvResult<ParseResult> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let delimiter_byte = u8::try_from(delimiter).map_err(|_| CsvError::ParseError {
        line: 1,
        message: format!("Delimiter '{}' is not a single-byte character", delimiter),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CsvError::ParseError { line: 1, message: e.to_string() })?
        .iter()
        .map(normalize_header)
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    if let Some(duplicate) = first_duplicate(&headers) {
        return Err(CsvError::ParseError {
            line: 1,
            message: format!("Several columns normalize to '{}'", duplicate),
        });
    }

    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| CsvError::ParseError {
            line: e.position().map(|p| p.line() as usize).unwrap_or(0),
            message: e.to_string(),
        })?;

        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);

        if record.len() > headers.len() {
            return Err(CsvError::ParseError {
                line,
                message: format!("{} cells for {} columns", record.len(), headers.len()),
            });
        }

        // Short rows yield empty cells
        let cells: Vec<String> = (0..headers.len())
            .map(|i| record.get(i).unwrap_or("").to_string())
            .collect();
        let fields = headers.iter().cloned().zip(cells.iter().cloned()).collect();

        rows.push(RawRow { line, fields, cells });
    }

    Ok(ParseResult {
        rows,
        encoding,
        delimiter,
        headers,
    })
}

/// First non-empty header that appears twice.
fn first_duplicate(headers: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    headers
        .iter()
        .filter(|h| !h.is_empty())
        .find(|h| !seen.insert(h.as_str()))
        .map(String::as_str)
}

/// Fail with the first required column missing from `headers`.
pub fn require_columns(headers: &[String], required: &[&str]) -> CsvResult<()> {
    match required.iter().find(|col| !headers.iter().any(|h| h == *col)) {
        Some(missing) => Err(CsvError::MissingColumn((*missing).to_string())),
        None => Ok(()),
    }
}
