//! CSV table reading and writing
//!
//! Files edited in spreadsheets arrive in several encodings. Reading tries
//! each supported encoding in order and keeps the first that decodes the
//! whole file. Writing always emits UTF-8 with a byte-order mark.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::store::write_atomic;

/// Header of the worker name column
pub const WORKER_COLUMN: &str = "Worker";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Bytes Windows-1252 leaves undefined
const CP1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

// ─────────────────────────────────────────────────────────────────
// Encoding detection
// ─────────────────────────────────────────────────────────────────

/// Text encodings accepted on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8, leading BOM removed if present
    Utf8Bom,
    Utf8,
    /// ISO-8859-1 without the C1 control range
    Latin1,
    Windows1252,
}

impl TextEncoding {
    /// Detection order.
    pub const ALL: [TextEncoding; 4] = [
        TextEncoding::Utf8Bom,
        TextEncoding::Utf8,
        TextEncoding::Latin1,
        TextEncoding::Windows1252,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8Bom => "utf-8-sig",
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin1",
            TextEncoding::Windows1252 => "cp1252",
        }
    }

    /// Decode the whole buffer, or `None` if any byte is not valid here.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8Bom => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                decode_strict(encoding_rs::UTF_8, body)
            }
            TextEncoding::Utf8 => decode_strict(encoding_rs::UTF_8, bytes),
            TextEncoding::Latin1 => {
                if bytes.iter().any(|b| (0x80..=0x9F).contains(b)) {
                    return None;
                }
                Some(encoding_rs::mem::decode_latin1(bytes).into_owned())
            }
            TextEncoding::Windows1252 => {
                if bytes.iter().any(|b| CP1252_UNDEFINED.contains(b)) {
                    return None;
                }
                decode_strict(encoding_rs::WINDOWS_1252, bytes)
            }
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn decode_strict(encoding: &'static encoding_rs::Encoding, bytes: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}

/// First encoding in detection order that decodes `bytes`.
pub fn decode_text(bytes: &[u8]) -> Option<(TextEncoding, String)> {
    TextEncoding::ALL
        .iter()
        .find_map(|encoding| encoding.decode(bytes).map(|text| (*encoding, text)))
}

// ─────────────────────────────────────────────────────────────────
// Table
// ─────────────────────────────────────────────────────────────────

/// A header row plus data rows of raw cell text.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    source: PathBuf,
    encoding: TextEncoding,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Empty table with the given headers.
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            source: PathBuf::new(),
            encoding: TextEncoding::Utf8Bom,
            headers,
            rows: Vec::new(),
        }
    }

    /// Read and parse a CSV file.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let bytes = fs::read(path).map_err(|e| Error::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let (encoding, text) = decode_text(&bytes).ok_or_else(|| Error::UnreadableEncoding {
            path: path.to_path_buf(),
            tried: TextEncoding::ALL
                .iter()
                .map(TextEncoding::label)
                .collect::<Vec<_>>()
                .join(", "),
        })?;

        debug!(path = %path.display(), encoding = %encoding, bytes = bytes.len(), "Decoded table");

        let mut table = Self::parse(&text, path)?;
        table.encoding = encoding;
        Ok(table)
    }

    /// Parse CSV text. `source` is only used in error messages.
    pub fn parse(text: &str, source: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let parse_error = |e: csv::Error| Error::TableParse {
            path: source.to_path_buf(),
            message: e.to_string(),
        };

        let mut records = reader.records();
        let headers: Vec<String> = match records.next() {
            Some(record) => record
                .map_err(parse_error)?
                .iter()
                .map(|h| h.trim().to_string())
                .collect(),
            None => {
                return Err(Error::TableParse {
                    path: source.to_path_buf(),
                    message: "file is empty".to_string(),
                })
            }
        };

        let mut rows = Vec::new();
        for record in records {
            let record = record.map_err(parse_error)?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self {
            source: source.to_path_buf(),
            encoding: TextEncoding::Utf8,
            headers,
            rows,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Append a data row.
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Index of the first column with this header.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of the `Worker` column, or `MissingWorkerColumn`.
    pub fn worker_index(&self) -> Result<usize> {
        self.column_index(WORKER_COLUMN)
            .ok_or_else(|| Error::MissingWorkerColumn {
                path: self.source.clone(),
            })
    }

    /// Cell text; cells past the end of a short row are empty.
    pub fn cell(row: &[String], index: usize) -> &str {
        row.get(index).map(String::as_str).unwrap_or("")
    }

    /// Serialize as UTF-8 CSV with a leading BOM.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = UTF8_BOM.to_vec();
        {
            let mut writer = csv::WriterBuilder::new()
                .flexible(true)
                .from_writer(&mut buffer);
            let write_error = |e: csv::Error| Error::Internal(format!("CSV serialization failed: {}", e));

            writer.write_record(&self.headers).map_err(write_error)?;
            for row in &self.rows {
                writer.write_record(row).map_err(write_error)?;
            }
            writer
                .flush()
                .map_err(|e| Error::Internal(format!("CSV serialization failed: {}", e)))?;
        }
        Ok(buffer)
    }

    /// Write the table to `path` in one atomic replace.
    pub fn write(&self, path: &Path) -> Result<()> {
        let bytes = self.to_csv_bytes()?;
        write_atomic(path, &bytes)?;
        debug!(path = %path.display(), rows = self.rows.len(), "Table written");
        Ok(())
    }
}
