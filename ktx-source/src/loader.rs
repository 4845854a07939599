//! Reading ridership files into raw and validated tables.
//!
//! # CSV Format
//!
//! Headers required, comma delimited, one row per station per month:
//!
//! ```text
//! 운행년월,정차역,하행_승차인원수,하행_하차인원수,상행_승차인원수,상행_하차인원수
//! 2023-01-01,서울,1520331,1498210,1377450,1402981
//! 2023-01-01,부산,801223,779011,768340,790122
//! ```

use crate::{compression, encoding};
use ktx_core::{validate, KtxError, NegativeCountPolicy, RawTable, Result, Table};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Anything that can produce a raw ridership table.
pub trait DataSource {
    fn load(&self) -> Result<RawTable>;
}

/// A ridership file on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    path: PathBuf,
    encodings: Vec<String>,
}

impl FileSource {
    /// A source using the default encoding chain (`euc-kr`, `cp949`, `utf-8`).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            encodings: encoding::default_labels(),
        }
    }

    /// Replace the candidate encoding chain. Order is significant.
    pub fn with_encodings(mut self, labels: Vec<String>) -> Self {
        self.encodings = labels;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn encodings(&self) -> &[String] {
        &self.encodings
    }
}

impl DataSource for FileSource {
    fn load(&self) -> Result<RawTable> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(KtxError::FileNotFound(self.path.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        let bytes = compression::maybe_gunzip(&bytes)?;

        let decoded = encoding::decode(&bytes, &self.encodings)?.ok_or_else(|| {
            KtxError::EncodingUndetermined {
                path: self.path.clone(),
                tried: self.encodings.clone(),
            }
        })?;
        log::info!(
            "[KTX] source: read {} ({} bytes, {})",
            self.path.display(),
            bytes.len(),
            decoded.encoding
        );

        parse_csv(&decoded.text)
    }
}

/// Parse delimited text with a header row into a raw table.
///
/// Rows may be shorter or longer than the header; schema validation reports
/// any missing cell against its row.
pub fn parse_csv(text: &str) -> Result<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    log::info!("[KTX] loader: parsed {} rows with {} columns", rows.len(), headers.len());
    Ok(RawTable::new(headers, rows))
}

/// Load and validate in one step.
pub fn load_table(source: &impl DataSource, policy: NegativeCountPolicy) -> Result<Table> {
    validate(&source.load()?, policy)
}
