//! Column layout of the ridership file and validation of raw rows.
//!
//! The source file carries Korean headers:
//!
//! ```text
//! 운행년월,정차역,하행_승차인원수,하행_하차인원수,상행_승차인원수,상행_하차인원수
//! 2023-01-01,서울,1520331,1498210,1377450,1402981
//! ```
//!
//! English aliases (`period`, `station`, `boarding_down`, ...) are accepted as
//! well. Validation is a pure function of the raw table: it either returns a
//! typed [`Table`] or the first error encountered.

use crate::error::{KtxError, Result};
use crate::period::Period;
use crate::record::{Record, Table};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Largest accepted magnitude of a single count cell.
///
/// Far above any monthly station figure, and low enough that sums over
/// millions of rows stay exact in the aggregation stage.
pub const MAX_COUNT: i64 = 1_000_000_000_000;

/// A column of the ridership schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Period,
    Station,
    BoardingDown,
    AlightingDown,
    BoardingUp,
    AlightingUp,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Period,
        Field::Station,
        Field::BoardingDown,
        Field::AlightingDown,
        Field::BoardingUp,
        Field::AlightingUp,
    ];

    /// Header as it appears in the source file.
    pub fn header(&self) -> &'static str {
        match self {
            Field::Period => "운행년월",
            Field::Station => "정차역",
            Field::BoardingDown => "하행_승차인원수",
            Field::AlightingDown => "하행_하차인원수",
            Field::BoardingUp => "상행_승차인원수",
            Field::AlightingUp => "상행_하차인원수",
        }
    }

    /// English alias, also the serialized field name of [`Record`].
    pub fn alias(&self) -> &'static str {
        match self {
            Field::Period => "period",
            Field::Station => "station",
            Field::BoardingDown => "boarding_down",
            Field::AlightingDown => "alighting_down",
            Field::BoardingUp => "boarding_up",
            Field::AlightingUp => "alighting_up",
        }
    }
}

/// What to do with a negative passenger count.
///
/// Published monthly figures are occasionally revised downward, so a
/// negative value is not necessarily a defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegativeCountPolicy {
    /// Keep the value silently.
    Accept,
    /// Keep the value and log a warning for the row.
    #[default]
    Warn,
    /// Fail validation with `InvalidCount`.
    Reject,
}

/// Untyped rows as read from the delimited file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Validate a raw table into typed records.
///
/// Row indices in errors are 0-based positions among the data rows.
pub fn validate(raw: &RawTable, policy: NegativeCountPolicy) -> Result<Table> {
    let columns = resolve_columns(&raw.headers)?;
    let column = |field: Field| columns[&field];

    let mut records = Vec::with_capacity(raw.rows.len());
    let mut negative_rows = 0u32;

    for (row, cells) in raw.rows.iter().enumerate() {
        let cell = |field: Field| cells.get(column(field)).map(|s| s.trim()).unwrap_or("");

        let period_raw = cell(Field::Period);
        let period = Period::parse(period_raw).ok_or_else(|| KtxError::MalformedDate {
            row,
            value: period_raw.to_string(),
        })?;

        let station = cell(Field::Station);
        if station.is_empty() {
            return Err(KtxError::MissingStation { row });
        }

        let mut counts = [0i64; 4];
        for (slot, field) in counts.iter_mut().zip(&Field::ALL[2..]) {
            let raw_value = cell(*field);
            let invalid = || KtxError::InvalidCount {
                row,
                column: field.header().to_string(),
                value: raw_value.to_string(),
            };
            let value = parse_count(raw_value).ok_or_else(invalid)?;
            if value < 0 && policy == NegativeCountPolicy::Reject {
                return Err(invalid());
            }
            *slot = value;
        }

        if policy == NegativeCountPolicy::Warn {
            let negative = negative_cells(&counts);
            if !negative.is_empty() {
                negative_rows += 1;
                log::warn!(
                    "[KTX] schema: negative counts at row {} ({} {}): {}",
                    row,
                    station,
                    period,
                    negative.join(", ")
                );
            }
        }

        let [boarding_down, alighting_down, boarding_up, alighting_up] = counts;
        records.push(Record {
            period,
            station: station.to_string(),
            boarding_down,
            alighting_down,
            boarding_up,
            alighting_up,
        });
    }

    let table = Table::new(records);
    log::info!(
        "[KTX] schema: validated {} records across {} stations ({} rows with negative counts)",
        table.len(),
        table.stations().len(),
        negative_rows
    );
    Ok(table)
}

fn resolve_columns(headers: &[String]) -> Result<HashMap<Field, usize>> {
    let header_map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect();

    Field::ALL
        .iter()
        .map(|field| {
            header_map
                .get(field.header())
                .or_else(|| header_map.get(field.alias()))
                .map(|idx| (*field, *idx))
                .ok_or_else(|| KtxError::MissingColumn(field.header().to_string()))
        })
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes leave a BOM on the first header.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_lowercase()
}

/// `header=value` for each negative count, in column order.
fn negative_cells(counts: &[i64; 4]) -> Vec<String> {
    Field::ALL[2..]
        .iter()
        .zip(counts)
        .filter(|(_, value)| **value < 0)
        .map(|(field, value)| format!("{}={}", field.header(), value))
        .collect()
}

/// Parse a count cell. Thousands separators and integral floats ("12.0") are
/// tolerated; anything else, or a magnitude above [`MAX_COUNT`], is rejected.
fn parse_count(raw: &str) -> Option<i64> {
    let cleaned = raw.replace(',', "");
    let value = match cleaned.parse::<i64>() {
        Ok(value) => value,
        Err(_) => {
            let float = cleaned.parse::<f64>().ok()?;
            if !float.is_finite() || float.fract() != 0.0 || float.abs() > MAX_COUNT as f64 {
                return None;
            }
            float as i64
        }
    };
    (-MAX_COUNT..=MAX_COUNT).contains(&value).then_some(value)
}
