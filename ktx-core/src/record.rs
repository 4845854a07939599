use crate::period::Period;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One month of ridership at one station.
///
/// Counts are signed so that the `accept` negative-count policy can carry
/// data revisions through unchanged; under the default policies they are
/// non-negative. Validated counts are bounded by [`crate::MAX_COUNT`], so the
/// per-row sums and differences below cannot overflow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    pub period: Period,
    pub station: String,
    pub boarding_down: i64,
    pub alighting_down: i64,
    pub boarding_up: i64,
    pub alighting_up: i64,
}

impl Record {
    /// Down + up boarding.
    pub fn total_boarding(&self) -> i64 {
        self.boarding_down + self.boarding_up
    }

    /// Signed boarding minus alighting in the down direction.
    pub fn down_diff(&self) -> i64 {
        self.boarding_down - self.alighting_down
    }

    /// Signed boarding minus alighting in the up direction.
    pub fn up_diff(&self) -> i64 {
        self.boarding_up - self.alighting_up
    }

    /// The four counts in canonical column order.
    pub fn counts(&self) -> [i64; 4] {
        [
            self.boarding_down,
            self.alighting_down,
            self.boarding_up,
            self.alighting_up,
        ]
    }
}

/// An ordered, immutable sequence of records.
///
/// Every pipeline stage returns a new `Table`; none mutates its input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct station names, sorted.
    pub fn stations(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.station.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Earliest and latest period, or `None` for an empty table.
    pub fn period_bounds(&self) -> Option<(Period, Period)> {
        let min = self.records.iter().map(|r| r.period).min()?;
        let max = self.records.iter().map(|r| r.period).max()?;
        Some((min, max))
    }

    /// A new table holding the records that satisfy `predicate`, in order.
    pub fn select<F>(&self, predicate: F) -> Table
    where
        F: Fn(&Record) -> bool,
    {
        self.records
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }

    /// Group records by station, preserving row order within each group.
    pub fn group_by_station(&self) -> BTreeMap<&str, Vec<&Record>> {
        let mut result: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
        for record in &self.records {
            result.entry(record.station.as_str()).or_default().push(record);
        }
        result
    }
}

impl FromIterator<Record> for Table {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Table::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
