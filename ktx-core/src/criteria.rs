use crate::error::{KtxError, Result};
use crate::record::Record;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Station selection plus an inclusive date interval.
///
/// The input provider is expected to keep `date_from <= date_to`, but the
/// filter stage re-checks it with [`FilterCriteria::validate`].
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FilterCriteria {
    pub stations: BTreeSet<String>,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

impl FilterCriteria {
    pub fn new<I, S>(stations: I, date_from: NaiveDate, date_to: NaiveDate) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stations: stations.into_iter().map(Into::into).collect(),
            date_from,
            date_to,
        }
    }

    /// Fails with `InvalidDateRange` when the interval is inverted.
    pub fn validate(&self) -> Result<()> {
        if self.date_from > self.date_to {
            return Err(KtxError::InvalidDateRange {
                from: self.date_from,
                to: self.date_to,
            });
        }
        Ok(())
    }

    /// Whether `date` lies in the interval, both ends inclusive.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.date_from <= date && date <= self.date_to
    }

    /// Row inclusion rule: selected station and period inside the interval.
    ///
    /// The comparison uses the first day of the record's month.
    pub fn matches(&self, record: &Record) -> bool {
        self.stations.contains(&record.station) && self.contains_date(record.period.first_day())
    }
}
