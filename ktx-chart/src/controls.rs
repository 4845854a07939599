//! Station and date-range selection state.
//!
//! Mirrors the sidebar of the dashboard: a multi-select of stations and a
//! start/end date pair bounded by the data. Every setter clamps instead of
//! failing, so the state always yields a valid [`FilterCriteria`].

use chrono::{NaiveDate, TimeDelta};
use ktx_core::{FilterCriteria, Table};

/// Stations selected by default when present in the data.
pub const DEFAULT_PREFERRED_STATIONS: [&str; 5] = ["서울", "부산", "동대구", "대전", "광주송정"];

/// Length of the default date window ending at the latest period.
const DEFAULT_WINDOW_DAYS: i64 = 365;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    all_stations: Vec<String>,
    selected: Vec<String>,
    missing_preferred: Vec<String>,
    min_date: NaiveDate,
    max_date: NaiveDate,
    start: NaiveDate,
    end: NaiveDate,
}

impl Controls {
    /// Build the initial state from the loaded table.
    ///
    /// Returns `None` for an empty table, which has no date bounds.
    pub fn from_table<S: AsRef<str>>(table: &Table, preferred: &[S]) -> Option<Self> {
        let (min, max) = table.period_bounds()?;
        let all_stations = table.stations();

        let (selected, missing_preferred): (Vec<String>, Vec<String>) = preferred
            .iter()
            .map(|s| s.as_ref().to_string())
            .partition(|s| all_stations.contains(s));
        if !missing_preferred.is_empty() {
            log::warn!(
                "[KTX] controls: preferred stations not found in data: {}",
                missing_preferred.join(", ")
            );
        }

        let min_date = min.first_day();
        let max_date = max.first_day();
        let start = (max_date - TimeDelta::days(DEFAULT_WINDOW_DAYS)).max(min_date);

        Some(Self {
            all_stations,
            selected,
            missing_preferred,
            min_date,
            max_date,
            start,
            end: max_date,
        })
    }

    /// Every station in the data, sorted.
    pub fn all_stations(&self) -> &[String] {
        &self.all_stations
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// Preferred stations that the data does not contain.
    pub fn missing_preferred(&self) -> &[String] {
        &self.missing_preferred
    }

    pub fn bounds(&self) -> (NaiveDate, NaiveDate) {
        (self.min_date, self.max_date)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Replace the selection. Names absent from the data are dropped with a
    /// warning; duplicates collapse to their first occurrence.
    pub fn select_stations<I, S>(&mut self, stations: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected: Vec<String> = Vec::new();
        for station in stations {
            let station = station.as_ref();
            if !self.all_stations.iter().any(|s| s == station) {
                log::warn!("[KTX] controls: ignoring unknown station {}", station);
            } else if !selected.iter().any(|s| s == station) {
                selected.push(station.to_string());
            }
        }
        self.selected = selected;
    }

    /// Set the start date within the data bounds, pushing the end date
    /// forward if it would precede the new start.
    pub fn set_start(&mut self, date: NaiveDate) {
        self.start = date.clamp(self.min_date, self.max_date);
        if self.end < self.start {
            self.end = self.start;
        }
    }

    /// Set the end date within `[start, max]`.
    pub fn set_end(&mut self, date: NaiveDate) {
        self.end = date.clamp(self.start, self.max_date);
    }

    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::new(self.selected.iter().cloned(), self.start, self.end)
    }
}
