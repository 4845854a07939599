//! Derived view tables.
//!
//! Each type is the tidy, serializable table behind one dashboard view. They
//! are rebuilt from the filtered rows on every filter change.

use ktx_core::{Period, Record, Table};
use serde::Serialize;

// ───── Time series ─────

/// Filtered rows grouped by station, chronological within each station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    /// Stations in name order, matching the grouping of `rows`.
    pub stations: Vec<String>,
    pub rows: Vec<Record>,
}

// ───── Per-station summaries ─────

/// Mean monthly counts for one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationAverage {
    pub station: String,
    pub boarding_down: f64,
    pub alighting_down: f64,
    pub boarding_up: f64,
    pub alighting_up: f64,
    /// Number of rows averaged.
    pub months: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StationAverages(pub Vec<StationAverage>);

impl StationAverages {
    pub fn get(&self, station: &str) -> Option<&StationAverage> {
        self.0.iter().find(|a| a.station == station)
    }
}

/// Total boarding for one station and its proportion of all stations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationShare {
    pub station: String,
    pub boarding_down: i128,
    pub boarding_up: i128,
    pub total_boarding: i128,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StationShares(pub Vec<StationShare>);

impl StationShares {
    pub fn get(&self, station: &str) -> Option<&StationShare> {
        self.0.iter().find(|s| s.station == station)
    }

    /// Sum of all shares; 1.0 unless every total is zero.
    pub fn total_share(&self) -> f64 {
        self.0.iter().map(|s| s.share).sum()
    }
}

/// Summed counts for one station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationTotal {
    pub station: String,
    pub boarding_down: i128,
    pub alighting_down: i128,
    pub boarding_up: i128,
    pub alighting_up: i128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StationTotals(pub Vec<StationTotal>);

/// Mean monthly counts rounded to whole passengers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyAverage {
    pub station: String,
    pub boarding_down: i64,
    pub alighting_down: i64,
    pub boarding_up: i64,
    pub alighting_up: i64,
}

impl From<&StationAverage> for MonthlyAverage {
    /// Rounds half to even, so 2.5 becomes 2 and 3.5 becomes 4.
    fn from(avg: &StationAverage) -> Self {
        let round = |v: f64| v.round_ties_even() as i64;
        Self {
            station: avg.station.clone(),
            boarding_down: round(avg.boarding_down),
            alighting_down: round(avg.alighting_down),
            boarding_up: round(avg.boarding_up),
            alighting_up: round(avg.alighting_up),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MonthlyAverages(pub Vec<MonthlyAverage>);

// ───── Heatmap ─────

/// Month × station matrix of mean total boarding.
///
/// `values[m][s]` belongs to `months[m]` and `stations[s]`. A station with no
/// row in a month holds `None`, serialized as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyHeat {
    pub months: Vec<String>,
    pub stations: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl MonthlyHeat {
    /// (months, stations)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.months.len(), self.stations.len())
    }

    pub fn cell(&self, month: &str, station: &str) -> Option<f64> {
        let m = self.months.iter().position(|x| x == month)?;
        let s = self.stations.iter().position(|x| x == station)?;
        self.values[m][s]
    }
}

// ───── Differential ─────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Down,
    Up,
}

/// Boarding minus alighting for one row, per direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffRecord {
    pub period: Period,
    pub station: String,
    pub down_diff: i64,
    pub up_diff: i64,
}

impl From<&Record> for DiffRecord {
    fn from(r: &Record) -> Self {
        Self {
            period: r.period,
            station: r.station.clone(),
            down_diff: r.down_diff(),
            up_diff: r.up_diff(),
        }
    }
}

/// One long-form differential observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffValue {
    pub station: String,
    pub direction: Direction,
    pub diff_value: i64,
}

/// Per-row differentials plus their long form for the box view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Differential {
    pub records: Vec<DiffRecord>,
    /// All down values in row order, then all up values in row order.
    pub values: Vec<DiffValue>,
}

impl Differential {
    pub fn direction(&self, direction: Direction) -> impl Iterator<Item = &DiffValue> {
        self.values.iter().filter(move |v| v.direction == direction)
    }
}

// ───── Top N ─────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationRank {
    /// 1-based.
    pub rank: usize,
    pub station: String,
    pub boarding_down_total: i128,
}

/// The N busiest stations by down boarding and their rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopN {
    pub n: usize,
    pub ranking: Vec<StationRank>,
    pub rows: Table,
}

impl TopN {
    pub fn stations(&self) -> Vec<&str> {
        self.ranking.iter().map(|r| r.station.as_str()).collect()
    }
}

// ───── Scatter ─────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScatterPoint {
    pub period: Period,
    pub station: String,
    pub boarding_down: i64,
    pub boarding_up: i64,
}

/// Least-squares line of up boarding against down boarding for one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trendline {
    pub station: String,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Points fitted.
    pub n: usize,
}

impl Trendline {
    pub fn predict(&self, boarding_down: f64) -> f64 {
        self.slope * boarding_down + self.intercept
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardingScatter {
    pub points: Vec<ScatterPoint>,
    pub trendlines: Vec<Trendline>,
}

impl BoardingScatter {
    pub fn trendline(&self, station: &str) -> Option<&Trendline> {
        self.trendlines.iter().find(|t| t.station == station)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_average_rounds_half_to_even() {
        let avg = StationAverage {
            station: "A".into(),
            boarding_down: 2.5,
            alighting_down: 3.5,
            boarding_up: 10.49,
            alighting_up: 10.51,
            months: 2,
        };
        let rounded = MonthlyAverage::from(&avg);
        assert_eq!(rounded.boarding_down, 2);
        assert_eq!(rounded.alighting_down, 4);
        assert_eq!(rounded.boarding_up, 10);
        assert_eq!(rounded.alighting_up, 11);
    }

    #[test]
    fn test_heat_serializes_missing_cells_as_null() {
        let heat = MonthlyHeat {
            months: vec!["2023-01".into()],
            stations: vec!["A".into(), "B".into()],
            values: vec![vec![Some(1.5), None]],
        };
        let json = serde_json::to_value(&heat).unwrap();
        assert_eq!(json["values"][0][1], serde_json::Value::Null);
        assert_eq!(heat.cell("2023-01", "A"), Some(1.5));
        assert_eq!(heat.cell("2023-01", "B"), None);
        assert_eq!(heat.cell("2023-02", "A"), None);
    }

    #[test]
    fn test_direction_serializes_lowercase() {
        let v = DiffValue {
            station: "A".into(),
            direction: Direction::Up,
            diff_value: -3,
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["direction"], "up");
        assert_eq!(json["diff_value"], -3);
    }
}
