//! The aggregation engine: one pure computation per view.
//!
//! None of these re-check emptiness; the filter stage guarantees at least one
//! row before they run.

use crate::models::*;
use crate::trendline;
use ktx_core::{Period, Record, Table};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Default size of the top-N view.
pub const DEFAULT_TOP_N: usize = 5;

/// Every derived table for one filter change.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregations {
    pub time_series: TimeSeries,
    pub averages: StationAverages,
    pub shares: StationShares,
    pub heat: MonthlyHeat,
    pub scatter: BoardingScatter,
    pub data_table: Table,
    pub totals: StationTotals,
    pub monthly_averages: MonthlyAverages,
    pub differential: Differential,
    pub top_n: TopN,
}

impl Aggregations {
    pub fn compute(filtered: &Table, top_n: usize) -> Self {
        let averages = station_averages(filtered);
        let monthly_averages = MonthlyAverages(averages.0.iter().map(MonthlyAverage::from).collect());

        let result = Self {
            time_series: time_series(filtered),
            shares: station_shares(filtered),
            heat: monthly_heat(filtered),
            scatter: boarding_scatter(filtered),
            data_table: filtered.clone(),
            totals: station_totals(filtered),
            differential: differential(filtered),
            top_n: top_n_stations(filtered, top_n),
            averages,
            monthly_averages,
        };
        log::info!(
            "[KTX] aggregate: {} rows, {} stations, {} months, top {} = {:?}",
            filtered.len(),
            result.heat.stations.len(),
            result.heat.months.len(),
            result.top_n.n,
            result.top_n.stations()
        );
        result
    }
}

/// Rows grouped by station name, chronological within each station.
pub fn time_series(table: &Table) -> TimeSeries {
    let groups = table.group_by_station();
    let stations = groups.keys().map(|s| s.to_string()).collect();
    let rows = groups
        .into_values()
        .flat_map(|mut rows| {
            rows.sort_by_key(|r| r.period);
            rows.into_iter().cloned()
        })
        .collect();
    TimeSeries { stations, rows }
}

/// Arithmetic mean of each count per station.
pub fn station_averages(table: &Table) -> StationAverages {
    StationAverages(
        station_sums(table)
            .into_iter()
            .map(|(station, (sums, months))| {
                let mean = |v: i128| v as f64 / months as f64;
                StationAverage {
                    station: station.to_string(),
                    boarding_down: mean(sums[0]),
                    alighting_down: mean(sums[1]),
                    boarding_up: mean(sums[2]),
                    alighting_up: mean(sums[3]),
                    months,
                }
            })
            .collect(),
    )
}

/// Total boarding per station and its share of the grand total.
///
/// Zero-total stations are kept with share 0; if the grand total is zero
/// every share is 0.
pub fn station_shares(table: &Table) -> StationShares {
    let sums = station_sums(table);
    let grand_total: i128 = sums.values().map(|(s, _)| s[0] + s[2]).sum();

    StationShares(
        sums.into_iter()
            .map(|(station, (s, _))| {
                let total_boarding = s[0] + s[2];
                let share = if grand_total == 0 {
                    0.0
                } else {
                    total_boarding as f64 / grand_total as f64
                };
                StationShare {
                    station: station.to_string(),
                    boarding_down: s[0],
                    boarding_up: s[2],
                    total_boarding,
                    share,
                }
            })
            .collect(),
    )
}

/// Mean total boarding pivoted into months (rows) × stations (columns).
pub fn monthly_heat(table: &Table) -> MonthlyHeat {
    let mut cells: BTreeMap<(Period, &str), (i128, u32)> = BTreeMap::new();
    for r in table {
        let cell = cells.entry((r.period, r.station.as_str())).or_default();
        cell.0 += i128::from(r.boarding_down) + i128::from(r.boarding_up);
        cell.1 += 1;
    }

    let months: Vec<Period> = table
        .iter()
        .map(|r| r.period)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let stations = table.stations();

    let values = months
        .iter()
        .map(|month| {
            stations
                .iter()
                .map(|station| {
                    cells
                        .get(&(*month, station.as_str()))
                        .map(|(sum, count)| *sum as f64 / f64::from(*count))
                })
                .collect()
        })
        .collect();

    MonthlyHeat {
        months: months.iter().map(Period::month_key).collect(),
        stations,
        values,
    }
}

/// Per-row boarding minus alighting, with a long form of down values
/// followed by up values.
pub fn differential(table: &Table) -> Differential {
    let records: Vec<DiffRecord> = table.iter().map(DiffRecord::from).collect();

    let long_form = |direction: Direction| {
        records.iter().map(move |d| DiffValue {
            station: d.station.clone(),
            direction,
            diff_value: match direction {
                Direction::Down => d.down_diff,
                Direction::Up => d.up_diff,
            },
        })
    };
    let values = long_form(Direction::Down)
        .chain(long_form(Direction::Up))
        .collect();

    Differential { records, values }
}

/// Rank stations by summed down boarding, descending, ties by name.
///
/// Returns at most `n` stations and their rows in original order.
pub fn top_n_stations(table: &Table, n: usize) -> TopN {
    let mut totals: Vec<(&str, i128)> = station_sums(table)
        .into_iter()
        .map(|(station, (sums, _))| (station, sums[0]))
        .collect();
    totals.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    totals.truncate(n);

    let ranking: Vec<StationRank> = totals
        .iter()
        .enumerate()
        .map(|(idx, (station, total))| StationRank {
            rank: idx + 1,
            station: station.to_string(),
            boarding_down_total: *total,
        })
        .collect();

    let members: HashSet<&str> = totals.iter().map(|(s, _)| *s).collect();
    let rows = table.select(|r| members.contains(r.station.as_str()));

    TopN { n, ranking, rows }
}

/// Down vs up boarding per row, with one least-squares line per station.
pub fn boarding_scatter(table: &Table) -> BoardingScatter {
    let points = table
        .iter()
        .map(|r| ScatterPoint {
            period: r.period,
            station: r.station.clone(),
            boarding_down: r.boarding_down,
            boarding_up: r.boarding_up,
        })
        .collect();

    let trendlines = table
        .group_by_station()
        .into_iter()
        .filter_map(|(station, rows)| {
            let xy: Vec<(f64, f64)> = rows
                .iter()
                .map(|r| (r.boarding_down as f64, r.boarding_up as f64))
                .collect();
            let fit = trendline::fit(&xy);
            if fit.is_none() {
                log::debug!("[KTX] aggregate: no trendline for {} ({} points)", station, xy.len());
            }
            fit.map(|f| Trendline {
                station: station.to_string(),
                slope: f.slope,
                intercept: f.intercept,
                r_squared: f.r_squared,
                n: xy.len(),
            })
        })
        .collect();

    BoardingScatter { points, trendlines }
}

/// Summed counts per station.
pub fn station_totals(table: &Table) -> StationTotals {
    StationTotals(
        station_sums(table)
            .into_iter()
            .map(|(station, (s, _))| StationTotal {
                station: station.to_string(),
                boarding_down: s[0],
                alighting_down: s[1],
                boarding_up: s[2],
                alighting_up: s[3],
            })
            .collect(),
    )
}

/// Per-station count sums (canonical column order) and row counts.
///
/// Sums are widened to `i128` so no table of `i64` counts can overflow them.
fn station_sums(table: &Table) -> BTreeMap<&str, ([i128; 4], usize)> {
    let mut sums: BTreeMap<&str, ([i128; 4], usize)> = BTreeMap::new();
    for r in table {
        let entry = sums.entry(r.station.as_str()).or_default();
        for (acc, v) in entry.0.iter_mut().zip(Record::counts(r)) {
            *acc += i128::from(v);
        }
        entry.1 += 1;
    }
    sums
}
