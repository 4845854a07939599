use chrono::{Datelike, NaiveDate, TimeDelta};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Date format used when handing periods to the chart layer: "YYYY-MM-DD"
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Month key format used for grouping and heatmap axes: "YYYY-MM"
pub const MONTH_FORMAT: &str = "%Y-%m";

/// Separated full-date layouts accepted in the period column.
const DAY_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

/// Separated year-month layouts; parsed by appending a day component.
const MONTH_FORMATS: [&str; 3] = ["%Y-%m", "%Y/%m", "%Y.%m"];

/// A calendar month, normalized to its first day.
///
/// Ridership counts aggregate over whole months, so any day component in the
/// source data is truncated away. Ordering follows the calendar.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Copy, Clone)]
pub struct Period(NaiveDate);

impl Period {
    /// Create a Period from a year and a 1-based month.
    pub fn from_ym_opt(year: i32, month: u32) -> Option<Period> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Period)
    }

    /// Truncate any date to the month containing it.
    pub fn from_date(date: NaiveDate) -> Period {
        Period(date - TimeDelta::days(i64::from(date.day0())))
    }

    /// Parse a period cell.
    ///
    /// Accepts `YYYY-MM-DD`, `YYYY-MM`, `YYYYMM`, `YYYYMMDD`, and the same
    /// layouts separated by `/` or `.`. A trailing time component
    /// (`2023-01-01 00:00:00`) is ignored.
    pub fn parse(s: &str) -> Option<Period> {
        let s = s.split_whitespace().next()?;

        if s.bytes().all(|b| b.is_ascii_digit()) {
            return Self::parse_compact(s);
        }

        DAY_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
            .or_else(|| {
                MONTH_FORMATS.iter().find_map(|fmt| {
                    let with_day = format!("{s}-01");
                    NaiveDate::parse_from_str(&with_day, &format!("{fmt}-%d")).ok()
                })
            })
            .map(Period::from_date)
    }

    fn parse_compact(s: &str) -> Option<Period> {
        let year: i32 = s.get(0..4)?.parse().ok()?;
        let month: u32 = s.get(4..6)?.parse().ok()?;
        match s.len() {
            6 => Period::from_ym_opt(year, month),
            8 => {
                let day: u32 = s.get(6..8)?.parse().ok()?;
                NaiveDate::from_ymd_opt(year, month, day).map(Period::from_date)
            }
            _ => None,
        }
    }

    /// First day of the month.
    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// "YYYY-MM" key for grouping by month.
    pub fn month_key(&self) -> String {
        self.0.format(MONTH_FORMAT).to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(MONTH_FORMAT))
    }
}

impl From<Period> for NaiveDate {
    fn from(value: Period) -> Self {
        value.0
    }
}

impl From<NaiveDate> for Period {
    fn from(value: NaiveDate) -> Self {
        Period::from_date(value)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0.format(DATE_FORMAT))
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Period::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid period: {raw:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::Period;
    use chrono::NaiveDate;

    fn jan_2023() -> Period {
        Period::from_ym_opt(2023, 1).unwrap()
    }

    #[test]
    fn test_parse_accepted_layouts() {
        for raw in [
            "2023-01-01",
            "2023-01",
            "202301",
            "20230115",
            "2023/01/31",
            "2023/01",
            "2023.01",
            "2023-01-01 00:00:00",
            "  2023-01-20  ",
        ] {
            assert_eq!(Period::parse(raw), Some(jan_2023()), "layout {raw:?}");
        }
    }

    #[test]
    fn test_parse_rejects_invalid_months() {
        for raw in ["", "2023-13", "202313", "2023-02-30", "Jan 2023", "2023", "abc"] {
            assert_eq!(Period::parse(raw), None, "layout {raw:?}");
        }
    }

    #[test]
    fn test_from_date_truncates_to_first_day() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let period = Period::from_date(date);
        assert_eq!(period.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(period.month_key(), "2024-02");
        assert_eq!(period.to_string(), "2024-02");
    }

    #[test]
    fn test_ordering_is_chronological() {
        let dec = Period::from_ym_opt(2022, 12).unwrap();
        assert!(dec < jan_2023());
    }

    #[test]
    fn test_serde_uses_full_date() {
        let json = serde_json::to_string(&jan_2023()).unwrap();
        assert_eq!(json, "\"2023-01-01\"");
        let back: Period = serde_json::from_str("\"2023-01\"").unwrap();
        assert_eq!(back, jan_2023());
    }
}
