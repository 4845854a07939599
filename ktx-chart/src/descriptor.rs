//! Declarative view descriptors.
//!
//! A descriptor names the chart type, title, axes and series of one view and
//! carries the view's tidy data as JSON. The chart layer needs nothing else to
//! draw it.

use serde::Serialize;
use std::fmt;

const COUNT_FIELDS: [&str; 4] = ["boarding_down", "alighting_down", "boarding_up", "alighting_up"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Line,
    GroupedBar,
    Pie,
    Heatmap,
    Scatter,
    Table,
    Box,
}

/// The ten views of the dashboard, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    TimeSeries,
    StationAverages,
    StationShares,
    MonthlyHeat,
    BoardingScatter,
    DataTable,
    StationTotals,
    MonthlyAverages,
    Differential,
    TopN,
}

impl ViewKind {
    pub const ALL: [ViewKind; 10] = [
        ViewKind::TimeSeries,
        ViewKind::StationAverages,
        ViewKind::StationShares,
        ViewKind::MonthlyHeat,
        ViewKind::BoardingScatter,
        ViewKind::DataTable,
        ViewKind::StationTotals,
        ViewKind::MonthlyAverages,
        ViewKind::Differential,
        ViewKind::TopN,
    ];

    /// 1-based display position.
    pub fn position(&self) -> usize {
        *self as usize + 1
    }

    /// Dashboard section; the two summary tables share section 7.
    pub fn section(&self) -> &'static str {
        match self {
            ViewKind::TimeSeries => "1",
            ViewKind::StationAverages => "2",
            ViewKind::StationShares => "3",
            ViewKind::MonthlyHeat => "4",
            ViewKind::BoardingScatter => "5",
            ViewKind::DataTable => "6",
            ViewKind::StationTotals => "7a",
            ViewKind::MonthlyAverages => "7b",
            ViewKind::Differential => "8",
            ViewKind::TopN => "9",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            ViewKind::TimeSeries => "time-series",
            ViewKind::StationAverages => "station-averages",
            ViewKind::StationShares => "station-shares",
            ViewKind::MonthlyHeat => "monthly-heat",
            ViewKind::BoardingScatter => "boarding-scatter",
            ViewKind::DataTable => "data-table",
            ViewKind::StationTotals => "station-totals",
            ViewKind::MonthlyAverages => "monthly-averages",
            ViewKind::Differential => "differential",
            ViewKind::TopN => "top-n",
        }
    }

    pub fn chart_type(&self) -> ChartType {
        match self {
            ViewKind::TimeSeries | ViewKind::TopN => ChartType::Line,
            ViewKind::StationAverages => ChartType::GroupedBar,
            ViewKind::StationShares => ChartType::Pie,
            ViewKind::MonthlyHeat => ChartType::Heatmap,
            ViewKind::BoardingScatter => ChartType::Scatter,
            ViewKind::DataTable | ViewKind::StationTotals | ViewKind::MonthlyAverages => {
                ChartType::Table
            }
            ViewKind::Differential => ChartType::Box,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ViewKind::TimeSeries => "선택된 역의 시간에 따른 승하차 인원 변화",
            ViewKind::StationAverages => "역별 평균 승하차 인원",
            ViewKind::StationShares => "역별 총 승차 인원 비율",
            ViewKind::MonthlyHeat => "월별 평균 승차 인원 히트맵",
            ViewKind::BoardingScatter => "하행 vs 상행 승차 인원",
            ViewKind::DataTable => "데이터 테이블",
            ViewKind::StationTotals => "역별 총 승하차 인원",
            ViewKind::MonthlyAverages => "월평균 승하차 인원",
            ViewKind::Differential => "역별 승하차 인원 차이 분포",
            ViewKind::TopN => "상위 역의 승차 인원 추이",
        }
    }

    /// Field of `data` plotted on the x axis (the key column for tables).
    pub fn x_field(&self) -> &'static str {
        match self {
            ViewKind::TimeSeries | ViewKind::DataTable | ViewKind::TopN => "period",
            ViewKind::MonthlyHeat => "stations",
            ViewKind::BoardingScatter => "boarding_down",
            _ => "station",
        }
    }

    pub fn y_fields(&self) -> Vec<&'static str> {
        match self {
            ViewKind::StationShares => vec!["total_boarding"],
            ViewKind::MonthlyHeat => vec!["months"],
            ViewKind::BoardingScatter => vec!["boarding_up"],
            ViewKind::Differential => vec!["diff_value"],
            ViewKind::TopN => vec!["boarding_down", "boarding_up"],
            _ => COUNT_FIELDS.to_vec(),
        }
    }

    /// Field that splits the data into coloured series, if any.
    pub fn series_key(&self) -> Option<&'static str> {
        match self {
            ViewKind::TimeSeries
            | ViewKind::BoardingScatter
            | ViewKind::DataTable
            | ViewKind::TopN => Some("station"),
            ViewKind::Differential => Some("direction"),
            _ => None,
        }
    }

    pub fn axis_labels(&self) -> AxisLabels {
        match self {
            ViewKind::TimeSeries | ViewKind::TopN => AxisLabels::new("날짜", "인원 수"),
            ViewKind::StationAverages => AxisLabels::new("정차역", "평균 인원 수"),
            ViewKind::StationShares => AxisLabels::new("정차역", "총 승차 인원수"),
            ViewKind::MonthlyHeat => {
                AxisLabels::new("정차역", "월").with_color("평균 승차 인원")
            }
            ViewKind::BoardingScatter => {
                AxisLabels::new("하행 승차 인원수", "상행 승차 인원수").with_color("정차역")
            }
            ViewKind::Differential => {
                AxisLabels::new("정차역", "승하차차이").with_color("방향")
            }
            ViewKind::DataTable | ViewKind::StationTotals | ViewKind::MonthlyAverages => {
                AxisLabels::new("정차역", "인원 수")
            }
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisLabels {
    pub x: String,
    pub y: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl AxisLabels {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Everything a chart layer needs to draw one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewDescriptor {
    pub kind: ViewKind,
    pub section: &'static str,
    pub chart_type: ChartType,
    pub title: String,
    pub data: serde_json::Value,
    pub x_field: String,
    pub y_fields: Vec<String>,
    pub series_key: Option<String>,
    pub axis_labels: AxisLabels,
    /// View-specific extras such as trendlines or a ranking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<serde_json::Value>,
}

impl ViewDescriptor {
    /// Output file name, e.g. `04-monthly-heat.json`.
    pub fn file_name(&self) -> String {
        format!("{:02}-{}.json", self.kind.position(), self.kind.slug())
    }
}
