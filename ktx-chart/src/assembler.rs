use crate::descriptor::{ViewDescriptor, ViewKind};
use ktx_core::{KtxError, Result};
use ktx_data::Aggregations;
use serde::Serialize;

/// Pair an aggregation result with the static metadata of its view.
///
/// The data is serialized as-is; nothing is computed here.
pub fn assemble<D: Serialize + ?Sized>(kind: ViewKind, data: &D) -> Result<ViewDescriptor> {
    let data = to_json(kind, data)?;
    Ok(ViewDescriptor {
        kind,
        section: kind.section(),
        chart_type: kind.chart_type(),
        title: kind.title().to_string(),
        data,
        x_field: kind.x_field().to_string(),
        y_fields: kind.y_fields().into_iter().map(str::to_string).collect(),
        series_key: kind.series_key().map(str::to_string),
        axis_labels: kind.axis_labels(),
        annotations: None,
    })
}

/// Attach view-specific extras to an assembled descriptor.
pub fn with_annotations<A: Serialize + ?Sized>(
    mut view: ViewDescriptor,
    annotations: &A,
) -> Result<ViewDescriptor> {
    view.annotations = Some(to_json(view.kind, annotations)?);
    Ok(view)
}

/// Assemble all ten views from one set of aggregations, in display order.
pub fn assemble_all(aggs: &Aggregations) -> Result<Vec<ViewDescriptor>> {
    let mut views = Vec::with_capacity(ViewKind::ALL.len());
    for kind in ViewKind::ALL {
        let view = match kind {
            ViewKind::TimeSeries => assemble(kind, &aggs.time_series.rows)?,
            ViewKind::StationAverages => assemble(kind, &aggs.averages)?,
            ViewKind::StationShares => assemble(kind, &aggs.shares)?,
            ViewKind::MonthlyHeat => assemble(kind, &aggs.heat)?,
            ViewKind::BoardingScatter => with_annotations(
                assemble(kind, &aggs.scatter.points)?,
                &serde_json::json!({ "trendlines": aggs.scatter.trendlines }),
            )?,
            ViewKind::DataTable => assemble(kind, &aggs.data_table)?,
            ViewKind::StationTotals => assemble(kind, &aggs.totals)?,
            ViewKind::MonthlyAverages => assemble(kind, &aggs.monthly_averages)?,
            ViewKind::Differential => assemble(kind, &aggs.differential.values)?,
            ViewKind::TopN => {
                let mut view = with_annotations(
                    assemble(kind, &aggs.top_n.rows)?,
                    &serde_json::json!({ "n": aggs.top_n.n, "ranking": aggs.top_n.ranking }),
                )?;
                view.title = format!("상위 {}개 역의 승차 인원 추이", aggs.top_n.n);
                view
            }
        };
        log::debug!("[KTX] assemble: {} ({:?})", kind, view.chart_type);
        views.push(view);
    }
    Ok(views)
}

fn to_json<T: Serialize + ?Sized>(kind: ViewKind, value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| KtxError::Render {
        view: kind.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ChartType;
    use ktx_core::{Period, Record, Table};

    fn record(station: &str, month: u32, counts: [i64; 4]) -> Record {
        Record {
            period: Period::from_ym_opt(2023, month).unwrap(),
            station: station.to_string(),
            boarding_down: counts[0],
            alighting_down: counts[1],
            boarding_up: counts[2],
            alighting_up: counts[3],
        }
    }

    fn sample() -> Table {
        Table::new(vec![
            record("서울", 1, [100, 90, 80, 70]),
            record("부산", 1, [50, 40, 30, 20]),
            record("서울", 2, [110, 95, 85, 75]),
        ])
    }

    #[test]
    fn test_assemble_copies_metadata_and_data() {
        let aggs = Aggregations::compute(&sample(), 5);
        let view = assemble(ViewKind::StationShares, &aggs.shares).unwrap();
        assert_eq!(view.chart_type, ChartType::Pie);
        assert_eq!(view.title, "역별 총 승차 인원 비율");
        assert_eq!(view.x_field, "station");
        assert_eq!(view.y_fields, vec!["total_boarding"]);
        assert_eq!(view.data, serde_json::to_value(&aggs.shares).unwrap());
        assert!(view.annotations.is_none());
    }

    #[test]
    fn test_assemble_all_produces_ten_ordered_views() {
        let aggs = Aggregations::compute(&sample(), 5);
        let views = assemble_all(&aggs).unwrap();
        assert_eq!(views.len(), 10);
        let kinds: Vec<ViewKind> = views.iter().map(|v| v.kind).collect();
        assert_eq!(kinds, ViewKind::ALL.to_vec());
        assert_eq!(views[0].file_name(), "01-time-series.json");
        assert_eq!(views[9].file_name(), "10-top-n.json");
    }

    #[test]
    fn test_view_payloads() {
        let aggs = Aggregations::compute(&sample(), 5);
        let views = assemble_all(&aggs).unwrap();

        // Heatmap keeps the matrix; periods go out as ISO dates.
        assert_eq!(views[3].data["months"], serde_json::json!(["2023-01", "2023-02"]));
        assert_eq!(views[0].data[0]["period"], "2023-01-01");

        let scatter = &views[4];
        assert_eq!(scatter.data.as_array().unwrap().len(), 3);
        let trendlines = &scatter.annotations.as_ref().unwrap()["trendlines"];
        assert_eq!(trendlines.as_array().unwrap().len(), 1);
        assert_eq!(trendlines[0]["station"], "서울");

        let diff = &views[8];
        assert_eq!(diff.data.as_array().unwrap().len(), 6);
        assert_eq!(diff.data[0]["direction"], "down");

        let top = &views[9];
        assert_eq!(top.title, "상위 5개 역의 승차 인원 추이");
        assert_eq!(top.annotations.as_ref().unwrap()["ranking"][0]["station"], "서울");
        assert_eq!(top.data.as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_totals_beyond_json_range_fail_to_render() {
        let big = i64::MAX;
        let table = Table::new(vec![record("서울", 1, [big, 0, 0, 0]), record("서울", 2, [big, 0, 0, 0])]);
        let aggs = Aggregations::compute(&table, 5);

        let err = assemble_all(&aggs).unwrap_err();
        match err {
            KtxError::Render { view, .. } => assert_eq!(view, ViewKind::StationShares.to_string()),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
