//! One pipeline run: filter → aggregate → assemble → render.

use crate::config::Config;
use ktx_chart::{assemble_all, ChartRenderer, Controls, ViewDescriptor};
use ktx_core::{FilterCriteria, KtxError, Result, Table};
use ktx_data::Aggregations;
use ktx_source::{DatasetCache, FileSource};
use std::rc::Rc;

/// Filter the table and build every view for the resulting rows.
pub fn run_views(
    table: &Table,
    criteria: &FilterCriteria,
    top_n: usize,
) -> Result<Vec<ViewDescriptor>> {
    let filtered = ktx_data::filter(table, criteria)?;
    let aggs = Aggregations::compute(&filtered, top_n);
    assemble_all(&aggs)
}

/// Hand every view to `renderer`, stopping at the first failure.
pub fn render_views<R>(views: &[ViewDescriptor], renderer: &mut R) -> Result<()>
where
    R: ChartRenderer + ?Sized,
{
    for view in views {
        renderer.render(view)?;
    }
    log::info!("[KTX] render: {} views rendered", views.len());
    Ok(())
}

/// Loaded data plus selection state, kept across filter changes.
///
/// The dataset is read once through the session's cache and reread only when
/// the file changes on disk. A reread also rebuilds the controls, since the
/// station list and date bounds may have moved.
#[derive(Debug)]
pub struct Session {
    config: Config,
    source: FileSource,
    cache: DatasetCache,
    controls: Option<Controls>,
    controls_load: usize,
}

impl Session {
    pub fn new(config: Config) -> Self {
        let source = FileSource::new(&config.data_path).with_encodings(config.encodings.clone());
        Self {
            config,
            source,
            cache: DatasetCache::new(),
            controls: None,
            controls_load: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    /// The validated table, from cache when the file is unchanged.
    pub fn table(&mut self) -> Result<Rc<Table>> {
        self.cache.get_or_load(&self.source, self.config.negative_counts)
    }

    /// Selection state for the current table.
    pub fn controls(&mut self) -> Result<&mut Controls> {
        let table = self.table()?;
        let current = match self.controls.take() {
            Some(controls) if self.controls_load == self.cache.load_count() => controls,
            _ => self.build_controls(&table)?,
        };
        self.controls_load = self.cache.load_count();
        Ok(self.controls.insert(current))
    }

    fn build_controls(&self, table: &Table) -> Result<Controls> {
        let mut controls = Controls::from_table(table, &self.config.preferred_stations)
            .ok_or_else(|| {
                KtxError::Config(format!(
                    "{} contains no data rows",
                    self.config.data_path.display()
                ))
            })?;
        if let Some(stations) = &self.config.stations {
            controls.select_stations(stations);
        }
        Ok(controls)
    }

    /// The controls' selection, with configured dates taking precedence over
    /// the clamped defaults. Configured dates are not clamped, so an inverted
    /// pair reaches the filter stage and fails there.
    pub fn criteria(&mut self) -> Result<FilterCriteria> {
        let (date_from, date_to) = (self.config.date_from, self.config.date_to);
        let mut criteria = self.controls()?.criteria();
        if let Some(from) = date_from {
            criteria.date_from = from;
        }
        if let Some(to) = date_to {
            criteria.date_to = to;
        }
        Ok(criteria)
    }

    /// Run the pipeline for the current selection and render every view.
    pub fn refresh<R>(&mut self, renderer: &mut R) -> Result<Vec<ViewDescriptor>>
    where
        R: ChartRenderer + ?Sized,
    {
        let table = self.table()?;
        let criteria = self.criteria()?;
        let views = run_views(&table, &criteria, self.config.top_n)?;
        render_views(&views, renderer)?;
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ktx_chart::{MemoryRenderer, ViewKind};
    use std::path::PathBuf;

    const CSV: &str = "\
운행년월,정차역,하행_승차인원수,하행_하차인원수,상행_승차인원수,상행_하차인원수
2023-01-01,서울,\"1,000\",900,800,700
2023-01-01,부산,500,400,300,200
2023-02-01,서울,1100,950,850,750
2023-02-01,부산,550,450,350,250
2023-02-01,오송,50,40,30,20
";

    fn write_data(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("ktx-pipeline-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn config(path: &PathBuf) -> Config {
        Config {
            data_path: path.clone(),
            ..Config::default()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_run_views_end_to_end() {
        let table = ktx_source::parse_csv(CSV)
            .and_then(|raw| ktx_core::validate(&raw, Default::default()))
            .unwrap();
        let criteria = FilterCriteria::new(["서울", "부산"], date(2023, 1, 1), date(2023, 2, 1));
        let views = run_views(&table, &criteria, 5).unwrap();

        assert_eq!(views.len(), 10);
        let data_table = views.iter().find(|v| v.kind == ViewKind::DataTable).unwrap();
        assert_eq!(data_table.data.as_array().unwrap().len(), 4);
        assert_eq!(data_table.data[0]["boarding_down"], 1000);
    }

    #[test]
    fn test_session_refresh_uses_defaults_and_cache() {
        let path = write_data("refresh.csv", CSV);
        let mut session = Session::new(config(&path));
        let mut renderer = MemoryRenderer::default();

        let views = session.refresh(&mut renderer).unwrap();
        assert_eq!(renderer.views.len(), 10);
        // Only 서울 and 부산 of the preferred stations are present.
        let shares = views[2].data.as_array().unwrap();
        assert_eq!(shares.len(), 2);

        session.refresh(&mut renderer).unwrap();
        assert_eq!(session.cache().load_count(), 1);
        assert_eq!(session.controls().unwrap().missing_preferred().len(), 3);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_filter_errors_keep_controls() {
        let path = write_data("filter-errors.csv", CSV);
        let mut session = Session::new(config(&path));
        let mut renderer = MemoryRenderer::default();

        session.controls().unwrap().select_stations(Vec::<String>::new());
        let err = session.refresh(&mut renderer).unwrap_err();
        assert!(matches!(err, KtxError::EmptyResult));
        assert!(!err.halts_pipeline());
        assert!(renderer.views.is_empty());

        session.controls().unwrap().select_stations(["오송"]);
        let views = session.refresh(&mut renderer).unwrap();
        assert_eq!(views[9].annotations.as_ref().unwrap()["ranking"][0]["station"], "오송");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_configured_inverted_dates_fail_in_filter() {
        let path = write_data("inverted.csv", CSV);
        let mut session = Session::new(Config {
            date_from: Some(date(2023, 2, 1)),
            date_to: Some(date(2023, 1, 1)),
            ..config(&path)
        });
        let err = session.refresh(&mut MemoryRenderer::default()).unwrap_err();
        assert!(matches!(err, KtxError::InvalidDateRange { .. }));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_configured_stations_replace_preferred() {
        let path = write_data("stations.csv", CSV);
        let mut session = Session::new(Config {
            stations: Some(vec!["오송".to_string(), "부산".to_string()]),
            ..config(&path)
        });
        assert_eq!(session.controls().unwrap().selected(), &["오송", "부산"]);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_halts() {
        let mut session = Session::new(config(&std::env::temp_dir().join("ktx-pipeline-none.csv")));
        let err = session.refresh(&mut MemoryRenderer::default()).unwrap_err();
        assert!(matches!(err, KtxError::FileNotFound(_)));
        assert!(err.halts_pipeline());
    }
}
