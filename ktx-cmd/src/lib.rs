//! Pipeline orchestration for the KTX ridership views.
//!
//! Loads the configured ridership file, applies the selection, and renders
//! every view as JSON for the chart layer.

use anyhow::Context;
use ktx_chart::JsonRenderer;
use ktx_core::ErrorStage;

pub mod config;
pub mod pipeline;

pub use config::Config;
pub use pipeline::{render_views, run_views, Session};

/// Run the pipeline once with `config`.
///
/// Views from an earlier run are removed first, so a run that stops at the
/// filter stage leaves no stale charts behind.
pub fn run(config: Config) -> anyhow::Result<()> {
    let mut renderer = JsonRenderer::new(&config.output_dir);
    renderer
        .clear()
        .with_context(|| format!("Failed to prepare {}", config.output_dir.display()))?;

    let mut session = Session::new(config);
    match session.refresh(&mut renderer) {
        Ok(views) => {
            log::info!(
                "[KTX] Done: {} views in {}",
                views.len(),
                renderer.output_dir().display()
            );
            Ok(())
        }
        Err(e) if e.stage() == ErrorStage::Filter => {
            log::warn!("[KTX] filter: {}", e);
            anyhow::bail!(e.user_message())
        }
        Err(e) => {
            let message = e.user_message();
            Err(anyhow::Error::new(e).context(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const CSV: &str = "\
period,station,boarding_down,alighting_down,boarding_up,alighting_up
2023-01,서울,10,5,7,3
2023-02,서울,20,5,8,3
2023-02,부산,30,5,9,3
";

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ktx-run-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_run_writes_ten_views() {
        let data = temp_path("data.csv");
        let out = temp_path("views");
        std::fs::write(&data, CSV).unwrap();

        run(Config {
            data_path: data.clone(),
            output_dir: out.clone(),
            ..Config::default()
        })
        .unwrap();

        let mut names: Vec<String> = std::fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names.len(), 10);
        assert_eq!(names[0], "01-time-series.json");
        assert_eq!(names[6], "07-station-totals.json");

        let top: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("10-top-n.json")).unwrap())
                .unwrap();
        assert_eq!(top["annotations"]["ranking"][0]["station"], "부산");

        std::fs::remove_dir_all(&out).unwrap();
        std::fs::remove_file(&data).unwrap();
    }

    #[test]
    fn test_filter_failure_clears_previous_views() {
        let data = temp_path("empty-selection.csv");
        let out = temp_path("stale");
        std::fs::write(&data, CSV).unwrap();
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("01-time-series.json"), "{}").unwrap();

        let err = run(Config {
            data_path: data.clone(),
            output_dir: out.clone(),
            stations: Some(vec!["목포".to_string()]),
            ..Config::default()
        })
        .unwrap_err();
        assert!(err.to_string().starts_with("No data matches"));
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);

        std::fs::remove_dir_all(&out).unwrap();
        std::fs::remove_file(&data).unwrap();
    }

    #[test]
    fn test_load_failure_carries_user_message() {
        let err = run(Config {
            data_path: temp_path("missing.csv"),
            output_dir: temp_path("missing-views"),
            ..Config::default()
        })
        .unwrap_err();
        assert!(err.to_string().starts_with("Could not find"));
        assert!(err.root_cause().to_string().starts_with("Data file not found"));

        std::fs::remove_dir_all(temp_path("missing-views")).unwrap();
    }
}
