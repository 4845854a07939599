//! Hand-off of assembled views to a chart layer.
//!
//! The browser charts read one JSON document per view. `JsonRenderer` writes
//! those documents; `MemoryRenderer` keeps them in memory for callers that
//! embed the pipeline.

use crate::descriptor::ViewDescriptor;
use ktx_core::{KtxError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Consumer of assembled views.
pub trait ChartRenderer {
    fn render(&mut self, view: &ViewDescriptor) -> Result<()>;
}

/// Writes each view as pretty-printed JSON to `<output_dir>/<NN>-<kind>.json`.
#[derive(Debug, Clone)]
pub struct JsonRenderer {
    output_dir: PathBuf,
    written: Vec<PathBuf>,
}

impl JsonRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            written: Vec::new(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Files written since construction or the last `clear`.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Create the output directory if needed and delete views left by an
    /// earlier run, so a failed filter change never shows stale charts.
    pub fn clear(&mut self) -> Result<()> {
        let render_err = |e: std::io::Error| KtxError::Render {
            view: "*".to_string(),
            message: format!("{}: {}", self.output_dir.display(), e),
        };
        fs::create_dir_all(&self.output_dir).map_err(render_err)?;

        let mut removed = 0;
        for entry in fs::read_dir(&self.output_dir).map_err(render_err)? {
            let path = entry.map_err(render_err)?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(&path).map_err(render_err)?;
                removed += 1;
            }
        }
        log::debug!(
            "[KTX] render: cleared {} views from {}",
            removed,
            self.output_dir.display()
        );
        self.written.clear();
        Ok(())
    }
}

impl ChartRenderer for JsonRenderer {
    fn render(&mut self, view: &ViewDescriptor) -> Result<()> {
        let path = self.output_dir.join(view.file_name());
        let render_err = |message: String| KtxError::Render {
            view: view.kind.to_string(),
            message,
        };

        let json = serde_json::to_string_pretty(view).map_err(|e| render_err(e.to_string()))?;
        fs::write(&path, json).map_err(|e| render_err(format!("{}: {}", path.display(), e)))?;

        log::info!("[KTX] render: wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

/// Collects views in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRenderer {
    pub views: Vec<ViewDescriptor>,
}

impl ChartRenderer for MemoryRenderer {
    fn render(&mut self, view: &ViewDescriptor) -> Result<()> {
        self.views.push(view.clone());
        Ok(())
    }
}
