use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use csv::{ReaderBuilder, WriterBuilder};

use crate::models::{DailyPoint, Metric};
use crate::term::Term;

pub const ORDERS: &str = "orders";
pub const BUDGETS: &str = "budgets";
pub const REPORTS: &str = "reports";

/// Shared document library mounted as a directory. Lists live under
/// `orders/` and `budgets/`, history series under `<term>/<metric>/`, and
/// published workbooks under `reports/`.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn file(&self, folder: &str, name: &str) -> PathBuf {
        self.root.join(folder).join(name)
    }

    pub fn read(&self, folder: &str, name: &str) -> anyhow::Result<String> {
        let path = self.file(folder, name);
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
    }

    pub fn write(&self, folder: &str, name: &str, contents: &[u8]) -> anyhow::Result<PathBuf> {
        let path = self.file(folder, name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Copies a finished workbook into the store's report folder.
    pub fn publish(&self, local: &Path, name: &str) -> anyhow::Result<PathBuf> {
        let bytes =
            fs::read(local).with_context(|| format!("failed to read {}", local.display()))?;
        self.write(REPORTS, name, &bytes)
    }

    fn series_folder(&self, term: &Term, metric: Metric) -> PathBuf {
        self.root.join(term.to_string()).join(metric.folder())
    }

    pub fn series_path(&self, term: &Term, metric: Metric, program: &str) -> PathBuf {
        self.series_folder(term, metric).join(format!("{program}.txt"))
    }

    /// Programs with a stored series, sorted by code.
    pub fn list_series(&self, term: &Term, metric: Metric) -> anyhow::Result<Vec<String>> {
        let folder = self.series_folder(term, metric);
        if !folder.exists() {
            return Ok(Vec::new());
        }
        let mut programs = Vec::new();
        for entry in fs::read_dir(&folder)
            .with_context(|| format!("failed to list {}", folder.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("txt") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    programs.push(stem.to_string());
                }
            }
        }
        programs.sort();
        Ok(programs)
    }

    /// Reads a stored series; `None` when the program has no file yet.
    pub fn read_series(
        &self,
        term: &Term,
        metric: Metric,
        program: &str,
    ) -> anyhow::Result<Option<Vec<DailyPoint>>> {
        let path = self.series_path(term, metric, program);
        if !path.exists() {
            return Ok(None);
        }
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .from_path(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let mut points = Vec::new();
        for result in reader.deserialize::<DailyPoint>() {
            points.push(result.with_context(|| format!("malformed row in {}", path.display()))?);
        }
        Ok(Some(points))
    }

    pub fn write_series(
        &self,
        term: &Term,
        metric: Metric,
        program: &str,
        points: &[DailyPoint],
    ) -> anyhow::Result<()> {
        let mut writer = WriterBuilder::new().delimiter(b'\t').from_writer(Vec::new());
        for point in points {
            writer.serialize(point)?;
        }
        let bytes = writer.into_inner().context("failed to flush series")?;
        let path = self.series_path(term, metric, program);
        let folder = path
            .parent()
            .context("series path has no parent folder")?
            .to_path_buf();
        fs::create_dir_all(&folder)
            .with_context(|| format!("failed to create {}", folder.display()))?;
        fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}
