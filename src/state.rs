use crate::models::RunReport;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const REPORT_FILE: &str = ".archive-dl-report.json";

/// Last verification result, kept as a hidden file in the save directory.
pub struct ReportStore {
    report_file: PathBuf,
}

impl ReportStore {
    pub fn new(save_dir: &Path) -> Self {
        let report_file = save_dir.join(REPORT_FILE);
        Self { report_file }
    }

    pub fn load_report(&self) -> Result<Option<RunReport>> {
        if !self.report_file.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.report_file)
            .context("Failed to read report file")?;

        serde_json::from_str(&content)
            .map(Some)
            .context("Failed to parse report file")
    }

    pub fn save_report(&self, report: &RunReport) -> Result<()> {
        let content = serde_json::to_string_pretty(report)
            .context("Failed to serialize report")?;

        fs::write(&self.report_file, content).context("Failed to write report file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn report_survives_reload() {
        let dir = TempDir::new().unwrap();
        let store = ReportStore::new(dir.path());
        assert_eq!(store.load_report().unwrap(), None);

        let report = RunReport {
            source: "https://archive.org/details/item".into(),
            listing_url: "https://archive.org/download/item".into(),
            expected: 2,
            mismatched: vec!["b c.png".into()],
            complete: false,
        };
        store.save_report(&report).unwrap();

        assert_eq!(store.load_report().unwrap(), Some(report));
    }
}
