//! Markdown report persistence
//!
//! One file per run: `<asset>_<date>_<decision>.md` under the configured
//! directory, with the assembled sections in order. Markdown is the only
//! format.

use crate::error::NotifyError;
use chrono::{NaiveDate, Utc};
use council_engine::{ReportSection, TradeSignal};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes assembled reports to a directory
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    /// Create a writer targeting `dir` (created on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Destination directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist the report; returns the written file path
    pub fn write(
        &self,
        asset: &str,
        trade_date: NaiveDate,
        sections: &[ReportSection],
        decision: TradeSignal,
    ) -> Result<PathBuf, NotifyError> {
        fs::create_dir_all(&self.dir)?;

        let filename = format!(
            "{asset}_{date}_{decision}.md",
            date = trade_date.format("%Y-%m-%d"),
            decision = decision.to_string().to_lowercase(),
        );
        let path = self.dir.join(filename);

        let mut content = format!(
            "# {asset} Trading Report - {date}\n\n\
             Decision: **{decision}**\n\n\
             Generated: {generated}\n\n",
            date = trade_date.format("%Y-%m-%d"),
            generated = Utc::now().to_rfc3339(),
        );
        for section in sections {
            content.push_str(&format!("## {}\n\n{}\n\n", section.title, section.body));
        }

        fs::write(&path, content)?;
        info!(path = %path.display(), "report persisted");
        Ok(path)
    }
}
