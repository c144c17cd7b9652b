//! Append-only analysis history kept as JSON Lines.

use std::cmp::Ordering;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::AnalyzeError;
use crate::models::analysis::AnalysisRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Date,
    Result,
    MatchCount,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record as a single line. Creates the file on first use.
    pub fn append(&self, record: &AnalysisRecord) -> Result<(), AnalyzeError> {
        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;

        info!(id = %record.id, path = %self.path.display(), "Analysis saved to history");
        Ok(())
    }

    /// All records, sorted. Ties on `Result` or `MatchCount` fall back to the date.
    /// A history file that does not exist yet lists as empty.
    pub fn list(&self, sort: SortKey, order: SortOrder) -> Result<Vec<AnalysisRecord>, AnalyzeError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (idx, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: AnalysisRecord = serde_json::from_str(line)
                .map_err(|source| AnalyzeError::CorruptHistory { line: idx + 1, source })?;
            records.push(record);
        }

        records.sort_by(|a, b| {
            let ordering = compare(a, b, sort);
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });

        debug!(records = records.len(), ?sort, ?order, "Listed history");
        Ok(records)
    }
}

fn compare(a: &AnalysisRecord, b: &AnalysisRecord, sort: SortKey) -> Ordering {
    let primary = match sort {
        SortKey::Date => Ordering::Equal,
        SortKey::Result => a.result.result.cmp(&b.result.result),
        SortKey::MatchCount => a.result.match_count.cmp(&b.result.match_count),
    };
    primary.then_with(|| a.created_at.cmp(&b.created_at))
}
