//! JSON snapshot source
//!
//! Accepts either `{"transactions": [...], "categories": [...]}` or a bare
//! array of transaction rows.

use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Category, RawRecord};
use crate::normalize::{parse_timestamp, NormalizeOptions};

use super::{fetch_cutoff, TransactionSource};

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Full {
        transactions: Vec<RawRecord>,
        #[serde(default)]
        categories: Vec<Category>,
    },
    Rows(Vec<RawRecord>),
}

/// Transactions read from a JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    limit: Option<usize>,
    opts: NormalizeOptions,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            limit: None,
            opts: NormalizeOptions::default(),
        }
    }

    /// Cap the number of rows returned, like the backend's `limit`
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Read row dates in the same offset the normalizer will use
    pub fn with_normalize_options(mut self, opts: NormalizeOptions) -> Self {
        self.opts = opts;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<(Vec<RawRecord>, Vec<Category>)> {
        if !self.path.exists() {
            return Err(Error::InvalidData(format!(
                "Snapshot file not found: {}",
                self.path.display()
            )));
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(match serde_json::from_str(&content)? {
            SnapshotFile::Full {
                transactions,
                categories,
            } => (transactions, categories),
            SnapshotFile::Rows(rows) => (rows, vec![]),
        })
    }
}

#[async_trait]
impl TransactionSource for JsonFileSource {
    async fn fetch_recent_transactions(
        &self,
        window_months: u32,
        now: NaiveDateTime,
    ) -> Result<Vec<RawRecord>> {
        let (rows, _) = self.load()?;
        let total = rows.len();
        let cutoff = fetch_cutoff(window_months, now);

        // Rows with an unreadable date are kept; the normalizer keeps them out of windows
        let mut dated: Vec<(Option<chrono::NaiveDate>, RawRecord)> = rows
            .into_iter()
            .map(|row| {
                let date = row
                    .date
                    .as_deref()
                    .and_then(|d| parse_timestamp(d, &self.opts))
                    .map(|(ts, _)| ts.date());
                (date, row)
            })
            .filter(|(date, _)| date.map_or(true, |d| d >= cutoff))
            .collect();

        // newest first, undated last
        dated.sort_by_key(|(date, _)| Reverse(*date));

        let mut rows: Vec<RawRecord> = dated.into_iter().map(|(_, row)| row).collect();
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }

        debug!(
            path = %self.path.display(),
            total,
            kept = rows.len(),
            %cutoff,
            "Loaded snapshot transactions"
        );
        Ok(rows)
    }

    async fn fetch_active_categories(&self) -> Result<Vec<Category>> {
        let (_, categories) = self.load()?;
        let mut active: Vec<Category> = categories.into_iter().filter(|c| c.active).collect();
        active.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(active)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 20)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn write_snapshot(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_full_snapshot_filters_window() {
        let file = write_snapshot(
            r##"{
                "transactions": [
                    {"identifier": "old", "date": "2023-08-31", "chargedamount": 10},
                    {"identifier": "edge", "date": "2023-09-01", "chargedamount": 20},
                    {"identifier": "new", "date": "2024-03-19T10:00:00Z", "chargedamount": 30},
                    {"identifier": "undated", "date": "yesterday", "chargedamount": 40}
                ],
                "categories": [
                    {"id": 2, "name": "Transport", "is_active": true},
                    {"id": 1, "name": "Food", "color": "#00ff00"},
                    {"id": 3, "name": "Legacy", "is_active": false}
                ]
            }"##,
        );
        let source = JsonFileSource::new(file.path());

        let rows = source.fetch_recent_transactions(6, now()).await.unwrap();
        let ids: Vec<_> = rows.iter().filter_map(|r| r.identifier.as_deref()).collect();
        assert_eq!(ids, vec!["new", "edge", "undated"]);

        let categories = source.fetch_active_categories().await.unwrap();
        let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Food", "Transport"]);
    }

    #[tokio::test]
    async fn test_bare_array_with_limit() {
        let file = write_snapshot(
            r#"[
                {"identifier": "a", "date": "2024-03-01", "chargedamount": 1},
                {"identifier": "b", "date": "2024-03-10", "chargedamount": 2},
                {"identifier": "c", "date": "2024-03-05", "chargedamount": 3}
            ]"#,
        );
        let source = JsonFileSource::new(file.path()).with_limit(2);

        let rows = source.fetch_recent_transactions(1, now()).await.unwrap();
        let ids: Vec<_> = rows.iter().filter_map(|r| r.identifier.as_deref()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert!(source.fetch_active_categories().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cutoff_uses_configured_offset() {
        // 22:30 UTC on Aug 31 is already Sep 1 at +03:00
        let file = write_snapshot(
            r#"[{"identifier": "late", "date": "2023-08-31T22:30:00Z", "chargedamount": 5}]"#,
        );

        let utc = JsonFileSource::new(file.path());
        assert!(utc.fetch_recent_transactions(6, now()).await.unwrap().is_empty());

        let local = JsonFileSource::new(file.path()).with_normalize_options(NormalizeOptions {
            utc_offset: chrono::FixedOffset::east_opt(3 * 3600).unwrap(),
        });
        let rows = local.fetch_recent_transactions(6, now()).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_errors() {
        let source = JsonFileSource::new("/nonexistent/snapshot.json");
        let result = source.fetch_recent_transactions(6, now()).await;
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_malformed_file_errors() {
        let file = write_snapshot("{\"rows\": 3}");
        let source = JsonFileSource::new(file.path());
        let result = source.fetch_recent_transactions(6, now()).await;
        assert!(matches!(result, Err(Error::Json(_))));
    }
}
