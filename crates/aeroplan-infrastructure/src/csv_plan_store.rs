//! CsvPlanStore - Persists assembly plans as BOM-prefixed CSV files.
//!
//! Each plan is written to `<plans_dir>/assembly_plan_<YYYYMMDD_HHMMSS>.csv`.
//! The UTF-8 byte-order mark keeps spreadsheet tools from guessing a legacy
//! encoding for non-ASCII operation names.

use aeroplan_core::config::ArtifactConfig;
use aeroplan_core::plan::{AssemblyPlanRecord, PlanRepository, PlanTable};
use aeroplan_core::{AeroError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const FILE_PREFIX: &str = "assembly_plan_";
const FILE_EXTENSION: &str = ".csv";

/// Plan repository backed by a directory of CSV files.
#[derive(Debug, Clone)]
pub struct CsvPlanStore {
    plans_dir: PathBuf,
}

impl CsvPlanStore {
    pub fn new(plans_dir: impl Into<PathBuf>) -> Self {
        Self {
            plans_dir: plans_dir.into(),
        }
    }

    pub fn from_config(config: &ArtifactConfig) -> Self {
        Self::new(config.plans_dir.clone())
    }

    pub fn plans_dir(&self) -> &Path {
        &self.plans_dir
    }
}

#[async_trait]
impl PlanRepository for CsvPlanStore {
    async fn save(&self, record: &AssemblyPlanRecord) -> Result<PathBuf> {
        let bytes = encode_csv(&record.table)?;

        tokio::fs::create_dir_all(&self.plans_dir)
            .await
            .map_err(|e| AeroError::persistence(format!("Cannot create plans directory: {e}")))?;

        let path = self
            .plans_dir
            .join(format!("{}{}", record.file_stem(), FILE_EXTENSION));
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::warn!(
                "[CsvPlanStore] {} already exists and will be replaced",
                path.display()
            );
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AeroError::persistence(format!("Cannot write {}: {e}", path.display())))?;

        tracing::info!(
            "[CsvPlanStore] Saved plan with {} data rows to {}",
            record.table.data_rows().len(),
            path.display()
        );
        Ok(path)
    }

    async fn latest(&self) -> Result<Option<PathBuf>> {
        let mut entries = match tokio::fs::read_dir(&self.plans_dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        // Timestamped names sort chronologically.
        let mut latest: Option<String> = None;
        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !(name.starts_with(FILE_PREFIX) && name.ends_with(FILE_EXTENSION)) {
                continue;
            }
            if latest.as_ref().is_none_or(|current| name > *current) {
                latest = Some(name);
            }
        }
        Ok(latest.map(|name| self.plans_dir.join(name)))
    }
}

fn encode_csv(table: &PlanTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    for row in table.rows() {
        writer
            .write_record(row)
            .map_err(|e| AeroError::persistence(format!("CSV encoding failed: {e}")))?;
    }
    writer
        .into_inner()
        .map_err(|e| AeroError::persistence(format!("CSV encoding failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use tempfile::TempDir;

    fn record_at(secs: u32, rows: &[&[&str]]) -> AssemblyPlanRecord {
        let rows = rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        AssemblyPlanRecord {
            table: PlanTable::from_rows(rows).unwrap(),
            generated_at: Local.with_ymd_and_hms(2025, 6, 1, 9, 30, secs).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_save_writes_bom_and_rows() {
        let temp_dir = TempDir::new().unwrap();
        let store = CsvPlanStore::new(temp_dir.path().join("plans"));
        let record = record_at(
            0,
            &[&["Order", "Operation"], &["1", "JigIn"], &["2", "Drill, 5mm"]],
        );

        let path = store.save(&record).await.unwrap();
        assert_eq!(
            path,
            temp_dir
                .path()
                .join("plans")
                .join("assembly_plan_20250601_093000.csv")
        );

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text, "Order,Operation\n1,JigIn\n2,\"Drill, 5mm\"\n");
    }

    #[tokio::test]
    async fn test_latest_picks_newest_plan() {
        let temp_dir = TempDir::new().unwrap();
        let store = CsvPlanStore::new(temp_dir.path());
        assert_eq!(store.latest().await.unwrap(), None);

        store.save(&record_at(5, &[&["a"], &["1"]])).await.unwrap();
        let newest = store.save(&record_at(42, &[&["a"], &["2"]])).await.unwrap();
        std::fs::write(temp_dir.path().join("zz_notes.csv"), "x").unwrap();

        assert_eq!(store.latest().await.unwrap(), Some(newest));
    }

    #[tokio::test]
    async fn test_latest_with_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = CsvPlanStore::new(temp_dir.path().join("absent"));
        assert_eq!(store.latest().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unwritable_directory_is_persistence_fault() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("plans");
        std::fs::write(&blocker, "not a directory").unwrap();

        let store = CsvPlanStore::new(blocker.clone());
        let err = store
            .save(&record_at(0, &[&["a"], &["1"]]))
            .await
            .unwrap_err();
        assert!(err.is_persistence());
    }
}
