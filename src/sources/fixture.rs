use crate::normalize::RawRow;
use crate::sources::traits::RowSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info};

enum Rows {
    File(PathBuf),
    Inline(Vec<RawRow>),
}

/// Rows from a local JSON file (an array of string arrays) or held in memory
pub struct FixtureSource {
    rows: Rows,
}

impl FixtureSource {
    /// Read rows from `path` on every fetch, so edits show up without a restart
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            rows: Rows::File(path.into()),
        }
    }

    pub fn from_rows(rows: Vec<RawRow>) -> Self {
        Self {
            rows: Rows::Inline(rows),
        }
    }

    /// Built-in sample sheet for running without spreadsheet access
    pub fn sample() -> Self {
        info!("📋 Using built-in sample availability rows");
        Self::from_rows(sample_rows())
    }
}

#[async_trait]
impl RowSource for FixtureSource {
    async fn fetch_rows(&self) -> Result<Vec<RawRow>> {
        match &self.rows {
            Rows::Inline(rows) => Ok(rows.clone()),
            Rows::File(path) => {
                let text = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read fixture {}", path.display()))?;
                let rows: Vec<RawRow> = serde_json::from_str(&text)
                    .with_context(|| format!("Fixture {} is not a JSON row array", path.display()))?;
                debug!("Loaded {} rows from {}", rows.len(), path.display());
                Ok(rows)
            }
        }
    }

    fn source_name(&self) -> &'static str {
        match self.rows {
            Rows::File(_) => "fixture file",
            Rows::Inline(_) => "inline rows",
        }
    }
}

fn sample_rows() -> Vec<RawRow> {
    let rows: [[&str; 12]; 6] = [
        ["8/15", "A", "Dolphin Cove", "2 bedroom 1 bath", "9/1-9/5", "4", "7/1", "$488.80", "MM", "HM1001", "HK", "airbnb1, $179, 2D"],
        ["8/15", "A", "Dolphin Cove", "2 bedroom 1 bath", "9/6-9/10", "4", "7/1", "$488.80", "MM", "HM1002", "HK", "airbnb1, 3D"],
        ["8/20", "A2", "Dolphin Cove", "3 bedroom", "9/23-9/25", "2", "7/3", "$366.60", "IS", "HM1003", "", "airbnb2"],
        ["9/1", "Q", "Yellowstone", "1 bedroom", "10/2-10/9", "7", "7/9", "$910.00", "", "HM2001, HM2002", "HK", "4D"],
        ["9/1", "JA", "Dolphin C", "2 bedroom 2 bath", "10/10-10/12", "2", "7/12", "$250.00", "", "", "", ""],
        ["11/30", "V", "Yellowstone", "3 bedroom", "12/28-1/3", "6", "8/1", "$1,320.00", "MM", "HM3001", "HK", "3D"],
    ];

    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}
