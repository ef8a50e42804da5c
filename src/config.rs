use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Input header names for the five fields the consolidator reads.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ColumnMap {
    pub student_id: String,
    pub student_name: String,
    pub date: String,
    pub category: String,
    pub reason: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            student_id: "번호".to_string(),
            student_name: "성명".to_string(),
            date: "일자".to_string(),
            category: "출결구분".to_string(),
            reason: "사유".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GroupingMode {
    /// Runs break only on a date gap; the first reason of the run wins.
    #[default]
    ByCategory,
    /// Runs also break whenever the reason changes.
    ByCategoryAndReason,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GroupOrder {
    /// Ascending student number, then category label.
    #[default]
    ByKey,
    /// Order in which each group's first row appears in the sheet.
    FirstAppearance,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConsolidateOptions {
    pub columns: ColumnMap,
    pub grouping: GroupingMode,
    pub group_order: GroupOrder,
    pub reason_placeholder: String,
    pub sort_by_student_number: bool,
}

impl Default for ConsolidateOptions {
    fn default() -> Self {
        Self {
            columns: ColumnMap::default(),
            grouping: GroupingMode::default(),
            group_order: GroupOrder::default(),
            reason_placeholder: "사유입력".to_string(),
            sort_by_student_number: false,
        }
    }
}

impl ConsolidateOptions {
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("invalid config {}", path.display()))
    }
}
