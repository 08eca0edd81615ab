use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::proto::ingest;

pub const SUCCESS_DESCRIPTION: &str = "Dataset matches control figures.";
pub const FAIL_DESCRIPTION: &str = "Mismatch in column count, row count, or dataset structure.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ValidationStatus {
    Success,
    Fail,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Success => "Success",
            ValidationStatus::Fail => "Fail",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ValidationStatus::Success => SUCCESS_DESCRIPTION,
            ValidationStatus::Fail => FAIL_DESCRIPTION,
        }
    }

    /// Anything other than `"Success"` reads back as a failure.
    pub fn from_str_lossy(value: &str) -> Self {
        match value {
            "Success" => ValidationStatus::Success,
            _ => ValidationStatus::Fail,
        }
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A labelled expected total read from the `control_figure` table.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlFigure {
    pub label: String,
    pub total: f64,
}

/// Persisted audit record of one validation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub id: i32,
    pub expected_column_count: f64,
    pub actual_column_count: i64,
    pub expected_row_count: f64,
    pub actual_row_count: i64,
    pub validation_status: ValidationStatus,
    pub description: String,
    pub created_at: NaiveDateTime,
}

impl ComparisonResult {
    pub fn passed(&self) -> bool {
        self.validation_status == ValidationStatus::Success
    }
}

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub comparison: ComparisonResult,
    pub rows_inserted: usize,
}

impl From<ComparisonResult> for ingest::ComparisonResult {
    fn from(domain: ComparisonResult) -> Self {
        Self {
            id: domain.id,
            expected_column_count: domain.expected_column_count,
            actual_column_count: domain.actual_column_count,
            expected_row_count: domain.expected_row_count,
            actual_row_count: domain.actual_row_count,
            validation_status: domain.validation_status.as_str().to_string(),
            description: domain.description,
            created_at: domain.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}
