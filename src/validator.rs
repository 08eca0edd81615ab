use tracing::{info, warn};

use crate::database::DatabaseManager;
use crate::domain::{ComparisonResult, ControlFigure, ValidationStatus};
use crate::error::IngestError;
use crate::layout::LayoutStore;
use crate::models::NewCompareResult;
use crate::sanitize::sanitize_column_name;

pub const COLUMN_COUNT_LABEL: &str = "Column Count";
pub const ROW_COUNT_LABEL: &str = "Row Count";

/// Result of reconciling a dataset against the stored layout and control
/// figures, before it is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub column_match: bool,
    pub column_count_match: bool,
    pub row_count_match: bool,
    pub expected_column_count: f64,
    pub actual_column_count: i64,
    pub expected_row_count: f64,
    pub actual_row_count: i64,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        self.column_match && self.column_count_match && self.row_count_match
    }

    pub fn status(&self) -> ValidationStatus {
        if self.passed() {
            ValidationStatus::Success
        } else {
            ValidationStatus::Fail
        }
    }
}

/// Total of the first figure labelled exactly `label`; zero when absent.
pub fn expected_total(figures: &[ControlFigure], label: &str) -> f64 {
    match figures.iter().find(|f| f.label == label) {
        Some(figure) => figure.total,
        None => {
            warn!("Control figure '{}' not found, expecting 0", label);
            0.0
        }
    }
}

/// Compares dataset columns (order-sensitive) and counts against the
/// already sanitized layout columns and the control figures.
pub fn compare(
    dataset_columns: &[String],
    dataset_row_count: usize,
    expected_columns: &[String],
    figures: &[ControlFigure],
) -> Verdict {
    let expected_column_count = expected_total(figures, COLUMN_COUNT_LABEL);
    let expected_row_count = expected_total(figures, ROW_COUNT_LABEL);

    Verdict {
        column_match: dataset_columns == expected_columns,
        column_count_match: dataset_columns.len() as f64 == expected_column_count,
        row_count_match: dataset_row_count as f64 == expected_row_count,
        expected_column_count,
        actual_column_count: dataset_columns.len() as i64,
        expected_row_count,
        actual_row_count: dataset_row_count as i64,
    }
}

#[derive(Debug, Clone)]
pub struct DatasetValidator {
    database: DatabaseManager,
    layouts: LayoutStore,
}

impl DatasetValidator {
    pub fn new(database: DatabaseManager, layouts: LayoutStore) -> Self {
        Self { database, layouts }
    }

    /// Reconciles the dataset with the stored layout and control figures.
    /// The comparison is persisted whether or not the dataset passes.
    pub async fn validate(
        &self,
        dataset_columns: &[String],
        dataset_row_count: usize,
    ) -> Result<(bool, ComparisonResult), IngestError> {
        let expected_columns: Vec<String> = self
            .layouts
            .layout_columns()
            .await?
            .iter()
            .map(|c| sanitize_column_name(c))
            .collect();
        let figures = self.layouts.control_figures().await?;

        let verdict = compare(dataset_columns, dataset_row_count, &expected_columns, &figures);
        let status = verdict.status();

        info!(
            "Validation {}: columns match={}, column count {}/{}, row count {}/{}",
            status,
            verdict.column_match,
            verdict.actual_column_count,
            verdict.expected_column_count,
            verdict.actual_row_count,
            verdict.expected_row_count
        );

        let comparison = self
            .database
            .record_comparison(&NewCompareResult {
                expected_column_count: verdict.expected_column_count,
                actual_column_count: verdict.actual_column_count,
                expected_row_count: verdict.expected_row_count,
                actual_row_count: verdict.actual_row_count,
                validation_status: status.as_str(),
                description: status.description(),
            })
            .await?;

        Ok((verdict.passed(), comparison))
    }
}
