use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::{ComparisonResult, ValidationStatus};
use crate::schema::compare_results;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = compare_results)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CompareResultModel {
    pub id: i32,
    pub expected_column_count: f64,
    pub actual_column_count: i64,
    pub expected_row_count: f64,
    pub actual_row_count: i64,
    pub validation_status: String,
    pub description: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = compare_results)]
pub struct NewCompareResult<'a> {
    pub expected_column_count: f64,
    pub actual_column_count: i64,
    pub expected_row_count: f64,
    pub actual_row_count: i64,
    pub validation_status: &'a str,
    pub description: &'a str,
}

impl From<CompareResultModel> for ComparisonResult {
    fn from(model: CompareResultModel) -> Self {
        ComparisonResult {
            id: model.id,
            expected_column_count: model.expected_column_count,
            actual_column_count: model.actual_column_count,
            expected_row_count: model.expected_row_count,
            actual_row_count: model.actual_row_count,
            validation_status: ValidationStatus::from_str_lossy(&model.validation_status),
            description: model.description,
            created_at: model.created_at,
        }
    }
}
