mod common;

use common::{init_test_logging, names, Workspace};
use control_figure_ingest::database::DatabaseManager;
use control_figure_ingest::domain::ValidationStatus;
use control_figure_ingest::ingest::{ingest_rows, TabularRow};
use control_figure_ingest::layout::{LayoutStore, CONTROL_FIGURE_TABLE, RECORD_LAYOUT_TABLE};
use control_figure_ingest::sheet::CellValue;
use control_figure_ingest::table_store::DynamicTableStore;
use control_figure_ingest::validator::DatasetValidator;
use control_figure_ingest::IngestError;
use tokio_test::assert_ok;

fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

fn row(pairs: &[(&str, Option<&str>)]) -> TabularRow {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.map(|s| s.to_string())))
        .collect()
}

async fn stores(ws: &Workspace) -> (DatabaseManager, DynamicTableStore, LayoutStore) {
    let database = assert_ok!(DatabaseManager::new(&ws.database_url()).await);
    let tables = DynamicTableStore::new(database.clone());
    let layouts = LayoutStore::new(database.clone(), tables.clone());
    (database, tables, layouts)
}

/// Stores a layout of `columns` and control figures with the given totals.
async fn seed_layout(layouts: &LayoutStore, columns: &[&str], column_count: i64, row_count: i64) {
    let mut layout_rows = vec![vec![text("Column Name")]];
    layout_rows.extend(columns.iter().map(|c| vec![text(c)]));
    let layout = assert_ok!(ingest_rows(layout_rows));
    assert_ok!(layouts.persist(RECORD_LAYOUT_TABLE, &layout).await);

    let control = assert_ok!(ingest_rows(vec![
        vec![text("Column Name"), text("Total")],
        vec![text("Column Count"), CellValue::Int(column_count)],
        vec![text("Row Count"), CellValue::Number(row_count as f64)],
    ]));
    assert_ok!(layouts.persist(CONTROL_FIGURE_TABLE, &control).await);
}

#[tokio::test]
async fn ensure_table_is_idempotent() {
    init_test_logging();

    let ws = Workspace::new();
    let (_, tables, _) = stores(&ws).await;
    let columns = names(&["Name", "Order_Date"]);

    assert_ok!(tables.ensure_table("dataset", &columns).await);
    assert_ok!(tables.ensure_table("dataset", &columns).await);

    assert!(assert_ok!(tables.table_exists("dataset").await));
    assert_eq!(assert_ok!(tables.table_columns("dataset").await), columns);
}

#[tokio::test]
async fn table_exists_distinguishes_created_tables() {
    init_test_logging();

    let ws = Workspace::new();
    let (_, tables, _) = stores(&ws).await;

    assert!(!assert_ok!(tables.table_exists("items").await));
    assert_ok!(tables.ensure_table("items", &names(&["A"])).await);
    assert!(assert_ok!(tables.table_exists("items").await));
    assert!(!assert_ok!(tables.table_exists("other").await));
}

#[tokio::test]
async fn insert_rows_skips_empty_rows_and_appends() {
    init_test_logging();

    let ws = Workspace::new();
    let (_, tables, _) = stores(&ws).await;
    let columns = names(&["A", "B"]);
    assert_ok!(tables.ensure_table("items", &columns).await);

    let rows = vec![
        row(&[("A", Some("1")), ("B", None)]),
        row(&[("A", None), ("B", Some("   "))]),
        row(&[("A", None), ("B", Some("two"))]),
    ];

    assert_eq!(assert_ok!(tables.insert_rows("items", &columns, &rows).await), 2);
    assert_eq!(assert_ok!(tables.insert_rows("items", &columns, &rows).await), 2);

    let stored = assert_ok!(tables.read_rows("items", &columns).await);
    assert_eq!(stored.len(), 4);
    assert_eq!(stored[0]["A"].as_deref(), Some("1"));
    assert_eq!(stored[0]["B"], None);
    assert_eq!(stored[1]["A"], None);
    assert_eq!(stored[1]["B"].as_deref(), Some("two"));
}

#[tokio::test]
async fn insert_into_missing_table_is_a_storage_error() {
    init_test_logging();

    let ws = Workspace::new();
    let (_, tables, _) = stores(&ws).await;
    let columns = names(&["A"]);

    let result = tables
        .insert_rows("nowhere", &columns, &[row(&[("A", Some("1"))])])
        .await;

    assert!(matches!(result, Err(IngestError::Storage { .. })));
}

#[tokio::test]
async fn validator_passes_matching_dataset() {
    init_test_logging();

    let ws = Workspace::new();
    let (database, _, layouts) = stores(&ws).await;
    seed_layout(&layouts, &["A", "B"], 2, 3).await;
    let validator = DatasetValidator::new(database, layouts);

    let (passed, comparison) = assert_ok!(validator.validate(&names(&["A", "B"]), 3).await);

    assert!(passed);
    assert_eq!(comparison.validation_status, ValidationStatus::Success);
    assert_eq!(comparison.expected_column_count, 2.0);
    assert_eq!(comparison.expected_row_count, 3.0);
}

#[tokio::test]
async fn validator_records_failed_row_count() {
    init_test_logging();

    let ws = Workspace::new();
    let (database, _, layouts) = stores(&ws).await;
    seed_layout(&layouts, &["A", "B"], 2, 3).await;
    let validator = DatasetValidator::new(database.clone(), layouts);

    let (passed, comparison) = assert_ok!(validator.validate(&names(&["A", "B"]), 2).await);

    assert!(!passed);
    assert_eq!(comparison.validation_status, ValidationStatus::Fail);

    let stored = assert_ok!(database.list_comparisons(None).await);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, comparison.id);
    assert_eq!(stored[0].expected_row_count, 3.0);
    assert_eq!(stored[0].actual_row_count, 2);
}

#[tokio::test]
async fn validator_sanitizes_layout_columns() {
    init_test_logging();

    let ws = Workspace::new();
    let (database, _, layouts) = stores(&ws).await;
    seed_layout(&layouts, &["Order-Date", "Unit (USD)"], 2, 1).await;
    let validator = DatasetValidator::new(database, layouts);

    let (passed, _) = assert_ok!(
        validator
            .validate(&names(&["Order_Date", "Unit_USD"]), 1)
            .await
    );

    assert!(passed);
}

#[tokio::test]
async fn validator_without_layout_table_is_a_storage_error() {
    init_test_logging();

    let ws = Workspace::new();
    let (database, _, layouts) = stores(&ws).await;
    let validator = DatasetValidator::new(database.clone(), layouts);

    let result = validator.validate(&names(&["A"]), 1).await;

    assert!(matches!(result, Err(IngestError::Storage { .. })));
    assert!(assert_ok!(database.list_comparisons(None).await).is_empty());
}

#[tokio::test]
async fn comparisons_are_listed_newest_first_with_limit() {
    init_test_logging();

    let ws = Workspace::new();
    let (database, _, layouts) = stores(&ws).await;
    seed_layout(&layouts, &["A"], 1, 1).await;
    let validator = DatasetValidator::new(database.clone(), layouts);

    assert_ok!(validator.validate(&names(&["A"]), 1).await);
    assert_ok!(validator.validate(&names(&["A"]), 5).await);
    assert_ok!(database.health_check().await);

    let latest = assert_ok!(database.list_comparisons(Some(1)).await);
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].actual_row_count, 5);
    assert_eq!(latest[0].validation_status, ValidationStatus::Fail);

    let all = assert_ok!(database.list_comparisons(None).await);
    assert_eq!(all.len(), 2);
    assert!(all[0].id > all[1].id);
}
