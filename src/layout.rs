use diesel::sql_types::{Nullable, Text};
use diesel::QueryableByName;
use diesel_async::RunQueryDsl;
use std::path::Path;
use tracing::{info, warn};

use crate::database::DatabaseManager;
use crate::domain::ControlFigure;
use crate::error::IngestError;
use crate::ingest::{self, IngestedTable};
use crate::table_store::DynamicTableStore;

pub const RECORD_LAYOUT_TABLE: &str = "record_layout";
pub const CONTROL_FIGURE_TABLE: &str = "control_figure";

#[derive(QueryableByName)]
struct LayoutRow {
    #[diesel(sql_type = Nullable<Text>)]
    column_name: Option<String>,
}

#[derive(QueryableByName)]
struct ControlFigureRow {
    #[diesel(sql_type = Nullable<Text>)]
    label: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    total: Option<String>,
}

/// Stores the record-layout and control-figure uploads as plain tables and
/// reads them back for validation.
#[derive(Debug, Clone)]
pub struct LayoutStore {
    database: DatabaseManager,
    tables: DynamicTableStore,
}

impl LayoutStore {
    pub fn new(database: DatabaseManager, tables: DynamicTableStore) -> Self {
        Self { database, tables }
    }

    pub async fn ingest_record_layout(&self, path: &Path) -> Result<IngestedTable, IngestError> {
        self.ingest_into(path, RECORD_LAYOUT_TABLE).await
    }

    pub async fn ingest_control_figures(&self, path: &Path) -> Result<IngestedTable, IngestError> {
        self.ingest_into(path, CONTROL_FIGURE_TABLE).await
    }

    pub async fn ingest_into(&self, path: &Path, table: &str) -> Result<IngestedTable, IngestError> {
        let ingested = ingest::read_table(path).await?;
        self.persist(table, &ingested).await?;
        Ok(ingested)
    }

    /// Writes an already ingested file into `table`. A file without a header
    /// row creates nothing.
    pub async fn persist(&self, table: &str, ingested: &IngestedTable) -> Result<usize, IngestError> {
        if !ingested.has_header() {
            warn!("No header row found for {}, nothing to store", table);
            return Ok(0);
        }

        self.tables.ensure_table(table, &ingested.columns).await?;
        let inserted = self
            .tables
            .insert_rows(table, &ingested.columns, &ingested.rows)
            .await?;

        info!("Stored {} rows in {}", inserted, table);
        Ok(inserted)
    }

    /// Declared dataset columns, as written in the layout file.
    pub async fn layout_columns(&self) -> Result<Vec<String>, IngestError> {
        let mut conn = self.database.connect().await?;

        let rows = diesel::sql_query(format!(
            "SELECT Column_Name AS column_name FROM {} ORDER BY Id",
            RECORD_LAYOUT_TABLE
        ))
        .load::<LayoutRow>(&mut conn)
        .await
        .map_err(|e| IngestError::Storage {
            message: format!("Failed to load record layout: {}", e),
        })?;

        Ok(rows.into_iter().filter_map(|r| r.column_name).collect())
    }

    pub async fn control_figures(&self) -> Result<Vec<ControlFigure>, IngestError> {
        let mut conn = self.database.connect().await?;

        let rows = diesel::sql_query(format!(
            "SELECT Column_Name AS label, Total AS total FROM {} ORDER BY Id",
            CONTROL_FIGURE_TABLE
        ))
        .load::<ControlFigureRow>(&mut conn)
        .await
        .map_err(|e| IngestError::Storage {
            message: format!("Failed to load control figures: {}", e),
        })?;

        let mut figures = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(label) = row.label else { continue };
            let total = parse_total(&label, row.total.as_deref())?;
            figures.push(ControlFigure { label, total });
        }

        Ok(figures)
    }
}

/// NULL or blank totals read as zero.
fn parse_total(label: &str, raw: Option<&str>) -> Result<f64, IngestError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Ok(0.0);
    }

    raw.parse::<f64>().map_err(|_| {
        IngestError::storage(format!(
            "Control figure '{}' has a non-numeric total '{}'",
            label, raw
        ))
    })
}
