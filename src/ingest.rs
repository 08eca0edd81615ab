use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

use crate::error::IngestError;
use crate::sanitize::sanitize_column_name;
use crate::sheet::{self, CellValue};

/// One accepted source row, keyed by sanitized column name. `None` is an
/// absent cell and is persisted as NULL.
pub type TabularRow = HashMap<String, Option<String>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestedTable {
    pub columns: Vec<String>,
    pub rows: Vec<TabularRow>,
}

impl IngestedTable {
    /// Number of structurally non-empty rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_header(&self) -> bool {
        !self.columns.is_empty()
    }
}

/// True when every value is absent or whitespace-only.
pub fn is_structurally_empty<'a>(values: impl IntoIterator<Item = &'a Option<String>>) -> bool {
    values
        .into_iter()
        .all(|v| v.as_deref().map_or(true, |s| s.trim().is_empty()))
}

pub fn ingest_file(path: &Path) -> Result<IngestedTable, IngestError> {
    let rows = sheet::read_rows(path)?;
    let table = ingest_rows(rows)?;

    info!(
        "Ingested {} with {} columns and {} rows",
        path.display(),
        table.columns.len(),
        table.row_count()
    );
    Ok(table)
}

/// Runs [`ingest_file`] on the blocking pool.
pub async fn read_table(path: &Path) -> Result<IngestedTable, IngestError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || ingest_file(&path))
        .await
        .map_err(|e| IngestError::Internal {
            message: format!("Spreadsheet reader task failed: {}", e),
        })?
}

/// Builds a table from raw rows, the first of which is the header.
pub fn ingest_rows<I>(rows: I) -> Result<IngestedTable, IngestError>
where
    I: IntoIterator<Item = Vec<CellValue>>,
{
    let mut rows = rows.into_iter();

    let header = match rows.next() {
        Some(header) => header,
        None => return Ok(IngestedTable::default()),
    };

    // (source index, sanitized name) for every non-blank header cell
    let mut retained: Vec<(usize, String)> = Vec::new();
    let mut seen = HashSet::new();
    for (index, cell) in header.iter().enumerate() {
        let raw = cell.to_text().unwrap_or_default();
        let raw = raw.trim();
        if raw.is_empty() {
            debug!("Skipping blank header cell at position {}", index);
            continue;
        }

        let column = sanitize_column_name(raw);
        if !seen.insert(column.clone()) {
            return Err(IngestError::DuplicateColumn { column });
        }
        retained.push((index, column));
    }

    let mut accepted = Vec::new();
    let mut skipped = 0usize;
    for raw_row in rows {
        let blank = retained
            .iter()
            .all(|(index, _)| raw_row.get(*index).map_or(true, CellValue::is_blank));
        if blank {
            skipped += 1;
            continue;
        }

        let row: TabularRow = retained
            .iter()
            .map(|(index, column)| {
                let value = raw_row.get(*index).and_then(CellValue::to_text);
                (column.clone(), value)
            })
            .collect();
        accepted.push(row);
    }

    if skipped > 0 {
        debug!("Dropped {} structurally empty rows", skipped);
    }

    Ok(IngestedTable {
        columns: retained.into_iter().map(|(_, column)| column).collect(),
        rows: accepted,
    })
}
