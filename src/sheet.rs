//! Spreadsheet decoding.
//!
//! Turns a file on disk into rows of [`CellValue`]s. Workbook formats go
//! through calamine and only the first worksheet is read; `.csv` files go
//! through the csv crate. The first row returned is the header row.

use calamine::{open_workbook_auto, Data, DataType, Reader};
use chrono::NaiveDateTime;
use std::path::Path;
use tracing::debug;

use crate::error::IngestError;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Int(i64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Text form used for storage; `None` for an absent cell.
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Int(i) => Some(i.to_string()),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::DateTime(dt) => Some(dt.format(DATETIME_FORMAT).to_string()),
        }
    }

    /// True for absent cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Int(*i),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(_) => match cell.as_datetime() {
                Some(dt) => CellValue::DateTime(dt),
                None => CellValue::Text(cell.to_string()),
            },
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Text(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Workbook,
    Csv,
}

impl SheetFormat {
    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SheetFormat::Workbook),
            "csv" => Ok(SheetFormat::Csv),
            other => Err(IngestError::parse(format!(
                "Unsupported spreadsheet format '{}' for {}",
                other,
                path.display()
            ))),
        }
    }
}

/// Reads every row of the first sheet in `path`.
pub fn read_rows(path: &Path) -> Result<Vec<Vec<CellValue>>, IngestError> {
    let rows = match SheetFormat::from_path(path)? {
        SheetFormat::Workbook => read_workbook(path)?,
        SheetFormat::Csv => read_csv(path)?,
    };

    debug!("Read {} raw rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn read_workbook(path: &Path) -> Result<Vec<Vec<CellValue>>, IngestError> {
    let mut workbook = open_workbook_auto(path)?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok(Vec::new()),
    };

    // The range starts at the first used cell; pad back to A1 so the first
    // physical row stays the header.
    let (row_offset, col_offset) = range
        .start()
        .map_or((0, 0), |(row, col)| (row as usize, col as usize));

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); row_offset];
    rows.extend(range.rows().map(|row| {
        std::iter::repeat(CellValue::Empty)
            .take(col_offset)
            .chain(row.iter().map(CellValue::from))
            .collect()
    }));

    Ok(rows)
}

fn read_csv(path: &Path) -> Result<Vec<Vec<CellValue>>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = record
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let field = if rows.is_empty() && i == 0 {
                    field.trim_start_matches('\u{feff}')
                } else {
                    field
                };
                if field.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(field.to_string())
                }
            })
            .collect();
        rows.push(row);
    }

    Ok(rows)
}
