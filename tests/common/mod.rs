#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Once;
use rust_xlsxwriter::{Format, Workbook};
use tempfile::TempDir;

use control_figure_ingest::IngestEngine;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

pub const LAYOUT_CSV: &str = "Column Name\nName\nOrder-Date\nQty.\n";

pub fn control_csv(column_count: u32, row_count: u32) -> String {
    format!(
        "Column Name,Total\nColumn Count,{}\nRow Count,{}\n",
        column_count, row_count
    )
}

/// Two data rows plus one blank row; the second row has no order date and
/// the first has no quantity.
pub const DATASET_CSV: &str = "Name,Order-Date,Qty.\nWidget,2024-01-01,\nGadget,,5\n,,\n";

pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn database_url(&self) -> String {
        self.dir.path().join("ingest.db").to_string_lossy().to_string()
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("Failed to write fixture");
        path
    }

    pub async fn engine(&self) -> IngestEngine {
        IngestEngine::new(&self.database_url())
            .await
            .expect("Failed to create ingest engine")
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// A cell written into a generated workbook fixture.
pub enum XlsxCell<'a> {
    Blank,
    Text(&'a str),
    Number(f64),
    /// Excel serial date, written with a `yyyy-mm-dd` format.
    Date(f64),
}

impl Workspace {
    pub fn write_xlsx(&self, name: &str, rows: &[Vec<XlsxCell>]) -> PathBuf {
        let path = self.dir.path().join(name);
        let mut workbook = Workbook::new();
        let date = Format::new().set_num_format("yyyy-mm-dd");
        let sheet = workbook.add_worksheet();

        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    XlsxCell::Blank => {}
                    XlsxCell::Text(value) => {
                        sheet.write_string(r, c, *value).expect("Failed to write cell");
                    }
                    XlsxCell::Number(value) => {
                        sheet.write_number(r, c, *value).expect("Failed to write cell");
                    }
                    XlsxCell::Date(serial) => {
                        sheet
                            .write_number_with_format(r, c, *serial, &date)
                            .expect("Failed to write cell");
                    }
                }
            }
        }

        workbook.save(&path).expect("Failed to save workbook fixture");
        path
    }
}

pub fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
