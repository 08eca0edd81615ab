use std::path::Path;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::database::DatabaseManager;
use crate::domain::PipelineReport;
use crate::error::IngestError;
use crate::ingest;
use crate::layout::LayoutStore;
use crate::table_store::DynamicTableStore;
use crate::validator::DatasetValidator;

pub const DATASET_TABLE: &str = "dataset";

/// Runs layout ingestion, control-figure ingestion, dataset validation and
/// dataset persistence, in that order.
///
/// Every step commits on its own. When a later step fails, the tables written
/// by earlier steps (and the comparison result, once validation has run) stay
/// in place.
#[derive(Debug, Clone)]
pub struct IngestPipeline {
    layouts: LayoutStore,
    validator: DatasetValidator,
    tables: DynamicTableStore,
}

impl IngestPipeline {
    pub fn new(database: DatabaseManager) -> Self {
        let tables = DynamicTableStore::new(database.clone());
        let layouts = LayoutStore::new(database.clone(), tables.clone());
        let validator = DatasetValidator::new(database, layouts.clone());

        Self {
            layouts,
            validator,
            tables,
        }
    }

    pub fn tables(&self) -> &DynamicTableStore {
        &self.tables
    }

    pub async fn process_all(
        &self,
        record_layout_path: &Path,
        control_figure_path: &Path,
        dataset_path: &Path,
    ) -> Result<PipelineReport, IngestError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline", %run_id);

        async {
            info!("Starting pipeline run");

            let result = self
                .run(record_layout_path, control_figure_path, dataset_path)
                .await;

            match &result {
                Ok(report) => info!(
                    "Pipeline run finished, {} dataset rows inserted",
                    report.rows_inserted
                ),
                Err(IngestError::ValidationFailed) => warn!("Pipeline run stopped at validation"),
                Err(e) => error!("Pipeline run failed: {}", e),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        record_layout_path: &Path,
        control_figure_path: &Path,
        dataset_path: &Path,
    ) -> Result<PipelineReport, IngestError> {
        self.layouts.ingest_record_layout(record_layout_path).await?;
        self.layouts
            .ingest_control_figures(control_figure_path)
            .await?;

        // One buffered read gives both the row count and the rows to insert.
        let dataset = ingest::read_table(dataset_path).await?;

        let (passed, comparison) = self
            .validator
            .validate(&dataset.columns, dataset.row_count())
            .await?;
        if !passed {
            return Err(IngestError::ValidationFailed);
        }

        self.tables
            .ensure_table(DATASET_TABLE, &dataset.columns)
            .await?;
        let rows_inserted = self
            .tables
            .insert_rows(DATASET_TABLE, &dataset.columns, &dataset.rows)
            .await?;

        Ok(PipelineReport {
            comparison,
            rows_inserted,
        })
    }
}
