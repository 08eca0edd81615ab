use std::path::Path;
use tokio::sync::Mutex;
use tracing::info;

use crate::database::DatabaseManager;
use crate::domain::{ComparisonResult, PipelineReport};
use crate::error::IngestError;
use crate::pipeline::IngestPipeline;

pub struct IngestEngine {
    database: DatabaseManager,
    pipeline: IngestPipeline,
    // Pipeline runs share table names, so only one may run at a time.
    run_lock: Mutex<()>,
}

impl IngestEngine {
    pub async fn new(database_url: &str) -> Result<Self, IngestError> {
        info!("Initializing ingest engine");

        let database = DatabaseManager::new(database_url).await?;
        let pipeline = IngestPipeline::new(database.clone());

        info!("Ingest engine initialized successfully");

        Ok(Self {
            database,
            pipeline,
            run_lock: Mutex::new(()),
        })
    }

    pub fn pipeline(&self) -> &IngestPipeline {
        &self.pipeline
    }

    pub async fn process_all(
        &self,
        record_layout_path: &Path,
        control_figure_path: &Path,
        dataset_path: &Path,
    ) -> Result<PipelineReport, IngestError> {
        let _guard = self.run_lock.lock().await;
        self.pipeline
            .process_all(record_layout_path, control_figure_path, dataset_path)
            .await
    }

    pub async fn list_comparisons(
        &self,
        limit: Option<i64>,
    ) -> Result<Vec<ComparisonResult>, IngestError> {
        self.database.list_comparisons(limit).await
    }

    pub async fn health_check(&self) -> Result<(), IngestError> {
        self.database.health_check().await
    }
}
