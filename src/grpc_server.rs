use std::io::Write;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tonic::{transport::Server, Request, Response, Status};
use tracing::{error, info};

use crate::engine::IngestEngine;
use crate::error::IngestError;
use crate::proto::ingest::{
    ingest_service_server::{IngestService, IngestServiceServer},
    HealthCheckRequest, HealthCheckResponse, ListComparisonResultsRequest,
    ListComparisonResultsResponse, ProcessAllRequest, ProcessAllResponse, UploadedFile,
};

/// Extension assumed for uploads whose name carries none.
const DEFAULT_EXTENSION: &str = "xlsx";

pub struct GrpcServer {
    engine: Arc<IngestEngine>,
}

impl GrpcServer {
    pub fn new(engine: Arc<IngestEngine>) -> Self {
        Self { engine }
    }

    pub async fn start(&self, addr: SocketAddr) -> Result<(), IngestError> {
        info!("Starting gRPC server on {}", addr);

        let ingest_service = IngestServiceImpl::new(self.engine.clone());

        Server::builder()
            .add_service(IngestServiceServer::new(ingest_service))
            .serve(addr)
            .await?;

        Ok(())
    }
}

/// Rejects an absent or zero-length upload.
pub fn require_upload(file: Option<UploadedFile>, input: &str) -> Result<UploadedFile, IngestError> {
    file.filter(|f| !f.content.is_empty())
        .ok_or_else(|| IngestError::InputMissing {
            input: input.to_string(),
        })
}

/// Writes an upload to a temporary file that keeps the upload's extension.
/// The file is removed when the returned handle is dropped.
pub fn stage_upload(file: &UploadedFile) -> Result<NamedTempFile, IngestError> {
    let extension = Path::new(&file.filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or(DEFAULT_EXTENSION);

    let mut staged = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(&format!(".{}", extension))
        .tempfile()?;
    staged.write_all(&file.content)?;
    staged.flush()?;

    Ok(staged)
}

pub struct IngestServiceImpl {
    engine: Arc<IngestEngine>,
}

impl IngestServiceImpl {
    pub fn new(engine: Arc<IngestEngine>) -> Self {
        Self { engine }
    }
}

#[tonic::async_trait]
impl IngestService for IngestServiceImpl {
    async fn process_all(
        &self,
        request: Request<ProcessAllRequest>,
    ) -> Result<Response<ProcessAllResponse>, Status> {
        let req = request.into_inner();
        info!("gRPC: Received process_all request");

        let record_layout = require_upload(req.record_layout, "Record Layout")?;
        let control_figure = require_upload(req.control_figure, "Control Figure")?;
        let dataset = require_upload(req.dataset, "Dataset")?;

        let record_layout_file = stage_upload(&record_layout)?;
        let control_figure_file = stage_upload(&control_figure)?;
        let dataset_file = stage_upload(&dataset)?;

        match self
            .engine
            .process_all(
                record_layout_file.path(),
                control_figure_file.path(),
                dataset_file.path(),
            )
            .await
        {
            Ok(report) => {
                info!(
                    "gRPC: Files processed, {} dataset rows inserted",
                    report.rows_inserted
                );
                Ok(Response::new(ProcessAllResponse {
                    success: true,
                    message: "Files processed successfully.".to_string(),
                    comparison: Some(report.comparison.into()),
                    rows_inserted: report.rows_inserted as u64,
                }))
            }
            Err(e) => {
                error!("gRPC: Failed to process files: {}", e);
                Err(Status::from(e))
            }
        }
    }

    async fn list_comparison_results(
        &self,
        request: Request<ListComparisonResultsRequest>,
    ) -> Result<Response<ListComparisonResultsResponse>, Status> {
        let req = request.into_inner();
        info!("gRPC: Received list_comparison_results request");

        let limit = if req.limit > 0 {
            Some(i64::from(req.limit))
        } else {
            None
        };

        match self.engine.list_comparisons(limit).await {
            Ok(results) => {
                info!("gRPC: Returning {} comparison results", results.len());
                Ok(Response::new(ListComparisonResultsResponse {
                    results: results.into_iter().map(|r| r.into()).collect(),
                }))
            }
            Err(e) => {
                error!("gRPC: Failed to list comparison results: {}", e);
                Err(Status::from(e))
            }
        }
    }

    async fn health_check(
        &self,
        _request: Request<HealthCheckRequest>,
    ) -> Result<Response<HealthCheckResponse>, Status> {
        info!("gRPC: Received health_check request");

        match self.engine.health_check().await {
            Ok(_) => {
                info!("gRPC: Health check passed");
                Ok(Response::new(HealthCheckResponse {
                    status: "healthy".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                }))
            }
            Err(e) => {
                error!("gRPC: Health check failed: {}", e);
                Err(Status::internal("Health check failed"))
            }
        }
    }
}
