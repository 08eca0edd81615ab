pub mod proto {
    pub mod ingest {
        tonic::include_proto!("ingest");
    }
}

pub mod config;
pub mod database;
pub mod domain;
pub mod engine;
pub mod error;
pub mod grpc_server;
pub mod ingest;
pub mod layout;
pub mod models;
pub mod pipeline;
pub mod sanitize;
pub mod schema;
pub mod sheet;
pub mod table_store;
pub mod validator;

pub use engine::IngestEngine;
pub use error::IngestError;
pub use grpc_server::GrpcServer;
pub use pipeline::IngestPipeline;
