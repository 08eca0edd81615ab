use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("{input} file is missing or empty.")]
    InputMissing { input: String },

    #[error("Failed to parse spreadsheet: {message}")]
    Parse { message: String },

    #[error("Duplicate column name after sanitization: {column}")]
    DuplicateColumn { column: String },

    #[error("Dataset validation failed: column/row mismatch")]
    ValidationFailed,

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("IO error: {message}")]
    Io { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl IngestError {
    pub fn storage(message: impl Into<String>) -> Self {
        IngestError::Storage {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        IngestError::Parse {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::Io {
            message: err.to_string(),
        }
    }
}

impl From<diesel::result::Error> for IngestError {
    fn from(err: diesel::result::Error) -> Self {
        IngestError::Storage {
            message: err.to_string(),
        }
    }
}

impl From<diesel::ConnectionError> for IngestError {
    fn from(err: diesel::ConnectionError) -> Self {
        IngestError::Storage {
            message: format!("Failed to open database connection: {}", err),
        }
    }
}

impl From<calamine::Error> for IngestError {
    fn from(err: calamine::Error) -> Self {
        IngestError::Parse {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        IngestError::Parse {
            message: err.to_string(),
        }
    }
}

impl From<tonic::transport::Error> for IngestError {
    fn from(err: tonic::transport::Error) -> Self {
        IngestError::Internal {
            message: format!("gRPC transport error: {}", err),
        }
    }
}

impl From<IngestError> for tonic::Status {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::InputMissing { .. } => tonic::Status::invalid_argument(err.to_string()),
            IngestError::Config { .. } => tonic::Status::failed_precondition(err.to_string()),
            _ => tonic::Status::internal(format!(
                "An error occurred while processing the files: {}",
                err
            )),
        }
    }
}
