use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportJobError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected HTTP status: {0}")]
    HttpStatus(u16),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No job id to poll: none supplied and none configured")]
    MissingJobId,

    #[error("Polling requires a running tokio runtime")]
    NoRuntime,

    #[error("Unrecognized job status: {0}")]
    UnrecognizedStatus(String),

    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    #[error("Invalid request header: {0}")]
    InvalidHeader(String),

    #[error("Invalid download filename: {0}")]
    InvalidFilename(String),
}
