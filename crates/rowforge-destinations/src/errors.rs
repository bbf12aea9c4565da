use thiserror::Error;

use rowforge_generate::GenerationError;

/// Errors raised while provisioning, inspecting or writing a destination.
#[derive(Debug, Error)]
pub enum DestinationError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("table {0} does not exist or has no columns")]
    TableNotFound(String),
    #[error("provisioning failed: {0}")]
    Provisioning(String),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    #[error("core error: {0}")]
    Core(#[from] rowforge_core::Error),
}

pub type Result<T> = std::result::Result<T, DestinationError>;
