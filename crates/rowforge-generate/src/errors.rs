use thiserror::Error;

/// Errors emitted by classification and generation.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{column}: cannot be evaluated for data generation; rename the column or add a rule")]
    CannotClassify { column: String },
    #[error("{column}: bit column has no declared width")]
    MissingBitWidth { column: String },
    #[error("unknown fake-data capability '{0}'")]
    UnknownCapability(String),
    #[error("invalid generation options: {0}")]
    InvalidOptions(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl GenerationError {
    /// Column the error refers to, for classification failures.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::CannotClassify { column } | Self::MissingBitWidth { column } => Some(column),
            _ => None,
        }
    }
}
