use thiserror::Error;

/// Core error type shared across rowforge crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A backend name could not be recognised.
    #[error("unsupported backend: {0}")]
    UnsupportedBackend(String),
    /// A table or column identifier cannot be used safely in generated SQL.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}

/// Convenience alias for results returned by rowforge crates.
pub type Result<T> = std::result::Result<T, Error>;
