//! Core contracts shared by the rowforge crates.
//!
//! This crate names the supported backends, describes destination tables and
//! columns, and carries the helpers the CLI and adapters both need.

pub mod backend;
pub mod error;
pub mod redaction;
pub mod schema;

pub use backend::Backend;
pub use error::{Error, Result};
pub use redaction::{redact_connection_string, redact_secret};
pub use schema::{ColumnDescriptor, TableRef};
