//! Destinations that receive generated rows, and the per-run pipeline.
//!
//! Each destination implements schema lookup, table provisioning and row
//! writes. [`pipeline::run`] drives one destination from provisioning to the
//! final write.

pub mod adapter;
pub mod bigquery;
pub mod csv;
pub mod errors;
pub mod mysql;
pub mod pipeline;
pub mod postgres;
pub mod sink;

pub use adapter::{DdlExecutor, Destination, DestinationWriter, SchemaSource};
pub use bigquery::{BigQueryDestination, BigQueryOptions};
pub use csv::CsvDestination;
pub use errors::{DestinationError, Result};
pub use mysql::MySqlDestination;
pub use pipeline::{RunReport, RunSettings, SinkMode, run};
pub use postgres::PostgresDestination;
pub use sink::{BatchSink, SinkOutcome, StreamingSink};
