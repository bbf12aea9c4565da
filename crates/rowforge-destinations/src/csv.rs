use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;

use rowforge_core::{Backend, TableRef};
use rowforge_generate::Row;
use rowforge_generate::output::csv::write_rows_csv;

use crate::adapter::{DdlExecutor, Destination, DestinationWriter, SchemaSource};
use crate::errors::{DestinationError, Result};

/// Offline destination: columns come from configuration and rows go to a file.
#[derive(Debug, Clone)]
pub struct CsvDestination {
    path: PathBuf,
    columns: Vec<String>,
    bit_widths: BTreeMap<String, u32>,
    profile: Backend,
}

impl CsvDestination {
    pub fn new(path: impl Into<PathBuf>, columns: Vec<String>, profile: Backend) -> Self {
        Self {
            path: path.into(),
            columns,
            bit_widths: BTreeMap::new(),
            profile,
        }
    }

    pub fn with_bit_widths(mut self, bit_widths: BTreeMap<String, u32>) -> Self {
        self.bit_widths = bit_widths;
        self
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn write_file(&self, header: &[String], rows: &[Row]) -> Result<u64> {
        write_rows_csv(&self.path, header, rows)
            .map_err(|err| DestinationError::Generation(err.into()))?;
        Ok(rows.len() as u64)
    }
}

#[async_trait]
impl SchemaSource for CsvDestination {
    async fn column_names(&self, _table: &TableRef) -> Result<Vec<String>> {
        Ok(self.columns.clone())
    }

    async fn bit_width(&self, _table: &TableRef, column: &str) -> Result<u32> {
        self.bit_widths.get(column).copied().ok_or_else(|| {
            DestinationError::Unsupported(format!("no bit width configured for '{column}'"))
        })
    }
}

#[async_trait]
impl DdlExecutor for CsvDestination {
    async fn execute_script(&self, _script: &str) -> Result<()> {
        Err(DestinationError::Unsupported(
            "csv destinations cannot run DDL".to_string(),
        ))
    }
}

#[async_trait]
impl DestinationWriter for CsvDestination {
    async fn append_rows(&self, _table: &TableRef, rows: &[Row]) -> Result<u64> {
        let header: Vec<String> = match rows.first() {
            Some(row) => row.column_names().map(str::to_string).collect(),
            None => self.columns.clone(),
        };
        self.write_file(&header, rows)
    }

    async fn append_planned_rows(
        &self,
        _table: &TableRef,
        columns: &[String],
        rows: &[Row],
    ) -> Result<u64> {
        self.write_file(columns, rows)
    }
}

impl Destination for CsvDestination {
    fn kind(&self) -> &'static str {
        "csv"
    }

    fn backend(&self) -> Backend {
        self.profile
    }
}
