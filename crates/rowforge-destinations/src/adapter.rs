use std::slice;

use async_trait::async_trait;

use rowforge_core::{Backend, TableRef};
use rowforge_generate::Row;

use crate::errors::{DestinationError, Result};

/// Column metadata lookups against a live table.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Column names in ordinal order. Empty when the table does not exist.
    async fn column_names(&self, table: &TableRef) -> Result<Vec<String>>;

    /// Declared width of a fixed-width bit column.
    async fn bit_width(&self, _table: &TableRef, column: &str) -> Result<u32> {
        Err(DestinationError::Unsupported(format!(
            "bit width lookup for column '{column}'"
        )))
    }
}

/// Provisioning statements run once before generation.
#[async_trait]
pub trait DdlExecutor: Send + Sync {
    async fn execute_script(&self, script: &str) -> Result<()>;

    /// Create the target table from `ddl`, with the backend's drop semantics.
    async fn prepare_table(&self, _table: &TableRef, ddl: Option<&str>) -> Result<()> {
        match ddl {
            Some(ddl) => self.execute_script(ddl).await,
            None => Ok(()),
        }
    }

    /// Empty the table, then apply a schema change.
    async fn truncate_and_alter(&self, table: &TableRef, _alter: &str) -> Result<()> {
        Err(DestinationError::Unsupported(format!(
            "truncate and alter on {table}"
        )))
    }
}

/// Row writes: bulk append or one row at a time.
#[async_trait]
pub trait DestinationWriter: Send + Sync {
    /// Append every row in one request. Returns the number of rows written.
    async fn append_rows(&self, table: &TableRef, rows: &[Row]) -> Result<u64>;

    /// Bulk append where `columns` are the planned column names in order.
    ///
    /// Writers with a fixed header override this; it holds even for zero rows.
    async fn append_planned_rows(
        &self,
        table: &TableRef,
        _columns: &[String],
        rows: &[Row],
    ) -> Result<u64> {
        self.append_rows(table, rows).await
    }

    async fn insert_row(&self, table: &TableRef, row: &Row) -> Result<()> {
        self.append_rows(table, slice::from_ref(row)).await.map(|_| ())
    }
}

/// A complete destination the pipeline can drive.
pub trait Destination: SchemaSource + DdlExecutor + DestinationWriter {
    /// Short identifier used in logs and reports.
    fn kind(&self) -> &'static str;

    /// Rule table and value ranges used for this destination's columns.
    fn backend(&self) -> Backend;

    fn supports_streaming(&self) -> bool {
        false
    }
}
