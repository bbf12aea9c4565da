use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use rowforge_core::{Backend, TableRef};
use rowforge_generate::Row;

use crate::adapter::{DdlExecutor, Destination, DestinationWriter, SchemaSource};
use crate::errors::{DestinationError, Result};

mod queries;

pub use queries::{DEFAULT_SCHEMA, insert_statement, quote_ident};

/// PostgreSQL destination over a single-connection pool.
#[derive(Debug, Clone)]
pub struct PostgresDestination {
    pool: PgPool,
}

impl PostgresDestination {
    /// Create a destination using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl SchemaSource for PostgresDestination {
    async fn column_names(&self, table: &TableRef) -> Result<Vec<String>> {
        queries::list_column_names(&self.pool, table).await
    }

    async fn bit_width(&self, table: &TableRef, column: &str) -> Result<u32> {
        let width = queries::fetch_bit_width(&self.pool, table, column).await?;
        width
            .and_then(|width| u32::try_from(width).ok())
            .ok_or_else(|| {
                DestinationError::Unsupported(format!("{table}.{column} has no declared bit width"))
            })
    }
}

#[async_trait]
impl DdlExecutor for PostgresDestination {
    async fn execute_script(&self, script: &str) -> Result<()> {
        queries::execute_script(&self.pool, script).await
    }

    /// Drops the table before running `ddl`, so every run starts from a fresh table.
    async fn prepare_table(&self, table: &TableRef, ddl: Option<&str>) -> Result<()> {
        let Some(ddl) = ddl else {
            return Ok(());
        };
        queries::drop_table_if_exists(&self.pool, table).await?;
        queries::execute_script(&self.pool, ddl).await
    }

    async fn truncate_and_alter(&self, table: &TableRef, alter: &str) -> Result<()> {
        queries::truncate_table(&self.pool, table).await?;
        queries::execute_script(&self.pool, alter).await
    }
}

#[async_trait]
impl DestinationWriter for PostgresDestination {
    async fn append_rows(&self, table: &TableRef, rows: &[Row]) -> Result<u64> {
        let Some(first) = rows.first() else {
            return Ok(0);
        };
        let columns: Vec<&str> = first.column_names().collect();
        if columns.is_empty() {
            return Ok(0);
        }
        let payload = Value::Array(
            rows.iter()
                .map(|row| Value::Object(row.to_json_map()))
                .collect(),
        );
        queries::insert_json_rows(&self.pool, table, &columns, payload).await
    }
}

impl Destination for PostgresDestination {
    fn kind(&self) -> &'static str {
        "postgresql"
    }

    fn backend(&self) -> Backend {
        Backend::Postgresql
    }
}
