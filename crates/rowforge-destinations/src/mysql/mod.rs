use std::time::Duration;

use async_trait::async_trait;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;

use rowforge_core::{Backend, TableRef};
use rowforge_generate::Row;

use crate::adapter::{DdlExecutor, Destination, DestinationWriter, SchemaSource};
use crate::errors::Result;

mod queries;

pub use queries::{MAX_BIND_PARAMS, quote_ident, rows_per_statement};

/// MySQL destination over a single-connection pool.
#[derive(Debug, Clone)]
pub struct MySqlDestination {
    pool: MySqlPool,
}

impl MySqlDestination {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl SchemaSource for MySqlDestination {
    async fn column_names(&self, table: &TableRef) -> Result<Vec<String>> {
        queries::list_column_names(&self.pool, table).await
    }
}

#[async_trait]
impl DdlExecutor for MySqlDestination {
    async fn execute_script(&self, script: &str) -> Result<()> {
        queries::execute_script(&self.pool, script).await
    }

    async fn truncate_and_alter(&self, table: &TableRef, alter: &str) -> Result<()> {
        queries::truncate_table(&self.pool, table).await?;
        queries::execute_script(&self.pool, alter).await
    }
}

#[async_trait]
impl DestinationWriter for MySqlDestination {
    async fn append_rows(&self, table: &TableRef, rows: &[Row]) -> Result<u64> {
        let Some(first) = rows.first() else {
            return Ok(0);
        };
        let columns: Vec<&str> = first.column_names().collect();
        if columns.is_empty() {
            return Ok(0);
        }
        queries::insert_rows(&self.pool, table, &columns, rows).await
    }
}

impl Destination for MySqlDestination {
    fn kind(&self) -> &'static str {
        "mysql"
    }

    fn backend(&self) -> Backend {
        Backend::Mysql
    }
}
