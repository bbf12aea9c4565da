use async_trait::async_trait;
use serde_json::{Map, Value};

use rowforge_core::{Backend, TableRef};
use rowforge_generate::Row;

use crate::adapter::{DdlExecutor, Destination, DestinationWriter, SchemaSource};
use crate::errors::{DestinationError, Result};

mod client;

pub use client::{BigQueryClient, DEFAULT_API_BASE, QueryParameter};

/// Rows per `insertAll` request; the service recommends 500 and rejects past 50,000.
pub const MAX_INSERT_ROWS: usize = 500;
/// Serialized rows per request, kept under the 10 MB request limit.
pub const MAX_INSERT_BYTES: usize = 9 * 1024 * 1024;
/// `{"json":...},` around each row.
const ROW_ENVELOPE_BYTES: usize = 10;

/// Connection settings for the warehouse destination.
#[derive(Debug, Clone)]
pub struct BigQueryOptions {
    pub project: String,
    pub access_token: String,
    pub api_base: Option<String>,
}

/// BigQuery destination. Tables are addressed as `dataset.table`.
#[derive(Debug, Clone)]
pub struct BigQueryDestination {
    client: BigQueryClient,
}

impl BigQueryDestination {
    pub fn new(options: BigQueryOptions) -> Self {
        let api_base = options
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Self {
            client: BigQueryClient::new(api_base, options.project, options.access_token),
        }
    }

    fn dataset<'a>(&self, table: &'a TableRef) -> Result<&'a str> {
        table.schema.as_deref().ok_or_else(|| {
            DestinationError::Config(format!("bigquery table '{}' needs a dataset", table.name))
        })
    }
}

/// Split rows into consecutive `insertAll` batch sizes.
///
/// A single row over the byte budget still gets its own batch.
pub fn insert_batches(rows: &[Map<String, Value>]) -> Vec<usize> {
    let mut batches = Vec::new();
    let mut len = 0;
    let mut bytes = 0;
    for row in rows {
        let size = serde_json::to_vec(row).map_or(0, |encoded| encoded.len()) + ROW_ENVELOPE_BYTES;
        if len > 0 && (len == MAX_INSERT_ROWS || bytes + size > MAX_INSERT_BYTES) {
            batches.push(len);
            len = 0;
            bytes = 0;
        }
        len += 1;
        bytes += size;
    }
    if len > 0 {
        batches.push(len);
    }
    batches
}

pub fn columns_query(project: &str, dataset: &str) -> String {
    format!(
        "SELECT column_name FROM `{project}.{dataset}`.INFORMATION_SCHEMA.COLUMNS \
         WHERE table_name = @table ORDER BY ordinal_position"
    )
}

#[async_trait]
impl SchemaSource for BigQueryDestination {
    async fn column_names(&self, table: &TableRef) -> Result<Vec<String>> {
        let dataset = self.dataset(table)?;
        let sql = columns_query(self.client.project(), dataset);
        let values = self
            .client
            .query_first_column(&sql, vec![QueryParameter::string("table", &table.name)])
            .await?;
        Ok(values
            .into_iter()
            .filter_map(|value| match value {
                Value::String(name) => Some(name),
                _ => None,
            })
            .collect())
    }
}

#[async_trait]
impl DdlExecutor for BigQueryDestination {
    async fn execute_script(&self, script: &str) -> Result<()> {
        self.client.query_first_column(script, Vec::new()).await?;
        Ok(())
    }
}

#[async_trait]
impl DestinationWriter for BigQueryDestination {
    async fn append_rows(&self, table: &TableRef, rows: &[Row]) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }
        let dataset = self.dataset(table)?;
        let payload: Vec<_> = rows.iter().map(Row::to_json_map).collect();
        let batches = insert_batches(&payload);
        let mut payload = payload.into_iter();
        let mut written = 0;
        for len in batches {
            let chunk = payload.by_ref().take(len).collect();
            written += self.client.insert_all(dataset, &table.name, chunk).await?;
        }
        Ok(written)
    }
}

impl Destination for BigQueryDestination {
    fn kind(&self) -> &'static str {
        "bigquery"
    }

    fn backend(&self) -> Backend {
        Backend::Bigquery
    }

    fn supports_streaming(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_query_targets_dataset_information_schema() {
        assert_eq!(
            columns_query("proj", "analytics"),
            "SELECT column_name FROM `proj.analytics`.INFORMATION_SCHEMA.COLUMNS \
             WHERE table_name = @table ORDER BY ordinal_position"
        );
    }

    fn row(text: &str) -> Map<String, Value> {
        let mut row = Map::new();
        row.insert("note".to_string(), Value::String(text.to_string()));
        row
    }

    #[test]
    fn insert_batches_cap_row_count() {
        let rows = vec![row("a"); MAX_INSERT_ROWS * 2 + 7];
        assert_eq!(insert_batches(&rows), vec![MAX_INSERT_ROWS, MAX_INSERT_ROWS, 7]);
        assert!(insert_batches(&[]).is_empty());
    }

    #[test]
    fn insert_batches_cap_payload_bytes() {
        let large = "x".repeat(MAX_INSERT_BYTES / 3);
        let rows = vec![row(&large); 5];
        let batches = insert_batches(&rows);
        assert_eq!(batches, vec![2, 2, 1]);
        assert_eq!(batches.iter().sum::<usize>(), 5);
    }

    #[test]
    fn oversized_row_gets_its_own_batch() {
        let rows = vec![row("a"), row(&"x".repeat(MAX_INSERT_BYTES)), row("b")];
        assert_eq!(insert_batches(&rows), vec![1, 1, 1]);
    }

    #[test]
    fn tables_need_a_dataset() {
        let destination = BigQueryDestination::new(BigQueryOptions {
            project: "proj".to_string(),
            access_token: "token".to_string(),
            api_base: None,
        });
        assert!(matches!(
            destination.dataset(&TableRef::new("users")),
            Err(DestinationError::Config(_))
        ));
        assert_eq!(
            destination.dataset(&TableRef::qualified("analytics", "users")).ok(),
            Some("analytics")
        );
    }
}
