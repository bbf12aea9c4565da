use serde_json::Value;
use sqlx::PgPool;
use sqlx::types::Json;

use rowforge_core::TableRef;

use crate::errors::Result;

pub const DEFAULT_SCHEMA: &str = "public";

pub fn quote_ident(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

pub fn qualified_name(table: &TableRef) -> String {
    format!(
        "{}.{}",
        quote_ident(table.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)),
        quote_ident(&table.name)
    )
}

pub async fn list_column_names(pool: &PgPool, table: &TableRef) -> Result<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>(
        r#"
        select column_name::text
        from information_schema.columns
        where table_schema = $1
          and table_name = $2
        order by ordinal_position
        "#,
    )
    .bind(table.schema.as_deref().unwrap_or(DEFAULT_SCHEMA))
    .bind(&table.name)
    .fetch_all(pool)
    .await?;
    Ok(names)
}

pub async fn fetch_bit_width(pool: &PgPool, table: &TableRef, column: &str) -> Result<Option<i32>> {
    let width = sqlx::query_scalar::<_, Option<i32>>(
        r#"
        select character_maximum_length::int4
        from information_schema.columns
        where table_schema = $1
          and table_name = $2
          and column_name = $3
        "#,
    )
    .bind(table.schema.as_deref().unwrap_or(DEFAULT_SCHEMA))
    .bind(&table.name)
    .bind(column)
    .fetch_optional(pool)
    .await?;
    Ok(width.flatten())
}

pub async fn drop_table_if_exists(pool: &PgPool, table: &TableRef) -> Result<()> {
    let sql = format!("drop table if exists {}", qualified_name(table));
    sqlx::raw_sql(&sql).execute(pool).await?;
    Ok(())
}

pub async fn truncate_table(pool: &PgPool, table: &TableRef) -> Result<()> {
    let sql = format!("truncate table {}", qualified_name(table));
    sqlx::raw_sql(&sql).execute(pool).await?;
    Ok(())
}

pub async fn execute_script(pool: &PgPool, script: &str) -> Result<()> {
    sqlx::raw_sql(script).execute(pool).await?;
    Ok(())
}

/// Bulk insert through `jsonb_populate_recordset`, letting the server cast
/// each JSON field to its column type.
pub async fn insert_json_rows(
    pool: &PgPool,
    table: &TableRef,
    columns: &[&str],
    rows: Value,
) -> Result<u64> {
    let sql = insert_statement(table, columns);
    let result = sqlx::query(&sql).bind(Json(rows)).execute(pool).await?;
    Ok(result.rows_affected())
}

pub fn insert_statement(table: &TableRef, columns: &[&str]) -> String {
    let column_list = columns
        .iter()
        .map(|column| quote_ident(column))
        .collect::<Vec<_>>()
        .join(", ");
    let table_name = qualified_name(table);
    format!(
        "insert into {table_name} ({column_list}) \
         select {column_list} from jsonb_populate_recordset(null::{table_name}, $1)"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("users"), "\"users\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn defaults_to_public_schema() {
        assert_eq!(qualified_name(&TableRef::new("users")), "\"public\".\"users\"");
        assert_eq!(
            qualified_name(&TableRef::qualified("crm", "users")),
            "\"crm\".\"users\""
        );
    }

    #[test]
    fn insert_selects_from_recordset() {
        let sql = insert_statement(&TableRef::new("users"), &["id", "is_active"]);
        assert_eq!(
            sql,
            "insert into \"public\".\"users\" (\"id\", \"is_active\") select \"id\", \"is_active\" \
             from jsonb_populate_recordset(null::\"public\".\"users\", $1)"
        );
    }
}
