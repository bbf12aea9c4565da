use chrono::Utc;
use sqlx::mysql::MySql;
use sqlx::query_builder::Separated;
use sqlx::{MySqlPool, QueryBuilder};

use rowforge_core::TableRef;
use rowforge_generate::{GeneratedValue, Row};

use crate::errors::Result;

/// MySQL caps a prepared statement at 65535 placeholders.
pub const MAX_BIND_PARAMS: usize = 65_535;

pub fn quote_ident(value: &str) -> String {
    format!("`{}`", value.replace('`', "``"))
}

pub fn qualified_name(table: &TableRef) -> String {
    match &table.schema {
        Some(schema) => format!("{}.{}", quote_ident(schema), quote_ident(&table.name)),
        None => quote_ident(&table.name),
    }
}

pub async fn list_column_names(pool: &MySqlPool, table: &TableRef) -> Result<Vec<String>> {
    let names = match &table.schema {
        Some(schema) => {
            sqlx::query_scalar::<_, String>(
                r#"
                select cast(column_name as char)
                from information_schema.columns
                where table_schema = ?
                  and table_name = ?
                order by ordinal_position
                "#,
            )
            .bind(schema)
            .bind(&table.name)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_scalar::<_, String>(
                r#"
                select cast(column_name as char)
                from information_schema.columns
                where table_schema = database()
                  and table_name = ?
                order by ordinal_position
                "#,
            )
            .bind(&table.name)
            .fetch_all(pool)
            .await?
        }
    };
    Ok(names)
}

pub async fn execute_script(pool: &MySqlPool, script: &str) -> Result<()> {
    sqlx::raw_sql(script).execute(pool).await?;
    Ok(())
}

pub async fn truncate_table(pool: &MySqlPool, table: &TableRef) -> Result<()> {
    let sql = format!("truncate table {}", qualified_name(table));
    sqlx::raw_sql(&sql).execute(pool).await?;
    Ok(())
}

/// Rows per multi-row `INSERT` so the statement stays under the placeholder cap.
pub fn rows_per_statement(column_count: usize) -> usize {
    (MAX_BIND_PARAMS / column_count.max(1)).max(1)
}

/// Multi-row inserts in one transaction. Returns the number of rows written.
pub async fn insert_rows(
    pool: &MySqlPool,
    table: &TableRef,
    columns: &[&str],
    rows: &[Row],
) -> Result<u64> {
    let prefix = format!(
        "insert into {} ({}) ",
        qualified_name(table),
        columns
            .iter()
            .map(|column| quote_ident(column))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let mut tx = pool.begin().await?;
    let mut written = 0_u64;
    for chunk in rows.chunks(rows_per_statement(columns.len())) {
        let mut builder = QueryBuilder::<MySql>::new(&prefix);
        builder.push_values(chunk, |mut values, row| {
            for column in columns {
                push_value(&mut values, row.get(column));
            }
        });
        written += builder.build().execute(&mut *tx).await?.rows_affected();
    }
    tx.commit().await?;
    Ok(written)
}

fn push_value(values: &mut Separated<'_, '_, MySql, &'static str>, value: Option<&GeneratedValue>) {
    match value {
        None => {
            values.push_bind(None::<String>);
        }
        Some(GeneratedValue::Bool(value)) => {
            values.push_bind(*value);
        }
        Some(GeneratedValue::Int(value)) => {
            values.push_bind(*value);
        }
        Some(GeneratedValue::Float(value)) => {
            values.push_bind(*value);
        }
        Some(GeneratedValue::Text(value)) => {
            values.push_bind(value.clone());
        }
        Some(GeneratedValue::Bytes(value)) => {
            values.push_bind(value.clone());
        }
        Some(GeneratedValue::Date(value)) => {
            values.push_bind(*value);
        }
        Some(GeneratedValue::Time(value)) => {
            values.push_bind(*value);
        }
        Some(GeneratedValue::Timestamp(value)) => {
            values.push_bind(*value);
        }
        Some(GeneratedValue::TimestampTz(value)) => {
            values.push_bind(value.with_timezone(&Utc));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_with_backticks() {
        assert_eq!(quote_ident("order"), "`order`");
        assert_eq!(quote_ident("we`ird"), "`we``ird`");
        assert_eq!(qualified_name(&TableRef::qualified("shop", "users")), "`shop`.`users`");
    }

    #[test]
    fn chunks_respect_placeholder_cap() {
        assert_eq!(rows_per_statement(1), MAX_BIND_PARAMS);
        assert_eq!(rows_per_statement(4), 16_383);
        assert!(rows_per_statement(4) * 4 <= MAX_BIND_PARAMS);
        assert_eq!(rows_per_statement(100_000), 1);
        assert_eq!(rows_per_statement(0), MAX_BIND_PARAMS);
    }
}
