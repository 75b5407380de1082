//! Publication management.
//!
//! Creates, drops, inspects and repopulates native Postgres publications.

use pubsync_core::{SyncError, SyncResult, TableId, TableSet};
use tokio_postgres::Client;
use tracing::{debug, info};

use crate::error::{publication_error, query_error};

/// Quote an identifier for use in SQL (double quotes).
pub fn quote_ident(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Quote a table as "schema"."table".
pub fn quote_table(table: &TableId) -> String {
    format!("{}.{}", quote_ident(table.schema()), quote_ident(table.name()))
}

fn quote_tables(tables: &TableSet) -> String {
    tables.iter().map(quote_table).collect::<Vec<_>>().join(", ")
}

/// `ALTER PUBLICATION ... SET TABLE ...` for a non-empty table set.
pub fn set_tables_sql(publication_name: &str, tables: &TableSet) -> String {
    format!(
        "ALTER PUBLICATION {} SET TABLE {}",
        quote_ident(publication_name),
        quote_tables(tables)
    )
}

/// `ALTER PUBLICATION ... DROP TABLE ...` for a non-empty table set.
pub fn drop_tables_sql(publication_name: &str, tables: &TableSet) -> String {
    format!(
        "ALTER PUBLICATION {} DROP TABLE {}",
        quote_ident(publication_name),
        quote_tables(tables)
    )
}

/// Check if a publication exists.
pub async fn publication_exists(client: &Client, publication_name: &str) -> SyncResult<bool> {
    let exists: bool = client
        .query_one(
            "SELECT EXISTS(SELECT 1 FROM pg_publication WHERE pubname = $1)",
            &[&publication_name],
        )
        .await
        .map_err(query_error)?
        .get(0);

    Ok(exists)
}

/// Get the tables in a publication. A missing publication has no tables.
pub async fn get_publication_tables(
    client: &Client,
    publication_name: &str,
) -> SyncResult<TableSet> {
    let rows = client
        .query(
            r#"
            SELECT schemaname, tablename
            FROM pg_publication_tables
            WHERE pubname = $1
            "#,
            &[&publication_name],
        )
        .await
        .map_err(query_error)?;

    let tables: TableSet = rows
        .iter()
        .map(|r| {
            let schema: String = r.get(0);
            let table: String = r.get(1);
            TableId::new(schema, table)
        })
        .collect();

    Ok(tables)
}

/// Create an empty publication.
pub async fn create_publication(client: &Client, publication_name: &str) -> SyncResult<()> {
    info!(publication = %publication_name, "Creating publication");
    client
        .execute(
            &format!("CREATE PUBLICATION {}", quote_ident(publication_name)),
            &[],
        )
        .await
        .map_err(|e| publication_error(e, publication_name))?;

    Ok(())
}

/// Drop a publication. Fails with `NotFound` if it doesn't exist.
pub async fn drop_publication(client: &Client, publication_name: &str) -> SyncResult<()> {
    info!(publication = %publication_name, "Dropping publication");
    client
        .execute(
            &format!("DROP PUBLICATION {}", quote_ident(publication_name)),
            &[],
        )
        .await
        .map_err(|e| publication_error(e, publication_name))?;

    Ok(())
}

/// Replace a publication's tables with exactly `tables`.
///
/// Each path is a single statement, so membership changes all at once or
/// not at all.
pub async fn set_publication_tables(
    client: &Client,
    publication_name: &str,
    tables: &TableSet,
) -> SyncResult<()> {
    if tables.is_empty() {
        return clear_publication_tables(client, publication_name).await;
    }

    info!(
        publication = %publication_name,
        tables = tables.len(),
        "Setting publication tables"
    );

    client
        .execute(&set_tables_sql(publication_name, tables), &[])
        .await
        .map_err(|e| publication_error(e, publication_name))?;

    Ok(())
}

/// `SET TABLE` needs at least one table, so emptying drops the current ones.
async fn clear_publication_tables(client: &Client, publication_name: &str) -> SyncResult<()> {
    if !publication_exists(client, publication_name).await? {
        return Err(SyncError::NotFound(publication_name.to_string()));
    }

    let current = get_publication_tables(client, publication_name).await?;
    if current.is_empty() {
        debug!(publication = %publication_name, "Publication already empty");
        return Ok(());
    }

    info!(
        publication = %publication_name,
        tables = current.len(),
        "Removing all tables from publication"
    );

    client
        .execute(&drop_tables_sql(publication_name, &current), &[])
        .await
        .map_err(|e| publication_error(e, publication_name))?;

    Ok(())
}
