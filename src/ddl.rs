//! Table provisioning from announced stream schemas.

use pg_escape::quote_identifier;
use postgres::Client;
use tracing::{debug, info};

use crate::error::{Result, TargetError};
use crate::protocol::StreamSchema;
use crate::sql;
use crate::type_map::column_type;

/// Existence probe scoped to base tables in one namespace.
const TABLE_EXISTS: &str = "SELECT EXISTS (
    SELECT FROM information_schema.tables
    WHERE table_schema = $1 AND table_type = 'BASE TABLE' AND table_name = $2
)";

/// Check whether the stream's table already exists.
pub fn table_exists(client: &mut Client, namespace: &str, table: &str) -> Result<bool> {
    let row = client
        .query_one(TABLE_EXISTS, &[&namespace, &table])
        .map_err(|e| TargetError::store("table existence check", &e))?;
    Ok(row.get(0))
}

/// Render the CREATE TABLE statement for a declared stream.
///
/// Columns appear in property announcement order; the first
/// `key_properties` entry becomes the primary key and is promoted to
/// SERIAL when integer-typed.
pub fn create_table_sql(namespace: &str, schema: &StreamSchema) -> Result<String> {
    let key_column = schema.key_column().ok_or_else(|| {
        TargetError::InvalidSchema(format!(
            "stream '{}' declares no key_properties",
            schema.tap_stream_id
        ))
    })?;

    let mut columns = Vec::with_capacity(schema.schema.properties.len());
    for (name, descriptor) in &schema.schema.properties {
        let column = column_type(descriptor, name == key_column)?;
        columns.push(format!("{} {}", quote_identifier(name), column.render()));
    }

    Ok(format!(
        "CREATE TABLE {} ({}, PRIMARY KEY ({}))",
        sql::qualified_table(namespace, &schema.tap_stream_id),
        columns.join(", "),
        quote_identifier(key_column)
    ))
}

/// Make sure the stream's table exists, creating it on first sight.
///
/// Idempotent per stream: an existing table is left untouched, so
/// later schema changes for the same stream are never reconciled.
pub fn ensure_table(client: &mut Client, namespace: &str, schema: &StreamSchema) -> Result<()> {
    if table_exists(client, namespace, &schema.tap_stream_id)? {
        debug!(stream = %schema.tap_stream_id, "table already exists");
        return Ok(());
    }

    // Translate every column before issuing any DDL: an unsupported
    // type must provision nothing.
    let ddl = create_table_sql(namespace, schema)?;

    let create_namespace = format!("CREATE SCHEMA IF NOT EXISTS {}", quote_identifier(namespace));
    client
        .execute(create_namespace.as_str(), &[])
        .map_err(|e| TargetError::store(format!("create schema {namespace}"), &e))?;
    client
        .execute(ddl.as_str(), &[])
        .map_err(|e| TargetError::store(format!("create table {}", schema.tap_stream_id), &e))?;
    info!(stream = %schema.tap_stream_id, namespace, "table created");
    Ok(())
}
