//! Record write path: insert, then update on a primary-key conflict.
//!
//! No pre-write existence probe: the table's own uniqueness constraint
//! is the conflict detector. Exactly one statement per record, plus
//! the update retry when the insert reports a duplicate key; the two
//! are not wrapped in a transaction.

use postgres::types::ToSql;
use postgres::Client;
use tracing::debug;

use crate::bind::{bind_by_value, bind_value, SqlParam};
use crate::error::{classify_insert_error, Result, TargetError};
use crate::protocol::DataRecord;
use crate::sql;
use crate::target::StreamState;
use crate::type_map::column_type;

/// How a record landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Inserted,
    Updated,
}

/// Write one record against the bound stream, using exactly the
/// columns present in the record payload.
pub fn write_record(
    client: &mut Client,
    namespace: &str,
    state: &StreamState,
    record: &DataRecord,
) -> Result<WriteOutcome> {
    let table = sql::qualified_table(namespace, state.table());
    let columns: Vec<&str> = record.keys().map(String::as_str).collect();
    let params = bind_record(state, record)?;

    match try_insert(client, &table, &columns, &params) {
        Ok(()) => Ok(WriteOutcome::Inserted),
        Err(TargetError::UniqueViolation { .. }) => {
            debug!(table = state.table(), "insert conflicted, retrying as update");
            update_existing(client, &table, &columns, &params, state, record)?;
            Ok(WriteOutcome::Updated)
        }
        Err(other) => Err(other),
    }
}

/// Bind every record value per its declared column type; columns the
/// schema does not declare are bound by JSON value kind.
fn bind_record(state: &StreamState, record: &DataRecord) -> Result<Vec<SqlParam>> {
    record
        .iter()
        .map(|(column, value)| match state.descriptor(column) {
            Some(descriptor) => {
                let declared = column_type(descriptor, column == state.key_column())?;
                bind_value(column, value, &declared.pg_type)
            }
            None => Ok(bind_by_value(value)),
        })
        .collect()
}

fn try_insert(
    client: &mut Client,
    table: &str,
    columns: &[&str],
    params: &[SqlParam],
) -> Result<()> {
    let statement = sql::build_insert(table, columns, params);
    let args: Vec<&(dyn ToSql + Sync)> = params.iter().map(SqlParam::as_sql).collect();
    client
        .execute(statement.as_str(), &args)
        .map_err(|e| classify_insert_error(table, &e))?;
    Ok(())
}

/// Conflict fallback: update the same columns, filtered on the
/// primary-key column's value from the record.
fn update_existing(
    client: &mut Client,
    table: &str,
    columns: &[&str],
    params: &[SqlParam],
    state: &StreamState,
    record: &DataRecord,
) -> Result<()> {
    let key_column = state.key_column();
    let key_value = record.get(key_column).ok_or_else(|| {
        TargetError::InvalidInput(format!(
            "record carries no value for key column '{key_column}', cannot resolve the conflict"
        ))
    })?;
    let key_param = match state.descriptor(key_column) {
        Some(descriptor) => {
            let declared = column_type(descriptor, true)?;
            bind_value(key_column, key_value, &declared.pg_type)?
        }
        None => bind_by_value(key_value),
    };

    let statement = sql::build_update(table, columns, params, key_column, &key_param);
    let mut args: Vec<&(dyn ToSql + Sync)> = params.iter().map(SqlParam::as_sql).collect();
    args.push(key_param.as_sql());
    client
        .execute(statement.as_str(), &args)
        .map_err(|e| TargetError::store(format!("update {table}"), &e))?;
    Ok(())
}
