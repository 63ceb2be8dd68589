//! Parameterized INSERT/UPDATE statement construction.
//!
//! Identifiers pass through `quote_identifier`, which leaves ordinary
//! lowercase names verbatim and quotes only names that need it.

use pg_escape::quote_identifier;

use crate::bind::SqlParam;

/// Schema-qualify and quote a table name.
pub fn qualified_table(namespace: &str, table: &str) -> String {
    format!("{}.{}", quote_identifier(namespace), quote_identifier(table))
}

/// Placeholder for parameter `n` (1-based), cast when the bound wire
/// type cannot target the column type directly.
fn placeholder(n: usize, param: &SqlParam) -> String {
    match param.cast() {
        Some(cast) => format!("${n}::{cast}"),
        None => format!("${n}"),
    }
}

/// `INSERT INTO <table> (<columns>) VALUES ($1, ...)` over exactly the
/// given columns, one placeholder per parameter.
pub fn build_insert(table: &str, columns: &[&str], params: &[SqlParam]) -> String {
    let cols = columns
        .iter()
        .map(|c| quote_identifier(c).into_owned())
        .collect::<Vec<_>>()
        .join(", ");
    let values = params
        .iter()
        .enumerate()
        .map(|(i, p)| placeholder(i + 1, p))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {table} ({cols}) VALUES ({values})")
}

/// `UPDATE <table> SET <col> = $n, ... WHERE <key> = $last`.
///
/// Column parameters occupy `$1..$n` in column order; the key value is
/// bound as the final parameter by the caller.
pub fn build_update(
    table: &str,
    columns: &[&str],
    params: &[SqlParam],
    key_column: &str,
    key_param: &SqlParam,
) -> String {
    let sets = columns
        .iter()
        .zip(params)
        .enumerate()
        .map(|(i, (column, param))| {
            format!("{} = {}", quote_identifier(column), placeholder(i + 1, param))
        })
        .collect::<Vec<_>>()
        .join(", ");
    let where_clause = format!(
        "{} = {}",
        quote_identifier(key_column),
        placeholder(columns.len() + 1, key_param)
    );
    format!("UPDATE {table} SET {sets} WHERE {where_clause}")
}
