//! JSON record values → typed statement parameters.
//!
//! The extended query protocol types every parameter, so each value is
//! converted according to its column's declared type before execution;
//! a JSON `null` binds as a SQL NULL of that same type.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use postgres::types::ToSql;
use serde_json::Value;

use crate::error::{Result, TargetError};
use crate::type_map::PgType;

/// One bound statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Bool(Option<bool>),
    Int(Option<i32>),
    BigInt(Option<i64>),
    Float(Option<f64>),
    Text(Option<String>),
    Timestamp(Option<NaiveDateTime>),
    Date(Option<NaiveDate>),
    Time(Option<NaiveTime>),
    Jsonb(Option<Value>),
}

impl SqlParam {
    /// Borrow as a statement parameter.
    pub fn as_sql(&self) -> &(dyn ToSql + Sync) {
        match self {
            SqlParam::Bool(v) => v,
            SqlParam::Int(v) => v,
            SqlParam::BigInt(v) => v,
            SqlParam::Float(v) => v,
            SqlParam::Text(v) => v,
            SqlParam::Timestamp(v) => v,
            SqlParam::Date(v) => v,
            SqlParam::Time(v) => v,
            SqlParam::Jsonb(v) => v,
        }
    }

    /// Explicit cast to append to this parameter's placeholder, for
    /// wire types that cannot target their column type directly (the
    /// server accepts float8 → decimal and int8 → integer only through
    /// an assignment cast).
    pub fn cast(&self) -> Option<&'static str> {
        match self {
            SqlParam::Float(_) => Some("float8"),
            SqlParam::BigInt(_) => Some("int8"),
            _ => None,
        }
    }
}

/// Convert one record value into a parameter for its declared column.
pub fn bind_value(column: &str, value: &Value, pg_type: &PgType) -> Result<SqlParam> {
    match pg_type {
        PgType::Boolean => match value {
            Value::Null => Ok(SqlParam::Bool(None)),
            Value::Bool(b) => Ok(SqlParam::Bool(Some(*b))),
            other => Err(mismatch(column, "boolean", other)),
        },
        PgType::Integer | PgType::Serial => match value {
            Value::Null => Ok(SqlParam::Int(None)),
            Value::Number(n) => {
                let wide = n
                    .as_i64()
                    .ok_or_else(|| mismatch(column, "integer", value))?;
                let narrow = i32::try_from(wide).map_err(|_| {
                    TargetError::InvalidInput(format!(
                        "column '{column}': integer {wide} out of range"
                    ))
                })?;
                Ok(SqlParam::Int(Some(narrow)))
            }
            other => Err(mismatch(column, "integer", other)),
        },
        PgType::Decimal => match value {
            Value::Null => Ok(SqlParam::Float(None)),
            Value::Number(n) => Ok(SqlParam::Float(n.as_f64())),
            other => Err(mismatch(column, "number", other)),
        },
        PgType::Varchar(_) | PgType::Text => match value {
            Value::Null => Ok(SqlParam::Text(None)),
            Value::String(s) => Ok(SqlParam::Text(Some(s.clone()))),
            other => Err(mismatch(column, "string", other)),
        },
        PgType::Timestamp => match value {
            Value::Null => Ok(SqlParam::Timestamp(None)),
            Value::String(s) => parse_timestamp(s)
                .map(|t| SqlParam::Timestamp(Some(t)))
                .ok_or_else(|| bad_temporal(column, "timestamp", s)),
            other => Err(mismatch(column, "date-time string", other)),
        },
        PgType::Date => match value {
            Value::Null => Ok(SqlParam::Date(None)),
            Value::String(s) => s
                .parse::<NaiveDate>()
                .map(|d| SqlParam::Date(Some(d)))
                .map_err(|_| bad_temporal(column, "date", s)),
            other => Err(mismatch(column, "date string", other)),
        },
        PgType::Time => match value {
            Value::Null => Ok(SqlParam::Time(None)),
            Value::String(s) => s
                .parse::<NaiveTime>()
                .map(|t| SqlParam::Time(Some(t)))
                .map_err(|_| bad_temporal(column, "time", s)),
            other => Err(mismatch(column, "time string", other)),
        },
        PgType::Jsonb => match value {
            Value::Null => Ok(SqlParam::Jsonb(None)),
            other => Ok(SqlParam::Jsonb(Some(other.clone()))),
        },
    }
}

/// Bind a value for a column the bound schema does not declare: infer
/// a wire type from the JSON value kind and let the server decide
/// whether the column can take it.
pub fn bind_by_value(value: &Value) -> SqlParam {
    match value {
        Value::Null => SqlParam::Text(None),
        Value::Bool(b) => SqlParam::Bool(Some(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlParam::BigInt(Some(i)),
            None => SqlParam::Float(n.as_f64()),
        },
        Value::String(s) => SqlParam::Text(Some(s.clone())),
        Value::Array(_) | Value::Object(_) => SqlParam::Jsonb(Some(value.clone())),
    }
}

/// Accepts RFC 3339 (`2023-01-02T03:04:05Z`, offset forms) and bare
/// ISO timestamps with either `T` or space separators.
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = s.parse::<NaiveDateTime>() {
        return Some(dt);
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok()
}

fn mismatch(column: &str, expected: &str, got: &Value) -> TargetError {
    let kind = match got {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    TargetError::InvalidInput(format!(
        "column '{column}': expected {expected}, got {kind}"
    ))
}

fn bad_temporal(column: &str, expected: &str, raw: &str) -> TargetError {
    TargetError::InvalidInput(format!(
        "column '{column}': cannot parse '{raw}' as {expected}"
    ))
}
