use rusqlite::types::{Value as SqliteValue, ValueRef};
use rust_decimal::prelude::ToPrimitive;
use std::str;
use trove_core::{Error, Result, Value};

/// Read a cell, sqlite only hands back its storage classes.
pub(crate) fn extract_value(value: ValueRef<'_>) -> Result<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Int64(Some(v)),
        ValueRef::Real(v) => Value::Float64(Some(v)),
        ValueRef::Text(v) => Value::Varchar(Some(
            str::from_utf8(v)
                .map_err(|e| Error::new(e).context("A text column is not valid UTF-8"))?
                .to_string(),
        )),
        ValueRef::Blob(v) => Value::Blob(Some(v.into())),
    })
}

/// Value bound to a placeholder: temporal values and uuids as canonical text,
/// decimals as reals.
pub(crate) fn bind_value(value: &Value) -> SqliteValue {
    match value {
        _ if value.is_null() => SqliteValue::Null,
        Value::Boolean(Some(v)) => SqliteValue::Integer(*v as i64),
        Value::Int32(Some(v)) => SqliteValue::Integer(*v as i64),
        Value::Int64(Some(v)) => SqliteValue::Integer(*v),
        Value::Float64(Some(v)) => SqliteValue::Real(*v),
        Value::Decimal(Some(v)) => v.to_f64().map_or(SqliteValue::Null, SqliteValue::Real),
        Value::Varchar(Some(v)) => SqliteValue::Text(v.clone()),
        Value::Blob(Some(v)) => SqliteValue::Blob(v.to_vec()),
        _ => value
            .to_canonical_string()
            .map_or(SqliteValue::Null, SqliteValue::Text),
    }
}
