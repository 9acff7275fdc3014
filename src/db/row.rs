//! Lenient column readers. SQLite hands aggregates back as INTEGER, REAL or
//! NULL depending on the stored values, so reports read through these
//! instead of `Row::get`.

use libsql::{Row, Value};

use crate::error::{AppError, AppResult};

fn not_numeric(idx: i32, value: &Value) -> AppError {
    AppError::Internal(format!("column {idx} is not numeric: {value:?}"))
}

/// NULL reads as zero; text must parse as a number.
pub fn get_f64(row: &Row, idx: i32) -> AppResult<f64> {
    match row.get_value(idx)? {
        Value::Integer(i) => Ok(i as f64),
        Value::Real(f) => Ok(f),
        Value::Null => Ok(0.0),
        Value::Text(s) => match s.trim().parse() {
            Ok(f) => Ok(f),
            Err(_) => Err(not_numeric(idx, &Value::Text(s))),
        },
        blob => Err(not_numeric(idx, &blob)),
    }
}

pub fn get_i64(row: &Row, idx: i32) -> AppResult<i64> {
    match row.get_value(idx)? {
        Value::Integer(i) => Ok(i),
        Value::Real(f) => Ok(f.round() as i64),
        Value::Null => Ok(0),
        Value::Text(s) => match s.trim().parse() {
            Ok(i) => Ok(i),
            Err(_) => Err(not_numeric(idx, &Value::Text(s))),
        },
        blob => Err(not_numeric(idx, &blob)),
    }
}

pub fn get_opt_string(row: &Row, idx: i32) -> AppResult<Option<String>> {
    Ok(match row.get_value(idx)? {
        Value::Text(s) => Some(s),
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Null | Value::Blob(_) => None,
    })
}

pub fn get_string(row: &Row, idx: i32) -> AppResult<String> {
    Ok(get_opt_string(row, idx)?.unwrap_or_default())
}
