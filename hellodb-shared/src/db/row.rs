/// Row maps and parameter binding
///
/// Query results are handed out as [`Row`]: a map from column name to JSON
/// value that keeps the column order of the result set. Parameters are passed
/// in as JSON values and bound positionally.

use super::DbError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{
    mysql::{MySql, MySqlArguments, MySqlRow},
    query::Query,
    Column, Decode, Row as _, Type, TypeInfo,
};

/// One result row, keyed by column name in select order
pub type Row = serde_json::Map<String, JsonValue>;

/// Converts a driver row into a [`Row`]
///
/// # Errors
///
/// Returns `DbError::Decode` if a column holds a value of its declared type
/// that cannot be read.
pub fn row_to_map(row: &MySqlRow) -> Result<Row, DbError> {
    let mut map = Row::with_capacity(row.len());

    for (idx, column) in row.columns().iter().enumerate() {
        let type_name = column.type_info().name();
        let value = decode_column(row, idx, type_name).map_err(|source| DbError::Decode {
            column: column.name().to_string(),
            type_name: type_name.to_string(),
            source,
        })?;
        map.insert(column.name().to_string(), value);
    }

    Ok(map)
}

fn decode_column(row: &MySqlRow, idx: usize, type_name: &str) -> Result<JsonValue, sqlx::Error> {
    match type_name {
        "NULL" => Ok(JsonValue::Null),
        "BOOLEAN" => checked::<bool>(row, idx),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => checked::<i64>(row, idx),
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => checked::<u64>(row, idx),
        "YEAR" => unchecked::<u16>(row, idx),
        "FLOAT" => checked::<f32>(row, idx),
        "DOUBLE" => checked::<f64>(row, idx),
        "JSON" => Ok(row.try_get::<Option<JsonValue>, _>(idx)?.unwrap_or(JsonValue::Null)),
        "DATETIME" => formatted(row.try_get::<Option<NaiveDateTime>, _>(idx)?),
        "TIMESTAMP" => formatted(
            row.try_get::<Option<DateTime<Utc>>, _>(idx)?
                .map(|ts| ts.naive_utc()),
        ),
        "DATE" => formatted(row.try_get::<Option<NaiveDate>, _>(idx)?),
        "TIME" => formatted(row.try_get::<Option<NaiveTime>, _>(idx)?),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT"
        | "GEOMETRY" => Ok(row
            .try_get_unchecked::<Option<Vec<u8>>, _>(idx)?
            .map(|bytes| JsonValue::String(String::from_utf8_lossy(&bytes).into_owned()))
            .unwrap_or(JsonValue::Null)),
        // Text columns, DECIMAL, ENUM and SET all arrive as strings.
        _ => unchecked::<String>(row, idx),
    }
}

fn checked<'r, T>(row: &'r MySqlRow, idx: usize) -> Result<JsonValue, sqlx::Error>
where
    T: Decode<'r, MySql> + Type<MySql> + Into<JsonValue>,
{
    Ok(row
        .try_get::<Option<T>, _>(idx)?
        .map(Into::into)
        .unwrap_or(JsonValue::Null))
}

fn unchecked<'r, T>(row: &'r MySqlRow, idx: usize) -> Result<JsonValue, sqlx::Error>
where
    T: Decode<'r, MySql> + Type<MySql> + Into<JsonValue>,
{
    Ok(row
        .try_get_unchecked::<Option<T>, _>(idx)?
        .map(Into::into)
        .unwrap_or(JsonValue::Null))
}

fn formatted<T: ToString>(value: Option<T>) -> Result<JsonValue, sqlx::Error> {
    Ok(value
        .map(|v| JsonValue::String(v.to_string()))
        .unwrap_or(JsonValue::Null))
}

/// Binds `params` to `query` in order
///
/// Integers bind as `BIGINT`, other numbers as `DOUBLE`, strings as text,
/// `null` as SQL `NULL`. Arrays and objects bind as their JSON text.
pub fn bind_params<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &'q [JsonValue],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            JsonValue::Null => query.bind(None::<String>),
            JsonValue::Bool(b) => query.bind(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    query.bind(i)
                } else if let Some(u) = n.as_u64() {
                    query.bind(u)
                } else {
                    query.bind(n.as_f64())
                }
            }
            JsonValue::String(s) => query.bind(s.as_str()),
            other => query.bind(other.to_string()),
        };
    }
    query
}

/// Reads a column as display text
///
/// Strings are returned as-is, `null` and missing columns as `None`, anything
/// else in its JSON form.
pub fn text(row: &Row, column: &str) -> Option<String> {
    match row.get(column)? {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
