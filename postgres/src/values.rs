//! Conversions between [`Primitive`] parameters, PostgreSQL values and JSON rows.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use dynlist_types::{Primitive, Row};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Postgres, Row as _, TypeInfo};
use uuid::Uuid;

/// Binds one parameter with the PostgreSQL type its variant maps to.
///
/// Values compared against numeric or temporal columns are cast in the SQL
/// text, so text and integer bindings are enough here.
pub(crate) fn bind<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &Primitive,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        Primitive::Null => query.bind(None::<String>),
        Primitive::Bool(b) => query.bind(*b),
        Primitive::Int(i) => query.bind(*i),
        Primitive::Float(f) => query.bind(*f),
        Primitive::Text(s) => query.bind(s.clone()),
    }
}

/// Converts a result row to JSON, keyed by column name.
///
/// `NUMERIC` values become decimal strings so no precision is lost; dates and
/// timestamps become ISO-8601 strings.
pub fn decode_row(row: &PgRow) -> Result<Row, sqlx::Error> {
    let mut values = Row::new();
    for column in row.columns() {
        let value = decode_value(row, column.ordinal(), column.type_info().name())?;
        values.insert(column.name().to_owned(), value);
    }
    Ok(values)
}

fn decode_value(row: &PgRow, index: usize, type_name: &str) -> Result<Value, sqlx::Error> {
    let value = match type_name {
        "BOOL" => row.try_get::<Option<bool>, _>(index)?.map(Value::Bool),
        "INT2" => row.try_get::<Option<i16>, _>(index)?.map(Value::from),
        "INT4" => row.try_get::<Option<i32>, _>(index)?.map(Value::from),
        "INT8" => row.try_get::<Option<i64>, _>(index)?.map(Value::from),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(index)?
            .map(|f| float(index, f64::from(f)))
            .transpose()?,
        "FLOAT8" => row
            .try_get::<Option<f64>, _>(index)?
            .map(|f| float(index, f))
            .transpose()?,
        "NUMERIC" => row
            .try_get::<Option<Decimal>, _>(index)?
            .map(|d| Value::String(d.normalize().to_string())),
        "UUID" => row
            .try_get::<Option<Uuid>, _>(index)?
            .map(|u| Value::String(u.to_string())),
        "DATE" => row
            .try_get::<Option<NaiveDate>, _>(index)?
            .map(|d| Value::String(d.to_string())),
        "TIME" => row
            .try_get::<Option<NaiveTime>, _>(index)?
            .map(|t| Value::String(t.to_string())),
        "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(index)?
            .map(|t| Value::String(t.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(index)?
            .map(|t| Value::String(t.to_rfc3339())),
        "JSON" | "JSONB" => row.try_get::<Option<Value>, _>(index)?,
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CHAR" => {
            row.try_get::<Option<String>, _>(index)?.map(Value::String)
        }
        // Enums and other text-like user types arrive as their label.
        _ => row
            .try_get_unchecked::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String),
    };
    Ok(value.unwrap_or(Value::Null))
}

/// JSON has no `Infinity` or `NaN`; such values fail the row instead of
/// turning into a null that a cursor would then page past.
fn float(index: usize, f: f64) -> Result<Value, sqlx::Error> {
    serde_json::Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| sqlx::Error::ColumnDecode {
            index: index.to_string(),
            source: format!("non-finite float {f} cannot be represented").into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_float_decodes() {
        assert_eq!(float(0, 1.5).unwrap(), serde_json::json!(1.5));
    }

    #[test]
    fn test_non_finite_float_is_an_error() {
        for f in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let err = float(3, f).unwrap_err();
            assert!(matches!(err, sqlx::Error::ColumnDecode { ref index, .. } if index == "3"));
        }
    }
}
