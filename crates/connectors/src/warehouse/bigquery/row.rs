//! Decodes `{schema, rows: [{f: [{v}]}]}` into [`RowData`].

use crate::warehouse::{
    base::error::WarehouseError,
    bigquery::wire::{FieldSchema, TableSchema, WireRow},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use model::{
    core::{
        data_type::DataType,
        value::{FieldValue, Value},
    },
    records::row::RowData,
};
use serde_json::Value as JsonValue;

pub fn decode_rows(schema: &TableSchema, rows: &[WireRow]) -> Result<Vec<RowData>, WarehouseError> {
    rows.iter().map(|row| decode_row(&schema.fields, row)).collect()
}

fn decode_row(fields: &[FieldSchema], row: &WireRow) -> Result<RowData, WarehouseError> {
    if row.f.len() != fields.len() {
        return Err(WarehouseError::Decode(format!(
            "row has {} cells but schema has {} fields",
            row.f.len(),
            fields.len()
        )));
    }

    let field_values = fields
        .iter()
        .zip(&row.f)
        .map(|(field, cell)| {
            decode_cell(field, &cell.v).map(|value| FieldValue {
                name: field.name.clone(),
                value,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RowData::new(field_values))
}

fn decode_cell(field: &FieldSchema, raw: &JsonValue) -> Result<Value, WarehouseError> {
    let text = match raw {
        JsonValue::Null => return Ok(Value::Null),
        JsonValue::String(s) => s.as_str(),
        // Nested and repeated cells are kept as their JSON text
        other => return Ok(Value::String(other.to_string())),
    };

    let invalid = || {
        WarehouseError::Decode(format!(
            "invalid {} value '{text}' in column '{}'",
            field.field_type, field.name
        ))
    };

    let value = match DataType::from_bigquery_type(&field.field_type) {
        DataType::Int64 => Value::Int(text.parse().map_err(|_| invalid())?),
        DataType::Float64 => Value::Float(text.parse().map_err(|_| invalid())?),
        DataType::Boolean => match text.to_ascii_lowercase().as_str() {
            "true" => Value::Boolean(true),
            "false" => Value::Boolean(false),
            _ => return Err(invalid()),
        },
        DataType::Date => {
            Value::Date(NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| invalid())?)
        }
        DataType::Timestamp => Value::Timestamp(parse_timestamp(text).ok_or_else(invalid)?),
        DataType::String => Value::String(text.to_string()),
    };

    Ok(value)
}

/// TIMESTAMP cells arrive as epoch seconds (`"1.7426016E9"`), DATETIME cells
/// as civil time without offset.
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(seconds) = text.parse::<f64>() {
        let micros = (seconds * 1_000_000.0).round() as i64;
        return DateTime::from_timestamp_micros(micros);
    }

    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|dt| dt.and_utc())
}
