use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use search_reindexer_shared::{FieldValue, Row};
use tokio_postgres::types::Type;
use uuid::Uuid;

use crate::errors::StoreError;

/// Convert a driver row into a [`Row`] keyed by the query's field list.
pub(crate) fn convert_row(
    row: &tokio_postgres::Row,
    fields: &Arc<[String]>,
) -> Result<Row, StoreError> {
    if row.len() != fields.len() {
        return Err(StoreError::ColumnMismatch {
            expected: fields.len(),
            actual: row.len(),
        });
    }

    let values = (0..row.len())
        .map(|idx| convert_value(row, idx))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Row::new(fields.clone(), values))
}

fn convert_value(row: &tokio_postgres::Row, idx: usize) -> Result<FieldValue, StoreError> {
    let column = &row.columns()[idx];
    let ty = column.type_();

    let value = match *ty {
        Type::BOOL => row.try_get::<_, Option<bool>>(idx)?.map(FieldValue::Bool),
        Type::INT2 => row
            .try_get::<_, Option<i16>>(idx)?
            .map(|v| FieldValue::Int(v as i64)),
        Type::INT4 => row
            .try_get::<_, Option<i32>>(idx)?
            .map(|v| FieldValue::Int(v as i64)),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.map(FieldValue::Int),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(idx)?
            .map(|v| FieldValue::Float(v as f64)),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.map(FieldValue::Float),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            row.try_get::<_, Option<String>>(idx)?.map(FieldValue::Text)
        }
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map(FieldValue::Timestamp),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)?
            .map(|v| FieldValue::Timestamp(v.and_utc())),
        Type::UUID => row.try_get::<_, Option<Uuid>>(idx)?.map(FieldValue::Uuid),
        Type::JSON | Type::JSONB => row
            .try_get::<_, Option<serde_json::Value>>(idx)?
            .map(FieldValue::Json),
        Type::TEXT_ARRAY | Type::VARCHAR_ARRAY => row
            .try_get::<_, Option<Vec<Option<String>>>>(idx)?
            .map(|items| FieldValue::TextArray(items.into_iter().flatten().collect())),
        _ => {
            return Err(StoreError::UnsupportedType {
                column: column.name().to_string(),
                type_name: ty.name().to_string(),
            })
        }
    };

    Ok(value.unwrap_or(FieldValue::Null))
}
