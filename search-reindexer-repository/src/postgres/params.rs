use search_reindexer_shared::FieldValue;
use tokio_postgres::types::ToSql;

/// Owned query parameters converted from field values.
pub(crate) struct PgParams {
    values: Vec<Box<dyn ToSql + Sync + Send>>,
}

impl PgParams {
    pub(crate) fn from_values(values: &[FieldValue]) -> Self {
        let values = values
            .iter()
            .map(|value| -> Box<dyn ToSql + Sync + Send> {
                match value {
                    FieldValue::Null => Box::new(None::<String>),
                    FieldValue::Bool(v) => Box::new(*v),
                    FieldValue::Int(v) => Box::new(*v),
                    FieldValue::Float(v) => Box::new(*v),
                    FieldValue::Text(v) => Box::new(v.clone()),
                    FieldValue::Timestamp(v) => Box::new(*v),
                    FieldValue::Uuid(v) => Box::new(*v),
                    FieldValue::Json(v) => Box::new(v.clone()),
                    FieldValue::TextArray(v) => Box::new(v.clone()),
                }
            })
            .collect();

        Self { values }
    }

    pub(crate) fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values
            .iter()
            .map(|value| value.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }
}
