//! Row to document transformation.

use crate::errors::PipelineError;
use search_reindexer_shared::{Document, Row};

/// Maps one row to one search document. Implementations do no I/O.
pub trait DocumentTransformer: Send + Sync {
    fn transform(&self, row: &Row) -> Result<Document, PipelineError>;
}

impl<F> DocumentTransformer for F
where
    F: Fn(&Row) -> Result<Document, PipelineError> + Send + Sync,
{
    fn transform(&self, row: &Row) -> Result<Document, PipelineError> {
        self(row)
    }
}

/// Copies every projected column into the document body.
///
/// The document key comes from `id_column`, which must hold a non-empty
/// text, integer or uuid value. Columns listed through
/// [`ColumnTransformer::skip_column`] are left out of the body.
#[derive(Debug, Clone)]
pub struct ColumnTransformer {
    index: String,
    id_column: String,
    skip: Vec<String>,
}

impl ColumnTransformer {
    pub fn new(index: impl Into<String>, id_column: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            id_column: id_column.into(),
            skip: Vec::new(),
        }
    }

    pub fn skip_column(mut self, column: impl Into<String>) -> Self {
        self.skip.push(column.into());
        self
    }
}

impl DocumentTransformer for ColumnTransformer {
    fn transform(&self, row: &Row) -> Result<Document, PipelineError> {
        let id = row
            .get(&self.id_column)
            .and_then(|value| value.as_identifier())
            .ok_or_else(|| {
                PipelineError::transform(format!(
                    "row has no usable `{}` value",
                    self.id_column
                ))
            })?;

        let mut document = Document::new(id, self.index.clone());
        for (name, value) in row.iter() {
            if self.skip.iter().any(|skipped| skipped == name) {
                continue;
            }
            document.insert(name, value.to_json());
        }

        Ok(document)
    }
}
