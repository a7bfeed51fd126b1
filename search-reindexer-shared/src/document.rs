//! Backend-ready search documents.

use serde::Serialize;
use serde_json::{Map, Value};

/// The indexed representation of one source row.
///
/// `id` becomes the search engine's document key, so reindexing the same row
/// twice overwrites rather than duplicates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Document key in the search engine.
    pub id: String,
    /// Target index (or alias) name.
    pub index: String,
    /// Field values of the document body.
    pub source: Map<String, Value>,
}

impl Document {
    /// Create an empty document for the given key and index.
    pub fn new(id: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            index: index.into(),
            source: Map::new(),
        }
    }

    /// Set a body field.
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.source.insert(name.into(), value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.source.insert(name.into(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_builder() {
        let doc = Document::new("abc", "openledger")
            .with_field("title", json!("Sunset"))
            .with_field("tags", json!(["sky"]));

        assert_eq!(doc.id, "abc");
        assert_eq!(doc.index, "openledger");
        assert_eq!(doc.source["title"], "Sunset");
        assert_eq!(doc.source.len(), 2);
    }
}
