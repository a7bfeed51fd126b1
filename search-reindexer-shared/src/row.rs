//! Rows produced by the relational store.

use std::sync::Arc;

use crate::value::FieldValue;

/// An immutable tuple of values keyed by the projecting query's field list.
///
/// The field list is shared between every row of a result set, so cloning a
/// row only copies its values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    fields: Arc<[String]>,
    values: Vec<FieldValue>,
}

impl Row {
    /// Create a row. `values` must line up with `fields` position by position.
    pub fn new(fields: Arc<[String]>, values: Vec<FieldValue>) -> Self {
        debug_assert_eq!(fields.len(), values.len(), "row arity mismatch");
        Self { fields, values }
    }

    /// Look a value up by field name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .position(|field| field == name)
            .and_then(|index| self.values.get(index))
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    /// Iterate over `(field, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Arc<[String]> {
        Arc::from(vec!["id".to_string(), "identifier".to_string()])
    }

    #[test]
    fn test_get_by_name() {
        let row = Row::new(fields(), vec![FieldValue::Int(1), FieldValue::from("abc")]);

        assert_eq!(row.get("id"), Some(&FieldValue::Int(1)));
        assert_eq!(row.get("identifier"), Some(&FieldValue::from("abc")));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn test_iter_preserves_column_order() {
        let row = Row::new(fields(), vec![FieldValue::Int(1), FieldValue::Null]);
        let names: Vec<&str> = row.iter().map(|(name, _)| name).collect();

        assert_eq!(names, vec!["id", "identifier"]);
        assert_eq!(row.len(), 2);
    }
}
