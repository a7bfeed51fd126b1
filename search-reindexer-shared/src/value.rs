//! Scalar column values.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

/// A single scalar value read from (or bound into) a relational query.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    Json(Value),
    TextArray(Vec<String>),
}

impl FieldValue {
    /// Convert the value into its JSON representation for a document body.
    ///
    /// Timestamps are rendered as RFC 3339 strings and non-finite floats as
    /// `null`, since JSON has no encoding for them.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(v) => json!(v),
            FieldValue::Int(v) => json!(v),
            FieldValue::Float(v) => serde_json::Number::from_f64(*v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Text(v) => json!(v),
            FieldValue::Timestamp(v) => json!(v.to_rfc3339()),
            FieldValue::Uuid(v) => json!(v.to_string()),
            FieldValue::Json(v) => v.clone(),
            FieldValue::TextArray(v) => json!(v),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Render the value as a document identifier.
    ///
    /// Only text, integer and UUID values make sensible identifiers.
    pub fn as_identifier(&self) -> Option<String> {
        match self {
            FieldValue::Text(v) if !v.is_empty() => Some(v.clone()),
            FieldValue::Int(v) => Some(v.to_string()),
            FieldValue::Uuid(v) => Some(v.to_string()),
            _ => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_to_json_scalars() {
        assert_eq!(FieldValue::Null.to_json(), Value::Null);
        assert_eq!(FieldValue::Int(42).to_json(), json!(42));
        assert_eq!(FieldValue::Text("cat".into()).to_json(), json!("cat"));
        assert_eq!(
            FieldValue::TextArray(vec!["a".into(), "b".into()]).to_json(),
            json!(["a", "b"])
        );
    }

    #[test]
    fn test_to_json_timestamp_is_rfc3339() {
        let ts = Utc.with_ymd_and_hms(2017, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(
            FieldValue::Timestamp(ts).to_json(),
            json!("2017-03-01T12:00:00+00:00")
        );
    }

    #[test]
    fn test_non_finite_float_is_null() {
        assert_eq!(FieldValue::Float(f64::NAN).to_json(), Value::Null);
        assert_eq!(FieldValue::Float(1.5).to_json(), json!(1.5));
    }

    #[test]
    fn test_as_identifier() {
        assert_eq!(FieldValue::Text("abc".into()).as_identifier(), Some("abc".into()));
        assert_eq!(FieldValue::Int(7).as_identifier(), Some("7".into()));
        assert_eq!(FieldValue::Text(String::new()).as_identifier(), None);
        assert_eq!(FieldValue::Null.as_identifier(), None);
        assert_eq!(FieldValue::Bool(true).as_identifier(), None);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(FieldValue::from(None::<i64>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(3_i64)), FieldValue::Int(3));
    }
}
