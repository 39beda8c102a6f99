//! Attribute records of vector features.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Value of one attribute field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Missing value.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Whole number.
    Integer(i64),
    /// Floating point number.
    Number(f64),
    /// Text.
    Text(String),
}

impl AttributeValue {
    /// Returns true for [`AttributeValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// Converts a JSON value (GeoJSON feature property) into an attribute value. Nested arrays and objects are
    /// stored as their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(v) => Self::Bool(*v),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => n.as_f64().map(Self::Number).unwrap_or(Self::Null),
            },
            serde_json::Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }

    /// Converts the value into JSON.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(v) => serde_json::Value::Bool(*v),
            Self::Integer(v) => serde_json::Value::from(*v),
            Self::Number(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Text(v) => serde_json::Value::String(v.clone()),
        }
    }
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Null => Ok(()),
            AttributeValue::Bool(v) => write!(f, "{v}"),
            AttributeValue::Integer(v) => write!(f, "{v}"),
            AttributeValue::Number(v) => write!(f, "{v}"),
            AttributeValue::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Attribute record of a feature: field name to value.
pub type Attributes = BTreeMap<String, AttributeValue>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_conversion() {
        assert_eq!(
            AttributeValue::from_json(&json!("Zona A")),
            AttributeValue::Text("Zona A".into())
        );
        assert_eq!(
            AttributeValue::from_json(&json!(3)),
            AttributeValue::Integer(3)
        );
        assert_eq!(
            AttributeValue::from_json(&json!(2.5)),
            AttributeValue::Number(2.5)
        );
        assert!(AttributeValue::from_json(&json!(null)).is_null());
        assert_eq!(
            AttributeValue::from_json(&json!([1, 2])),
            AttributeValue::Text("[1,2]".into())
        );
        assert_eq!(AttributeValue::Number(2.5).to_json(), json!(2.5));
    }

    #[test]
    fn display() {
        assert_eq!(AttributeValue::Null.to_string(), "");
        assert_eq!(AttributeValue::from("B").to_string(), "B");
        assert_eq!(AttributeValue::Number(0.5).to_string(), "0.5");
    }
}
