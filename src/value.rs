use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Ordered field name to value mapping of a single unit.
pub type FieldMap = BTreeMap<String, Value>;

/// A computed field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    /// Numeric view, non-numbers read as `0`.
    pub fn as_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            _ => 0.0,
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            _ => false,
        }
    }

    pub fn as_text(&self) -> &str {
        match self {
            Value::Text(t) => t,
            _ => "",
        }
    }

    /// Values that `push` never stores.
    pub(crate) fn is_blank(&self) -> bool {
        match self {
            Value::Number(n) => *n == 0.0,
            Value::Bool(b) => !b,
            Value::Text(_) => false,
        }
    }

    pub(crate) fn rounded(self, precision: u32) -> Self {
        match self {
            Value::Number(n) => Value::Number(round_to(n, precision)),
            other => other,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(t) => f.write_str(t),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

/// Round half away from zero to `digits` decimal places, normalizing `-0.0`.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let scale = 10f64.powi(digits as i32);
    let rounded = (value * scale).round() / scale;
    if rounded == 0.0 { 0.0 } else { rounded }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1234.5, 0), 1235.0);
        assert_eq!(round_to(-0.4, 0), 0.0);
        assert_eq!(round_to(10.006, 2), 10.01);
        assert!(round_to(-0.4, 0).is_sign_positive());
    }

    #[test]
    fn test_blank_values() {
        assert!(Value::Number(0.0).is_blank());
        assert!(Value::Bool(false).is_blank());
        assert!(!Value::Text(String::new()).is_blank());
        assert!(!Value::Number(0.01).is_blank());
    }

    #[test]
    fn test_untagged_serde() {
        let json = r#"{"a":1.5,"b":true,"c":"x"}"#;
        let map: FieldMap = serde_json::from_str(json).unwrap();
        assert_eq!(map["a"], Value::Number(1.5));
        assert_eq!(map["b"], Value::Bool(true));
        assert_eq!(map["c"], Value::Text("x".into()));
    }
}
