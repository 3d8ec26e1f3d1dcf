//! Contract records: the input side of an evaluation.

mod loader;

pub use loader::{load_contracts, ContractError};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A scalar contract value.
///
/// `Display` gives the string that is normalized for modality lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Float(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
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

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// One input record, field name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Contract {
    fields: HashMap<String, FieldValue>,
}

impl Contract {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `field`, or `None` when the contract does not carry it.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Contract
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_field_is_none() {
        let contract: Contract = [("AGE", "young")].into_iter().collect();
        assert_eq!(contract.get("AGE"), Some(&FieldValue::from("young")));
        assert!(contract.get("ZONE").is_none());
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::Integer(42).to_string(), "42");
        assert_eq!(FieldValue::Float(2.0).to_string(), "2");
        assert_eq!(FieldValue::Float(0.25).to_string(), "0.25");
        assert_eq!(FieldValue::Null.to_string(), "");
        assert_eq!(FieldValue::from("Lyon").to_string(), "Lyon");
    }

    #[test]
    fn test_deserialize_scalar_json() {
        let contract: Contract =
            serde_json::from_str(r#"{"NUMCNT": 42, "AGE": "old", "RATE": 1.5, "PRO": true, "X": null}"#)
                .unwrap();
        assert_eq!(contract.get("NUMCNT"), Some(&FieldValue::Integer(42)));
        assert_eq!(contract.get("AGE"), Some(&FieldValue::from("old")));
        assert_eq!(contract.get("RATE"), Some(&FieldValue::Float(1.5)));
        assert_eq!(contract.get("PRO"), Some(&FieldValue::Bool(true)));
        assert_eq!(contract.get("X"), Some(&FieldValue::Null));
    }

    #[test]
    fn test_nested_json_rejected() {
        let result: Result<Contract, _> = serde_json::from_str(r#"{"AGE": {"x": 1}}"#);
        assert!(result.is_err());
    }
}
