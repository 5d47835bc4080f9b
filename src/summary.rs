use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Flat label to value report of the key amounts of a run.
///
/// Labels are written once; later writes to the same label are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary(Vec<(String, Value)>);

impl Summary {
    /// Returns `false` when the label was already recorded.
    pub fn record(&mut self, label: impl Into<String>, value: impl Into<Value>) -> bool {
        let label = label.into();
        if self.get(&label).is_some() {
            tracing::debug!("Summary label '{label}' already recorded");
            return false;
        }
        self.0.push((label, value.into()));
        true
    }

    pub fn get(&self, label: &str) -> Option<&Value> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(l, v)| (l.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_once() {
        let mut summary = Summary::default();
        assert!(summary.record("Federal/f1040 16 Tax", 9441.0));
        assert!(!summary.record("Federal/f1040 16 Tax", 1.0));
        assert_eq!(summary.get("Federal/f1040 16 Tax"), Some(&Value::Number(9441.0)));
        assert_eq!(summary.len(), 1);
    }

    #[test]
    fn test_keeps_insertion_order() {
        let mut summary = Summary::default();
        summary.record("b", 1.0);
        summary.record("a", 2.0);
        let labels: Vec<_> = summary.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["b", "a"]);
    }
}
