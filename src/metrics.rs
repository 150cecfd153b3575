//! Metrics report passed in by the monitoring caller.
//!
//! Order-preserving: prompt rendering lists metrics in insertion order.

use crate::error::{AuditorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single metric value: free text or a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) => write!(f, "{n}"),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        MetricValue::Text(v.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        MetricValue::Text(v)
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Number(v)
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Number(v as f64)
    }
}

/// Named metric values in insertion order. No uniqueness constraint is
/// enforced beyond what the caller supplies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsReport {
    entries: Vec<(String, MetricValue)>,
}

impl MetricsReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<MetricValue>) {
        self.entries.push((name.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a report from a JSON object like {"accuracy": 0.72, "note": "..."}
    pub fn from_json_object(value: &serde_json::Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| AuditorError::Serialization {
            message: "metrics input must be a JSON object".to_string(),
        })?;

        let mut report = Self::new();
        for (name, raw) in object {
            let value = match raw {
                serde_json::Value::Number(n) => MetricValue::Number(n.as_f64().unwrap_or(0.0)),
                serde_json::Value::String(s) => MetricValue::Text(s.clone()),
                serde_json::Value::Bool(b) => MetricValue::Text(b.to_string()),
                other => MetricValue::Text(other.to_string()),
            };
            report.entries.push((name.clone(), value));
        }
        Ok(report)
    }
}
