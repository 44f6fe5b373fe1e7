//! Storables without a native histogram representation.

use std::any::Any;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::storable::{Combine, Storable};

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Free-form key/value metadata (run numbers, configuration, provenance).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_json(&self) -> StoreResult<String> {
        serde_json::to_string(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> StoreResult<Self> {
        serde_json::from_str(json).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

impl Storable for Record {
    fn kind_name(&self) -> &'static str {
        "record"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Counter
// ---------------------------------------------------------------------------

/// Weighted event counter.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    entries: u64,
    sum_w: f64,
    sum_w2: f64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&mut self) {
        self.count_weighted(1.0);
    }

    pub fn count_weighted(&mut self, weight: f64) {
        self.entries += 1;
        self.sum_w += weight;
        self.sum_w2 += weight * weight;
    }

    pub fn entries(&self) -> u64 {
        self.entries
    }

    pub fn sum_of_weights(&self) -> f64 {
        self.sum_w
    }

    /// Statistical error on the sum of weights.
    pub fn error(&self) -> f64 {
        self.sum_w2.sqrt()
    }
}

impl Combine for Counter {
    fn combine(&mut self, other: &Self) {
        self.entries += other.entries;
        self.sum_w += other.sum_w;
        self.sum_w2 += other.sum_w2;
    }

    fn scale(&mut self, factor: f64) {
        self.sum_w *= factor;
        self.sum_w2 *= factor * factor;
    }
}

impl Storable for Counter {
    fn kind_name(&self) -> &'static str {
        "counter"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_fields() {
        let mut record = Record::new();
        record.set("run", 1234).set("detector", "barrel");
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("run"), Some(&json!(1234)));
        assert!(record.get("missing").is_none());
    }

    #[test]
    fn record_json_roundtrip() {
        let mut record = Record::new();
        record.set("energy", 13.6);
        let json = record.to_json().unwrap();
        assert_eq!(json, r#"{"fields":{"energy":13.6}}"#);
        assert_eq!(Record::from_json(&json).unwrap(), record);
    }

    #[test]
    fn record_bad_json() {
        let err = Record::from_json("not json").unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn records_have_no_native_form() {
        assert!(Record::new().as_native().is_none());
        assert!(Counter::new().as_native().is_none());
    }

    #[test]
    fn counter_combine_and_scale() {
        let mut a = Counter::new();
        a.count();
        a.count_weighted(2.0);
        let mut b = Counter::new();
        b.count();

        a.combine(&b);
        assert_eq!(a.entries(), 3);
        assert_eq!(a.sum_of_weights(), 4.0);
        assert_eq!(a.error(), 6.0f64.sqrt());

        a.scale(0.5);
        assert_eq!(a.sum_of_weights(), 2.0);
        assert_eq!(a.error(), 1.5f64.sqrt());
        assert_eq!(a.entries(), 3);
    }
}
