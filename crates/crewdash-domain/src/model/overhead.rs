//! Overhead cost categories

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crewdash_types::parse_amount;

/// Keys the server fills from truck and employee data
pub const DERIVED_KEYS: [&str; 2] = ["vehicle_expenses", "employee_wages"];

/// Named monthly overhead amounts (`rent`, `utilities`, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>", into = "BTreeMap<String, f64>")]
pub struct OverheadCosts {
    entries: BTreeMap<String, f64>,
}

impl From<BTreeMap<String, Value>> for OverheadCosts {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let entries = raw
            .into_iter()
            .map(|(k, v)| {
                let amount = parse_amount(&v);
                (k, amount)
            })
            .collect();
        Self { entries }
    }
}

impl From<OverheadCosts> for BTreeMap<String, f64> {
    fn from(costs: OverheadCosts) -> Self {
        costs.entries
    }
}

impl FromIterator<(String, f64)> for OverheadCosts {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Whether `key` duplicates costs already tracked per truck or per employee.
///
/// Matches the two derived keys exactly and any key mentioning "vehicle" or
/// "truck" regardless of case.
pub fn is_excluded_key(key: &str) -> bool {
    if DERIVED_KEYS.contains(&key) {
        return true;
    }
    let lower = key.to_lowercase();
    lower.contains("vehicle") || lower.contains("truck")
}

impl OverheadCosts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, amount: f64) {
        let amount = if amount.is_finite() { amount } else { 0.0 };
        self.entries.insert(key.into(), amount);
    }

    pub fn remove(&mut self, key: &str) -> Option<f64> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Entries that count toward generic overhead
    pub fn generic_entries(&self) -> impl Iterator<Item = (&str, f64)> {
        self.iter().filter(|(k, _)| !is_excluded_key(k))
    }

    /// Entries skipped to avoid double counting
    pub fn excluded_entries(&self) -> impl Iterator<Item = (&str, f64)> {
        self.iter().filter(|(k, _)| is_excluded_key(k))
    }

    /// Sum of generic overhead only
    pub fn generic_total(&self) -> f64 {
        self.generic_entries().map(|(_, v)| v).sum()
    }

    /// Sum of every entry, derived ones included
    pub fn raw_total(&self) -> f64 {
        self.entries.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filtered_total_example() {
        let costs: OverheadCosts = serde_json::from_value(json!({
            "rent": 1000,
            "vehicle_expenses": 500,
            "employee_wages": 2000,
            "utilities": 200
        }))
        .unwrap();
        assert!((costs.generic_total() - 1200.0).abs() < 1e-9);
        assert!((costs.raw_total() - 3700.0).abs() < 1e-9);
        assert_eq!(costs.excluded_entries().count(), 2);
    }

    #[test]
    fn test_insert_and_remove() {
        let mut costs = OverheadCosts::new();
        costs.insert("rent", 1500.0);
        costs.insert("bad", f64::NAN);
        assert_eq!(costs.get("bad"), Some(0.0));
        assert_eq!(costs.remove("rent"), Some(1500.0));
        assert_eq!(costs.remove("rent"), None);
        assert_eq!(costs.len(), 1);
    }

    #[test]
    fn test_vehicle_and_truck_keys_any_case() {
        assert!(is_excluded_key("Truck_Lease"));
        assert!(is_excluded_key("fleet_VEHICLE_wraps"));
        assert!(is_excluded_key("employee_wages"));
        assert!(!is_excluded_key("employee_training"));
        assert!(!is_excluded_key("rent"));
    }

    #[test]
    fn test_values_coerced() {
        let costs: OverheadCosts = serde_json::from_value(json!({
            "rent": "$2,000.00",
            "marketing": "unknown",
            "misc": null
        }))
        .unwrap();
        assert_eq!(costs.get("rent"), Some(2000.0));
        assert_eq!(costs.get("marketing"), Some(0.0));
        assert!((costs.generic_total() - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let mut costs = OverheadCosts::new();
        costs.insert("rent", 1500.0);
        let value = serde_json::to_value(&costs).unwrap();
        assert_eq!(value, json!({"rent": 1500.0}));
    }
}
