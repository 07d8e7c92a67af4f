use std::collections::HashMap;

use trellis_query::FilterDescriptor;

/// Persisted direct-filter state, keyed by model name.
///
/// Backed by a session-like store in production so several grids can each
/// hold independent filter state. Concurrent requests from one session
/// race as last-writer-wins; the store provides no locking.
pub trait FilterStore {
    fn get(&self, model: &str) -> Vec<FilterDescriptor>;
    fn set(&mut self, model: &str, filters: Vec<FilterDescriptor>);
}

/// HashMap-backed store for tests and single-process callers.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilterStore {
    entries: HashMap<String, Vec<FilterDescriptor>>,
}

impl MemoryFilterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FilterStore for MemoryFilterStore {
    fn get(&self, model: &str) -> Vec<FilterDescriptor> {
        self.entries.get(model).cloned().unwrap_or_default()
    }

    fn set(&mut self, model: &str, filters: Vec<FilterDescriptor>) {
        self.entries.insert(model.to_string(), filters);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn models_hold_independent_state() {
        let mut store = MemoryFilterStore::new();
        store.set("users", vec![FilterDescriptor::eq("status", json!("active"))]);
        store.set("orders", vec![FilterDescriptor::eq("paid", json!(true))]);

        assert_eq!(store.get("users").len(), 1);
        assert_eq!(store.get("orders")[0].property, "paid");
        assert!(store.get("invoices").is_empty());
    }

    #[test]
    fn set_replaces_previous_filters() {
        let mut store = MemoryFilterStore::new();
        store.set("users", vec![FilterDescriptor::eq("status", json!("active"))]);
        store.set("users", vec![]);
        assert!(store.get("users").is_empty());
    }
}
