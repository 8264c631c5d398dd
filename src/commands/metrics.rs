//! Per-command execution counters
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use dashmap::DashMap;
use std::sync::Arc;

/// Number of times each command body ran, keyed by command type name
#[derive(Clone, Default)]
pub struct ExecutionCounters {
    counts: Arc<DashMap<String, u64>>,
}

impl ExecutionCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a counter visible with a zero value
    pub fn register(&self, label: &str) {
        self.counts.entry(label.to_string()).or_insert(0);
    }

    pub fn increment(&self, label: &str) {
        *self.counts.entry(label.to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, label: &str) -> Option<u64> {
        self.counts.get(label).map(|count| *count)
    }

    pub fn snapshot(&self) -> Vec<(String, u64)> {
        let mut counts: Vec<(String, u64)> = self
            .counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        counts.sort();
        counts
    }
}
