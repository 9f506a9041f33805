use std::collections::{BTreeSet, HashMap};

use crate::sql::types::Value;

/// Hash index from a column value to the positions of the rows holding it.
///
/// NULL values are never indexed, so a UNIQUE column may hold several NULLs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HashIndex {
    entries: HashMap<Value, BTreeSet<usize>>,
}

impl HashIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: &Value, position: usize) {
        if value.is_null() {
            return;
        }
        self.entries.entry(value.clone()).or_default().insert(position);
    }

    pub fn remove(&mut self, value: &Value, position: usize) {
        if let Some(positions) = self.entries.get_mut(value) {
            positions.remove(&position);
            if positions.is_empty() {
                self.entries.remove(value);
            }
        }
    }

    /// Positions holding `value`, in ascending order
    pub fn get(&self, value: &Value) -> Option<&BTreeSet<usize>> {
        self.entries.get(value)
    }

    /// Whether a row other than `except` already holds `value`
    pub fn conflicts(&self, value: &Value, except: Option<usize>) -> bool {
        self.entries
            .get(value)
            .is_some_and(|positions| positions.iter().any(|p| Some(*p) != except))
    }

    /// Number of distinct indexed values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
