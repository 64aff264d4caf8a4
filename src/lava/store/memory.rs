use super::{ConfigStore, StoredEntry};
use crate::error::Result;
use std::collections::BTreeMap;

/// In-memory storage for testing.
/// Does NOT persist data.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    values: BTreeMap<(String, String), String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, namespace: &str, key: &str, value: &str) -> Self {
        self.values
            .insert((namespace.to_string(), key.to_string()), value.to_string());
        self
    }
}

impl ConfigStore for InMemoryStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>> {
        Ok(self
            .values
            .get(&(namespace.to_string(), key.to_string()))
            .cloned())
    }

    fn put(&mut self, namespace: &str, key: &str, value: &str) -> Result<()> {
        self.values
            .insert((namespace.to_string(), key.to_string()), value.to_string());
        Ok(())
    }

    fn entries(&self) -> Result<Vec<StoredEntry>> {
        Ok(self
            .values
            .iter()
            .map(|((namespace, key), value)| StoredEntry {
                namespace: namespace.clone(),
                key: key.clone(),
                value: value.clone(),
            })
            .collect())
    }
}
