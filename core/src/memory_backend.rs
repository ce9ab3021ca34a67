use std::collections::BTreeMap;

use crate::backend::KeyValueBackend;
use crate::error::StorageError;

/// In-process backend. Used by tests and by hosts that persist elsewhere.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    pub values: BTreeMap<String, String>,
    pub quota_bytes: Option<u64>,
    /// Keys whose writes fail, to exercise error paths.
    pub failing_keys: Vec<String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// Seed a raw value, bypassing quota checks.
    pub fn insert_raw(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn stored_bytes_except(&self, skip: &str) -> u64 {
        self.values
            .iter()
            .filter(|(k, _)| k.as_str() != skip)
            .map(|(_, v)| v.len() as u64)
            .sum()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.failing_keys.iter().any(|k| k == key) {
            return Err(StorageError::backend(key, "write rejected"));
        }
        if let Some(limit) = self.quota_bytes {
            if self.stored_bytes_except(key) + value.len() as u64 > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    limit,
                });
            }
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend_quota_counts_other_keys() {
        let mut backend = MemoryBackend::with_quota(8);
        backend.set("a", "1234").unwrap();
        backend.set("a", "12345678").unwrap();
        assert!(matches!(
            backend.set("b", "1"),
            Err(StorageError::QuotaExceeded { .. })
        ));
        backend.remove("a").unwrap();
        backend.set("b", "1").unwrap();
    }

    #[test]
    fn test_memory_backend_failing_key() {
        let mut backend = MemoryBackend::new();
        backend.failing_keys.push("lots_1".to_string());
        assert!(matches!(
            backend.set("lots_1", "[]"),
            Err(StorageError::Backend { .. })
        ));
        backend.set("lots_2", "[]").unwrap();
    }
}
