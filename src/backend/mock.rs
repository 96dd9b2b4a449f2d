//! In-memory backing store for unit tests.

use std::collections::{HashMap, HashSet};

use super::{BackendError, BackingStore, StoreStats};

/// Map-backed store that records every fetched key and can be told to fail.
#[derive(Debug, Default, Clone)]
pub struct MockStore {
    pub data: HashMap<String, String>,
    /// Keys whose fetch fails with `BackendError::Unavailable`
    pub failing: HashSet<String>,
    /// Every fetched key, in call order
    pub fetched: Vec<String>,
    pub stats: StoreStats,
}

impl MockStore {
    /// A store where every given key maps to itself.
    pub fn echo<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self::with_entries(keys.into_iter().map(|k| {
            let k = k.into();
            (k.clone(), k)
        }))
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            data: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            ..Self::default()
        }
    }
}

impl BackingStore for MockStore {
    fn get(&mut self, key: &str) -> Result<Option<String>, BackendError> {
        self.fetched.push(key.to_string());

        if self.failing.contains(key) {
            self.stats.errors += 1;
            return Err(BackendError::Unavailable(format!("{} is unreachable", key)));
        }

        match self.data.get(key) {
            Some(value) => {
                self.stats.hits += 1;
                Ok(Some(value.clone()))
            }
            None => {
                self.stats.misses += 1;
                Ok(None)
            }
        }
    }

    fn stats(&self) -> StoreStats {
        self.stats
    }
}
