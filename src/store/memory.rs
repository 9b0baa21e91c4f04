use std::collections::HashMap;
use std::sync::Mutex;

use crate::app::{FeedbellError, Result};
use crate::domain::{Fingerprint, Topic};
use crate::store::DedupStore;

/// Process-local store, for embedding and tests. Nothing survives the
/// process.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<(String, String), Fingerprint>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every record, as if local state had been wiped.
    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> FeedbellError {
    FeedbellError::Io(std::io::Error::other(e.to_string()))
}

impl DedupStore for MemoryStore {
    fn read(&self, topic: &Topic, feed_title: &str) -> Result<Option<Fingerprint>> {
        let records = self.records.lock().map_err(poisoned)?;
        Ok(records
            .get(&(topic.as_str().to_string(), feed_title.to_string()))
            .copied())
    }

    fn write(&self, topic: &Topic, feed_title: &str, fingerprint: Fingerprint) -> Result<()> {
        let mut records = self.records.lock().map_err(poisoned)?;
        records.insert(
            (topic.as_str().to_string(), feed_title.to_string()),
            fingerprint,
        );
        Ok(())
    }

    fn remove(&self, topic: &Topic, feed_title: &str) -> Result<()> {
        let mut records = self.records.lock().map_err(poisoned)?;
        records.remove(&(topic.as_str().to_string(), feed_title.to_string()));
        Ok(())
    }
}
