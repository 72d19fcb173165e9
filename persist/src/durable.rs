//! Durable store backends
//!
//! Two implementations of the string-keyed `DurableStore` contract: an
//! in-memory store (test double and analogue of the original's size-limited
//! browser storage) and a sled-backed on-disk store.

use async_trait::async_trait;
use dashmap::DashMap;
use mercura_core::{DurableStore, LedgerError, LedgerResult};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// In-memory durable store.
///
/// Supports an optional byte quota on written values, mirroring the
/// quota-limited medium the snapshot was designed for, and an optional
/// readiness delay for exercising bounded-startup behavior.
#[derive(Debug, Default)]
pub struct MemoryDurableStore {
    entries: DashMap<String, String>,
    quota_bytes: Option<usize>,
    ready_delay: Option<Duration>,
}

impl MemoryDurableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes whose value exceeds `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// Delay readiness by `delay`; `ready()` resolves only after it passes.
    pub fn with_ready_delay(delay: Duration) -> Self {
        Self {
            ready_delay: Some(delay),
            ..Self::default()
        }
    }

    /// Seed an entry directly, bypassing the quota. Test setup helper.
    pub fn seed(&self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl DurableStore for MemoryDurableStore {
    async fn ready(&self) -> LedgerResult<()> {
        if let Some(delay) = self.ready_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn read(&self, key: &str) -> LedgerResult<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn write(&self, key: &str, value: &str) -> LedgerResult<()> {
        if let Some(quota) = self.quota_bytes {
            if value.len() > quota {
                return Err(LedgerError::PersistenceWrite(format!(
                    "quota exceeded: {} bytes > {quota}",
                    value.len()
                )));
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

const ENTRIES_TREE: &str = "entries";

/// Durable store backed by a sled database.
///
/// Opening takes the sled directory lock for the process lifetime, so a
/// second instance pointed at the same directory fails at `open` instead of
/// racing the first (single-instance enforcement).
pub struct SledDurableStore {
    db: sled::Db,
    entries: sled::Tree,
}

impl SledDurableStore {
    pub fn open<P: AsRef<Path>>(path: P) -> LedgerResult<Self> {
        let db = sled::open(&path)
            .map_err(|e| LedgerError::Internal(format!("failed to open durable store: {e}")))?;
        let entries = db
            .open_tree(ENTRIES_TREE)
            .map_err(|e| LedgerError::Internal(format!("failed to open entries tree: {e}")))?;
        debug!(path = %path.as_ref().display(), "opened durable store");
        Ok(Self { db, entries })
    }
}

#[async_trait]
impl DurableStore for SledDurableStore {
    async fn ready(&self) -> LedgerResult<()> {
        // Readiness is established by open() holding the directory lock.
        Ok(())
    }

    async fn read(&self, key: &str) -> LedgerResult<Option<String>> {
        let value = self
            .entries
            .get(key)
            .map_err(|e| LedgerError::Internal(format!("durable read failed: {e}")))?;
        match value {
            Some(bytes) => {
                let text = String::from_utf8(bytes.to_vec()).map_err(|_| {
                    LedgerError::CorruptSnapshot("stored value is not valid UTF-8".into())
                })?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    async fn write(&self, key: &str, value: &str) -> LedgerResult<()> {
        self.entries
            .insert(key, value.as_bytes())
            .map_err(|e| LedgerError::PersistenceWrite(e.to_string()))?;
        self.db
            .flush_async()
            .await
            .map_err(|e| LedgerError::PersistenceWrite(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_store_read_write() {
        let store = MemoryDurableStore::new();
        assert_eq!(store.read("k").await.unwrap(), None);

        store.write("k", "v1").await.unwrap();
        store.write("k", "v2").await.unwrap();
        assert_eq!(store.read("k").await.unwrap(), Some("v2".to_string()));
    }

    #[tokio::test]
    async fn test_memory_store_quota() {
        let store = MemoryDurableStore::with_quota(4);
        store.write("k", "tiny").await.unwrap();

        let err = store.write("k", "too large").await.unwrap_err();
        assert!(matches!(err, LedgerError::PersistenceWrite(_)));
        // Rejected write leaves the previous value intact
        assert_eq!(store.read("k").await.unwrap(), Some("tiny".to_string()));
    }

    #[tokio::test]
    async fn test_sled_store_reopen() {
        let tmp = TempDir::new().unwrap();
        {
            let store = SledDurableStore::open(tmp.path()).unwrap();
            store.ready().await.unwrap();
            store.write("inventory_db", "payload").await.unwrap();
        }
        {
            let store = SledDurableStore::open(tmp.path()).unwrap();
            assert_eq!(
                store.read("inventory_db").await.unwrap(),
                Some("payload".to_string())
            );
        }
    }
}
