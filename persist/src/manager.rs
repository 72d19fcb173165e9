//! Persistence manager
//!
//! Single authoritative bridge between the in-memory engine and the durable
//! medium: load the encoded snapshot at startup, write a fresh encoding
//! after every successful mutation.

use mercura_core::{DurableStore, LedgerConfig, LedgerError, LedgerResult};
use std::time::Duration;
use tracing::{debug, warn};

use crate::codec;

/// Owns the durable store handle, the storage key, and the startup bound.
#[derive(Debug)]
pub struct PersistenceManager<D: DurableStore> {
    store: D,
    key: String,
    startup_timeout: Duration,
}

impl<D: DurableStore> PersistenceManager<D> {
    pub fn new(store: D, config: &LedgerConfig) -> Self {
        Self {
            store,
            key: config.storage_key.clone(),
            startup_timeout: Duration::from_millis(config.startup_timeout_ms),
        }
    }

    /// Wait for the medium to become ready (bounded), then read and decode
    /// the persisted snapshot. `None` means no snapshot has ever been
    /// written and a fresh schema should be initialized.
    pub async fn load(&self) -> LedgerResult<Option<Vec<u8>>> {
        tokio::time::timeout(self.startup_timeout, self.store.ready())
            .await
            .map_err(|_| {
                LedgerError::StartupTimeout(format!(
                    "durable store not ready within {:?}",
                    self.startup_timeout
                ))
            })??;

        match self.store.read(&self.key).await? {
            Some(text) => {
                let bytes = codec::decode(&text)?;
                debug!(key = %self.key, bytes = bytes.len(), "loaded persisted snapshot");
                Ok(Some(bytes))
            }
            None => {
                debug!(key = %self.key, "no persisted snapshot");
                Ok(None)
            }
        }
    }

    /// Encode and write a snapshot under the configured key.
    ///
    /// A rejected write surfaces as `PersistenceWrite`; the caller's
    /// in-memory state stays committed and usable for the session.
    pub async fn persist(&self, snapshot: &[u8]) -> LedgerResult<()> {
        let encoded = codec::encode(snapshot);
        match self.store.write(&self.key, &encoded).await {
            Ok(()) => {
                debug!(key = %self.key, bytes = snapshot.len(), "persisted snapshot");
                Ok(())
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "snapshot write rejected");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::durable::MemoryDurableStore;

    fn config() -> LedgerConfig {
        LedgerConfig {
            storage_key: "inventory_db".to_string(),
            startup_timeout_ms: 200,
        }
    }

    #[tokio::test]
    async fn test_load_absent_returns_none() {
        let manager = PersistenceManager::new(MemoryDurableStore::new(), &config());
        assert_eq!(manager.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_persist_then_load_roundtrip() {
        let manager = PersistenceManager::new(MemoryDurableStore::new(), &config());
        let snapshot = vec![1u8, 2, 3, 0, 255];
        manager.persist(&snapshot).await.unwrap();
        assert_eq!(manager.load().await.unwrap(), Some(snapshot));
    }

    #[tokio::test]
    async fn test_load_rejects_corrupt_entry() {
        let store = MemoryDurableStore::new();
        store.seed("inventory_db", "%%% not base64 %%%");
        let manager = PersistenceManager::new(store, &config());

        let err = manager.load().await.unwrap_err();
        assert!(matches!(err, LedgerError::CorruptSnapshot(_)));
    }

    #[tokio::test]
    async fn test_startup_timeout() {
        let store = MemoryDurableStore::with_ready_delay(Duration::from_secs(60));
        let manager = PersistenceManager::new(store, &config());

        let err = manager.load().await.unwrap_err();
        assert!(matches!(err, LedgerError::StartupTimeout(_)));
    }

    #[tokio::test]
    async fn test_persist_quota_rejection() {
        let manager = PersistenceManager::new(MemoryDurableStore::with_quota(2), &config());
        let err = manager.persist(&[0u8; 64]).await.unwrap_err();
        assert!(matches!(err, LedgerError::PersistenceWrite(_)));
    }
}
