//! Core traits defining Mercura interfaces
//!
//! These traits define the contract between the persistence manager and the
//! durable medium that holds the encoded snapshot.

use crate::error::LedgerResult;
use async_trait::async_trait;

/// A string-keyed durable store holding the encoded snapshot.
///
/// Models the size-limited key-value storage the original system persisted
/// into. Values are the text-safe encoding produced by the codec; keys are
/// chosen by the persistence manager.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Resolves once the backing medium is ready to serve reads and writes.
    ///
    /// Callers bound this with a timeout; an implementation that is ready
    /// immediately simply returns `Ok(())`.
    async fn ready(&self) -> LedgerResult<()>;

    /// Read the value stored under `key`, or `None` if absent.
    async fn read(&self, key: &str) -> LedgerResult<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// A rejected write (e.g. quota exceeded) fails with
    /// `LedgerError::PersistenceWrite`; it must not corrupt the previously
    /// stored value.
    async fn write(&self, key: &str, value: &str) -> LedgerResult<()>;
}

#[async_trait]
impl<D: DurableStore + ?Sized> DurableStore for std::sync::Arc<D> {
    async fn ready(&self) -> LedgerResult<()> {
        (**self).ready().await
    }

    async fn read(&self, key: &str) -> LedgerResult<Option<String>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &str, value: &str) -> LedgerResult<()> {
        (**self).write(key, value).await
    }
}
