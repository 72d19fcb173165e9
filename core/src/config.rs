//! Configuration types for Mercura

use serde::{Deserialize, Serialize};

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Key the encoded snapshot is stored under in the durable medium
    pub storage_key: String,

    /// Maximum time to wait for the durable medium to become ready at
    /// startup, in milliseconds
    pub startup_timeout_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            storage_key: "inventory_db".to_string(),
            startup_timeout_ms: 5_000,
        }
    }
}
