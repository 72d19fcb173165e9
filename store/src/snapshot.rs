//! Whole-store snapshot export and load
//!
//! The export is one leading format-version byte followed by a bincode
//! body. The version byte lets a future schema change detect and migrate or
//! reject old snapshots instead of assuming compatibility.

use mercura_core::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::engine::{StoreEngine, StoredRow};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u8 = 1;

/// Serialized state of one table
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TableState {
    next_id: u64,
    rows: Vec<StoredRow>,
}

/// Snapshot body, keyed by table name. Schemas are not serialized; they are
/// fixed by this build and revalidated against the rows on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotBody {
    tables: BTreeMap<String, TableState>,
}

impl StoreEngine {
    /// Serialize the entire current contents to the binary snapshot form.
    pub fn export_snapshot(&self) -> LedgerResult<Vec<u8>> {
        let body = SnapshotBody {
            tables: self
                .tables
                .iter()
                .map(|(name, table)| {
                    (
                        name.clone(),
                        TableState {
                            next_id: table.next_id,
                            rows: table.rows.clone(),
                        },
                    )
                })
                .collect(),
        };
        let encoded = bincode::serialize(&body)
            .map_err(|e| LedgerError::Internal(format!("snapshot serialization failed: {e}")))?;

        let mut bytes = Vec::with_capacity(1 + encoded.len());
        bytes.push(SNAPSHOT_VERSION);
        bytes.extend_from_slice(&encoded);
        Ok(bytes)
    }

    /// Replace engine state by deserializing a prior export.
    ///
    /// The replacement is built and validated in full before it is swapped
    /// in; on any failure the current engine state is left untouched.
    pub fn load_snapshot(&mut self, bytes: &[u8]) -> LedgerResult<()> {
        let Some((&version, body)) = bytes.split_first() else {
            return Err(LedgerError::CorruptSnapshot("empty snapshot".into()));
        };
        if version != SNAPSHOT_VERSION {
            return Err(LedgerError::CorruptSnapshot(format!(
                "unsupported snapshot version {version} (expected {SNAPSHOT_VERSION})"
            )));
        }
        let body: SnapshotBody = bincode::deserialize(body)
            .map_err(|e| LedgerError::CorruptSnapshot(e.to_string()))?;

        let mut fresh = StoreEngine::new();
        fresh.initialize_schema();

        for (name, state) in body.tables {
            let table = fresh.tables.get_mut(&name).ok_or_else(|| {
                LedgerError::CorruptSnapshot(format!("unknown table '{name}' in snapshot"))
            })?;

            let mut max_id = 0u64;
            for row in &state.rows {
                if row.values.len() != table.schema.columns.len() {
                    return Err(LedgerError::CorruptSnapshot(format!(
                        "row {} in table '{name}' has {} values, schema has {} columns",
                        row.id,
                        row.values.len(),
                        table.schema.columns.len()
                    )));
                }
                for (def, value) in table.schema.columns.iter().zip(&row.values) {
                    if value.is_null() {
                        if def.required {
                            return Err(LedgerError::CorruptSnapshot(format!(
                                "null in required column '{}' of table '{name}'",
                                def.name
                            )));
                        }
                    } else if !def.ty.accepts(value) {
                        return Err(LedgerError::CorruptSnapshot(format!(
                            "type mismatch in column '{}' of table '{name}'",
                            def.name
                        )));
                    }
                }
                if row.id <= max_id {
                    return Err(LedgerError::CorruptSnapshot(format!(
                        "row ids in table '{name}' are not strictly increasing"
                    )));
                }
                max_id = row.id;
            }
            if state.next_id <= max_id {
                return Err(LedgerError::CorruptSnapshot(format!(
                    "next_id {} in table '{name}' is behind row id {max_id}",
                    state.next_id
                )));
            }

            table.next_id = state.next_id;
            table.rows = state.rows;
        }

        *self = fresh;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Order, Query, Statement};
    use crate::schema::MERCHANDISE_TABLE;
    use crate::value::Value;

    fn populated_engine() -> StoreEngine {
        let mut engine = StoreEngine::new();
        engine.initialize_schema();
        engine
            .execute(Statement::Insert {
                table: MERCHANDISE_TABLE,
                values: vec![
                    ("name", Value::from("Widget")),
                    ("description", Value::from("a widget")),
                    ("price", Value::Real(10.0)),
                    ("quantity", Value::Integer(5)),
                    ("registered_at", Value::from("2024-01-01T00:00:00.000Z")),
                ],
            })
            .unwrap();
        engine
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let engine = populated_engine();
        let bytes = engine.export_snapshot().unwrap();
        assert_eq!(bytes[0], SNAPSHOT_VERSION);

        let mut restored = StoreEngine::new();
        restored.load_snapshot(&bytes).unwrap();

        let before = engine
            .query_all(Query::all(MERCHANDISE_TABLE, Order::IdAsc))
            .unwrap();
        let after = restored
            .query_all(Query::all(MERCHANDISE_TABLE, Order::IdAsc))
            .unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_ids_continue_after_reload() {
        let engine = populated_engine();
        let bytes = engine.export_snapshot().unwrap();

        let mut restored = StoreEngine::new();
        restored.load_snapshot(&bytes).unwrap();
        let id = restored
            .execute(Statement::Insert {
                table: MERCHANDISE_TABLE,
                values: vec![
                    ("name", Value::from("Anvil")),
                    ("price", Value::Real(1.0)),
                    ("quantity", Value::Integer(1)),
                    ("registered_at", Value::from("2024-01-02T00:00:00.000Z")),
                ],
            })
            .unwrap();
        assert_eq!(id, 2);
    }

    #[test]
    fn test_empty_input_is_corrupt() {
        let mut engine = StoreEngine::new();
        let err = engine.load_snapshot(&[]).unwrap_err();
        assert!(matches!(err, LedgerError::CorruptSnapshot(_)));
    }

    #[test]
    fn test_unknown_version_is_corrupt() {
        let engine = populated_engine();
        let mut bytes = engine.export_snapshot().unwrap();
        bytes[0] = 99;

        let mut restored = StoreEngine::new();
        let err = restored.load_snapshot(&bytes).unwrap_err();
        assert!(matches!(err, LedgerError::CorruptSnapshot(_)));
    }

    #[test]
    fn test_garbage_body_is_corrupt() {
        let mut engine = StoreEngine::new();
        let err = engine
            .load_snapshot(&[SNAPSHOT_VERSION, 0xde, 0xad, 0xbe, 0xef])
            .unwrap_err();
        assert!(matches!(err, LedgerError::CorruptSnapshot(_)));
    }

    #[test]
    fn test_failed_load_leaves_state_untouched() {
        let mut engine = populated_engine();
        engine.load_snapshot(&[SNAPSHOT_VERSION, 0xff]).unwrap_err();
        assert_eq!(engine.row_count(MERCHANDISE_TABLE).unwrap(), 1);
    }
}
