//! The inventory ledger service
//!
//! One owned service object combines the store engine and the persistence
//! manager; callers receive it explicitly instead of reaching for ambient
//! state. All mutating operations persist a fresh snapshot before
//! returning.

use mercura_core::{
    DurableStore, LedgerConfig, LedgerError, LedgerResult, MerchandiseId, SaleId, Timestamp,
};
use mercura_persist::PersistenceManager;
use mercura_store::{
    Filter, Order, Query, Statement, StoreEngine, Value, MERCHANDISE_TABLE, SALES_TABLE,
};
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::records::{Merchandise, Sale, SalesSummary};
use crate::validation;

/// The ledger service: engine state plus its durable bridge.
#[derive(Debug)]
pub struct InventoryLedger<D: DurableStore> {
    engine: RwLock<StoreEngine>,
    persistence: PersistenceManager<D>,
}

impl<D: DurableStore> InventoryLedger<D> {
    /// Load the persisted snapshot into a fresh engine, or initialize and
    /// persist an empty schema if none exists.
    ///
    /// A corrupt snapshot or a startup timeout surfaces here; no partially
    /// initialized service is ever returned.
    pub async fn open(durable: D, config: LedgerConfig) -> LedgerResult<Self> {
        let persistence = PersistenceManager::new(durable, &config);
        let mut engine = StoreEngine::new();

        match persistence.load().await? {
            Some(bytes) => {
                engine.load_snapshot(&bytes)?;
                info!("loaded persisted ledger snapshot");
            }
            None => {
                engine.initialize_schema();
                // A rejected first write is non-fatal, like any other
                // persist failure; the session continues in memory.
                if let Err(e) = persistence.persist(&engine.export_snapshot()?).await {
                    warn!(error = %e, "could not persist fresh schema");
                }
                info!("initialized fresh ledger schema");
            }
        }

        Ok(Self {
            engine: RwLock::new(engine),
            persistence,
        })
    }

    /// Register new merchandise; returns the assigned id.
    ///
    /// On `PersistenceWrite` the registration is already committed in
    /// memory and stays usable for the session; the error is the caller's
    /// signal to warn that the change may not survive a restart.
    pub async fn register_merchandise(
        &self,
        name: &str,
        description: &str,
        price: f64,
        quantity: i64,
    ) -> LedgerResult<MerchandiseId> {
        let trimmed = validation::validate_registration(name, price, quantity)?;
        let registered_at = Timestamp::now();

        let (id, snapshot) = {
            let mut engine = self.engine.write();
            let id = engine.execute(Statement::Insert {
                table: MERCHANDISE_TABLE,
                values: vec![
                    ("name", Value::from(trimmed)),
                    ("description", Value::from(description.trim())),
                    ("price", Value::Real(price)),
                    ("quantity", Value::Integer(quantity)),
                    ("registered_at", Value::from(registered_at.to_rfc3339())),
                ],
            })?;
            (MerchandiseId::new(id), engine.export_snapshot()?)
        };

        info!(%id, "registered merchandise");
        self.persistence.persist(&snapshot).await?;
        Ok(id)
    }

    /// Execute a sale: insert the sale row and decrement stock as one
    /// logical unit, then persist once for the combined change.
    ///
    /// Every precondition is checked before either statement runs, so a
    /// rejected sale leaves both tables unmodified. Requesting exactly the
    /// stock on hand succeeds and leaves stock at 0.
    pub async fn execute_sale(
        &self,
        merchandise_id: MerchandiseId,
        quantity: i64,
    ) -> LedgerResult<Sale> {
        validation::validate_sale_quantity(quantity)?;
        let sold_at = Timestamp::now();

        let outcome = {
            let mut engine = self.engine.write();
            let rows = engine.query_all(Query::by_id(MERCHANDISE_TABLE, merchandise_id.as_u64()))?;
            let row = rows.first().ok_or(LedgerError::NotFound(merchandise_id))?;
            let merchandise = Merchandise::from_row(row)?;

            if quantity > merchandise.quantity {
                return Err(LedgerError::InsufficientStock {
                    requested: quantity,
                    available: merchandise.quantity,
                });
            }
            let total = merchandise.price * quantity as f64;

            // Preconditions hold; from here the insert and the decrement
            // must both land. A failed insert mutates nothing and returns
            // directly; a failed decrement leaves the tables inconsistent
            // and is handled below.
            let sale_id = engine.execute(Statement::Insert {
                table: SALES_TABLE,
                values: vec![
                    ("merchandise_id", Value::Integer(merchandise_id.as_u64() as i64)),
                    ("merchandise_name", Value::from(merchandise.name.clone())),
                    ("quantity", Value::Integer(quantity)),
                    ("unit_price", Value::Real(merchandise.price)),
                    ("total", Value::Real(total)),
                    ("sold_at", Value::from(sold_at.to_rfc3339())),
                ],
            })?;

            match engine.execute(Statement::Update {
                table: MERCHANDISE_TABLE,
                id: merchandise_id.as_u64(),
                set: vec![("quantity", Value::Integer(merchandise.quantity - quantity))],
            }) {
                Ok(_) => {
                    let sale = Sale {
                        id: SaleId::new(sale_id),
                        merchandise_id,
                        merchandise_name: merchandise.name,
                        quantity,
                        unit_price: merchandise.price,
                        total,
                        sold_at,
                    };
                    engine.export_snapshot().map(|snapshot| (sale, snapshot))
                }
                Err(e) => Err(e),
            }
        };

        match outcome {
            Ok((sale, snapshot)) => {
                info!(sale = %sale.id, merchandise = %merchandise_id, quantity, "sale executed");
                self.persistence.persist(&snapshot).await?;
                Ok(sale)
            }
            Err(e) => {
                // The stock decrement failed after the sale row landed.
                // The in-memory store is inconsistent: discard it and
                // reload the last good persisted snapshot.
                warn!(error = %e, "mid-sale statement failure, reloading persisted snapshot");
                self.reload().await?;
                Err(LedgerError::Internal(format!(
                    "sale aborted mid-sequence: {e}"
                )))
            }
        }
    }

    /// All merchandise, newest registration first.
    pub fn list_merchandise(&self) -> LedgerResult<Vec<Merchandise>> {
        let engine = self.engine.read();
        let rows = engine.query_all(Query::all(MERCHANDISE_TABLE, Order::IdDesc))?;
        rows.iter().map(Merchandise::from_row).collect()
    }

    /// Merchandise with stock on hand, alphabetical by name.
    pub fn list_sellable_merchandise(&self) -> LedgerResult<Vec<Merchandise>> {
        let engine = self.engine.read();
        let rows = engine.query_all(Query {
            table: MERCHANDISE_TABLE,
            filter: Filter::ColumnGt("quantity", Value::Integer(0)),
            order: Order::ColumnAsc("name"),
        })?;
        rows.iter().map(Merchandise::from_row).collect()
    }

    /// All sales, newest first.
    pub fn list_sales_history(&self) -> LedgerResult<Vec<Sale>> {
        let engine = self.engine.read();
        let rows = engine.query_all(Query::all(SALES_TABLE, Order::IdDesc))?;
        rows.iter().map(Sale::from_row).collect()
    }

    /// Sale count and accumulated revenue from the stored totals.
    pub fn sales_summary(&self) -> LedgerResult<SalesSummary> {
        let engine = self.engine.read();
        let rows = engine.query_all(Query::all(SALES_TABLE, Order::IdAsc))?;

        let mut total_revenue = 0.0;
        for row in &rows {
            total_revenue += row
                .require("total")?
                .as_real()
                .ok_or_else(|| LedgerError::Internal("unexpected value in column 'total'".into()))?;
        }
        Ok(SalesSummary {
            count: rows.len() as u64,
            total_revenue,
        })
    }

    async fn reload(&self) -> LedgerResult<()> {
        let bytes = self.persistence.load().await?.ok_or_else(|| {
            LedgerError::Internal("no persisted snapshot available to reload".into())
        })?;
        let mut fresh = StoreEngine::new();
        fresh.load_snapshot(&bytes)?;
        *self.engine.write() = fresh;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mercura_persist::{codec, MemoryDurableStore};
    use std::sync::Arc;

    async fn open_ledger() -> InventoryLedger<MemoryDurableStore> {
        InventoryLedger::open(MemoryDurableStore::new(), LedgerConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_fresh_startup_is_empty() {
        let ledger = open_ledger().await;
        assert!(ledger.list_merchandise().unwrap().is_empty());
        assert!(ledger.list_sales_history().unwrap().is_empty());
        let summary = ledger.sales_summary().unwrap();
        assert_eq!(summary.count, 0);
        assert_eq!(summary.total_revenue, 0.0);
    }

    #[tokio::test]
    async fn test_register_and_sell_scenario() {
        let ledger = open_ledger().await;

        let id = ledger
            .register_merchandise("Widget", "", 10.00, 5)
            .await
            .unwrap();
        assert_eq!(id, MerchandiseId::new(1));

        let sellable = ledger.list_sellable_merchandise().unwrap();
        assert_eq!(sellable.len(), 1);
        assert_eq!(sellable[0].id, MerchandiseId::new(1));
        assert_eq!(sellable[0].name, "Widget");
        assert_eq!(sellable[0].quantity, 5);
        assert_eq!(sellable[0].price, 10.00);

        let sale = ledger.execute_sale(id, 3).await.unwrap();
        assert_eq!(sale.total, 30.00);
        assert_eq!(ledger.list_merchandise().unwrap()[0].quantity, 2);

        let err = ledger.execute_sale(id, 3).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientStock {
                requested: 3,
                available: 2
            }
        ));
        assert_eq!(ledger.list_merchandise().unwrap()[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_registration_ids_are_monotonic() {
        let ledger = open_ledger().await;
        let mut previous = 0;
        for name in ["A", "B", "C", "D"] {
            let id = ledger
                .register_merchandise(name, "", 1.0, 1)
                .await
                .unwrap();
            assert!(id.as_u64() > previous);
            previous = id.as_u64();
        }
    }

    #[tokio::test]
    async fn test_invalid_registration_leaves_table_unchanged() {
        let ledger = open_ledger().await;
        for (name, price, quantity) in [
            ("", 1.0, 1),
            ("   ", 1.0, 1),
            ("Widget", 0.0, 1),
            ("Widget", -2.0, 1),
            ("Widget", f64::NAN, 1),
            ("Widget", 1.0, -1),
        ] {
            assert!(ledger
                .register_merchandise(name, "", price, quantity)
                .await
                .is_err());
        }
        assert!(ledger.list_merchandise().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sale_of_entire_stock_leaves_zero() {
        let ledger = open_ledger().await;
        let id = ledger
            .register_merchandise("Widget", "", 4.0, 7)
            .await
            .unwrap();

        let sale = ledger.execute_sale(id, 7).await.unwrap();
        assert_eq!(sale.quantity, 7);
        assert_eq!(ledger.list_merchandise().unwrap()[0].quantity, 0);
        // Sold out means no longer sellable
        assert!(ledger.list_sellable_merchandise().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insufficient_stock_leaves_both_tables_unchanged() {
        let ledger = open_ledger().await;
        let id = ledger
            .register_merchandise("Widget", "", 4.0, 2)
            .await
            .unwrap();

        let err = ledger.execute_sale(id, 3).await.unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientStock { .. }));
        assert_eq!(ledger.list_merchandise().unwrap()[0].quantity, 2);
        assert!(ledger.list_sales_history().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sale_against_unknown_id() {
        let ledger = open_ledger().await;
        let err = ledger
            .execute_sale(MerchandiseId::new(42), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(id) if id == MerchandiseId::new(42)));
    }

    #[tokio::test]
    async fn test_sale_quantity_must_be_positive() {
        let ledger = open_ledger().await;
        let id = ledger
            .register_merchandise("Widget", "", 4.0, 2)
            .await
            .unwrap();
        for quantity in [0, -1] {
            let err = ledger.execute_sale(id, quantity).await.unwrap_err();
            assert!(matches!(err, LedgerError::Validation { .. }));
        }
        assert!(ledger.list_sales_history().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_revenue_accumulates_across_sales() {
        let ledger = open_ledger().await;
        let id = ledger
            .register_merchandise("Widget", "", 4.5, 10)
            .await
            .unwrap();

        ledger.execute_sale(id, 2).await.unwrap();
        ledger.execute_sale(id, 3).await.unwrap();

        assert_eq!(ledger.list_merchandise().unwrap()[0].quantity, 5);
        let summary = ledger.sales_summary().unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total_revenue, 2.0 * 4.5 + 3.0 * 4.5);
    }

    #[tokio::test]
    async fn test_sale_snapshots_name_and_price() {
        let ledger = open_ledger().await;
        let id = ledger
            .register_merchandise("Widget", "first batch", 10.0, 5)
            .await
            .unwrap();

        let sale = ledger.execute_sale(id, 1).await.unwrap();
        assert_eq!(sale.merchandise_id, id);
        assert_eq!(sale.merchandise_name, "Widget");
        assert_eq!(sale.unit_price, 10.0);

        let history = ledger.list_sales_history().unwrap();
        assert_eq!(history, vec![sale]);
    }

    #[tokio::test]
    async fn test_history_is_newest_first() {
        let ledger = open_ledger().await;
        let a = ledger
            .register_merchandise("Anvil", "", 2.0, 9)
            .await
            .unwrap();
        let b = ledger
            .register_merchandise("Mallet", "", 3.0, 9)
            .await
            .unwrap();

        ledger.execute_sale(a, 1).await.unwrap();
        ledger.execute_sale(b, 1).await.unwrap();

        let history = ledger.list_sales_history().unwrap();
        assert_eq!(history[0].merchandise_id, b);
        assert_eq!(history[1].merchandise_id, a);

        // Merchandise listing is newest registration first
        let merchandise = ledger.list_merchandise().unwrap();
        assert_eq!(merchandise[0].id, b);
        assert_eq!(merchandise[1].id, a);
    }

    #[tokio::test]
    async fn test_sellable_is_alphabetical() {
        let ledger = open_ledger().await;
        ledger
            .register_merchandise("Zephyr", "", 1.0, 1)
            .await
            .unwrap();
        ledger
            .register_merchandise("Anvil", "", 1.0, 1)
            .await
            .unwrap();
        ledger
            .register_merchandise("Mallet", "", 1.0, 1)
            .await
            .unwrap();

        let names: Vec<String> = ledger
            .list_sellable_merchandise()
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Anvil", "Mallet", "Zephyr"]);
    }

    #[tokio::test]
    async fn test_persisted_snapshot_survives_reopen() {
        let store = Arc::new(MemoryDurableStore::new());

        let before = {
            let ledger = InventoryLedger::open(store.clone(), LedgerConfig::default())
                .await
                .unwrap();
            ledger
                .register_merchandise("Widget", "boxed", 10.0, 5)
                .await
                .unwrap();
            ledger.execute_sale(MerchandiseId::new(1), 2).await.unwrap();
            ledger.list_merchandise().unwrap()
        };

        let ledger = InventoryLedger::open(store, LedgerConfig::default())
            .await
            .unwrap();
        assert_eq!(ledger.list_merchandise().unwrap(), before);
        assert_eq!(ledger.sales_summary().unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_corrupt_persisted_entry_fails_startup() {
        let store = MemoryDurableStore::new();
        store.seed("inventory_db", "!!! definitely not a snapshot !!!");

        let err = InventoryLedger::open(store, LedgerConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::CorruptSnapshot(_)));
    }

    #[tokio::test]
    async fn test_persist_failure_keeps_memory_state() {
        // Seed an empty-schema snapshot so open() takes the load path, then
        // let the quota reject every later write.
        let mut engine = StoreEngine::new();
        engine.initialize_schema();
        let seeded = codec::encode(&engine.export_snapshot().unwrap());

        let store = MemoryDurableStore::with_quota(0);
        store.seed("inventory_db", &seeded);

        let ledger = InventoryLedger::open(store, LedgerConfig::default())
            .await
            .unwrap();
        let err = ledger
            .register_merchandise("Widget", "", 10.0, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::PersistenceWrite(_)));

        // The mutation is committed in memory and usable for the session
        let merchandise = ledger.list_merchandise().unwrap();
        assert_eq!(merchandise.len(), 1);
        assert_eq!(merchandise[0].name, "Widget");
    }
}
