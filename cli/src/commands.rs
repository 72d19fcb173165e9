//! Command handlers for the Mercura CLI
//!
//! Each handler consumes the ledger's boundary functions and prints either
//! an aligned table or JSON. A `PersistenceWrite` error after a committed
//! mutation prints a warning instead of failing: the in-memory state is
//! authoritative for the session.

use mercura_core::{DurableStore, LedgerError, MerchandiseId};
use mercura_ledger::{InventoryLedger, Merchandise, Sale};

pub async fn register<D: DurableStore>(
    ledger: &InventoryLedger<D>,
    name: &str,
    description: &str,
    price: f64,
    quantity: i64,
    json: bool,
) -> anyhow::Result<()> {
    match ledger
        .register_merchandise(name, description, price, quantity)
        .await
    {
        Ok(id) => {
            if json {
                println!("{}", serde_json::json!({ "id": id.as_u64() }));
            } else {
                println!("Registered merchandise with id {id}");
            }
            Ok(())
        }
        Err(e) => mutation_failure(e),
    }
}

pub async fn sell<D: DurableStore>(
    ledger: &InventoryLedger<D>,
    id: MerchandiseId,
    quantity: i64,
    json: bool,
) -> anyhow::Result<()> {
    match ledger.execute_sale(id, quantity).await {
        Ok(sale) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&sale)?);
            } else {
                println!(
                    "Sold {} x {} for a total of ${:.2}",
                    sale.quantity, sale.merchandise_name, sale.total
                );
            }
            Ok(())
        }
        Err(e) => mutation_failure(e),
    }
}

pub fn list<D: DurableStore>(ledger: &InventoryLedger<D>, json: bool) -> anyhow::Result<()> {
    let merchandise = ledger.list_merchandise()?;
    print_merchandise(&merchandise, json)
}

pub fn sellable<D: DurableStore>(ledger: &InventoryLedger<D>, json: bool) -> anyhow::Result<()> {
    let merchandise = ledger.list_sellable_merchandise()?;
    print_merchandise(&merchandise, json)
}

pub fn history<D: DurableStore>(ledger: &InventoryLedger<D>, json: bool) -> anyhow::Result<()> {
    let sales = ledger.list_sales_history()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&sales)?);
        return Ok(());
    }
    if sales.is_empty() {
        println!("No sales recorded.");
        return Ok(());
    }
    println!(
        "{:<6} {:<24} {:>8} {:>10} {:>10}  {}",
        "Id", "Merchandise", "Qty", "Unit", "Total", "Sold at"
    );
    for sale in &sales {
        print_sale(sale);
    }
    Ok(())
}

pub fn summary<D: DurableStore>(ledger: &InventoryLedger<D>, json: bool) -> anyhow::Result<()> {
    let summary = ledger.sales_summary()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Sales:         {}", summary.count);
        println!("Total revenue: ${:.2}", summary.total_revenue);
    }
    Ok(())
}

fn print_merchandise(merchandise: &[Merchandise], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(merchandise)?);
        return Ok(());
    }
    if merchandise.is_empty() {
        println!("No merchandise registered.");
        return Ok(());
    }
    println!(
        "{:<6} {:<24} {:>10} {:>6}  {}",
        "Id", "Name", "Price", "Stock", "Registered"
    );
    for item in merchandise {
        println!(
            "{:<6} {:<24} {:>10} {:>6}  {}",
            item.id,
            item.name,
            format!("${:.2}", item.price),
            item.quantity,
            item.registered_at
        );
    }
    Ok(())
}

fn print_sale(sale: &Sale) {
    println!(
        "{:<6} {:<24} {:>8} {:>10} {:>10}  {}",
        sale.id,
        sale.merchandise_name,
        sale.quantity,
        format!("${:.2}", sale.unit_price),
        format!("${:.2}", sale.total),
        sale.sold_at
    );
}

/// Report a failed mutating operation.
///
/// Validation and business-rule errors print inline and exit non-zero. A
/// rejected durable write is a warning: the mutation is committed in memory
/// and the session stays usable, but it may not survive a restart.
fn mutation_failure(e: LedgerError) -> anyhow::Result<()> {
    match e {
        LedgerError::PersistenceWrite(reason) => {
            eprintln!("Warning: change saved in memory, but the durable write was rejected: {reason}");
            eprintln!("It may not survive a restart.");
            Ok(())
        }
        e if e.is_user_error() => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        e => Err(e.into()),
    }
}
