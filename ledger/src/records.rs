//! Domain records read out of the store engine

use mercura_core::{LedgerError, LedgerResult, MerchandiseId, SaleId, Timestamp};
use mercura_store::Row;
use serde::{Deserialize, Serialize};

/// One merchandise record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merchandise {
    pub id: MerchandiseId,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Quantity on hand; never negative
    pub quantity: i64,
    pub registered_at: Timestamp,
}

impl Merchandise {
    pub(crate) fn from_row(row: &Row) -> LedgerResult<Self> {
        Ok(Self {
            id: MerchandiseId::new(row.id),
            name: text(row, "name")?,
            description: match row.require("description")?.as_text() {
                Some(s) => s.to_string(),
                None => String::new(),
            },
            price: real(row, "price")?,
            quantity: integer(row, "quantity")?,
            registered_at: timestamp(row, "registered_at")?,
        })
    }
}

/// One sale record. Name and unit price are snapshots taken at sale time;
/// they do not follow later merchandise edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub merchandise_id: MerchandiseId,
    pub merchandise_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    /// quantity × unit_price, computed once at sale time and stored
    pub total: f64,
    pub sold_at: Timestamp,
}

impl Sale {
    pub(crate) fn from_row(row: &Row) -> LedgerResult<Self> {
        Ok(Self {
            id: SaleId::new(row.id),
            merchandise_id: MerchandiseId::new(integer(row, "merchandise_id")? as u64),
            merchandise_name: text(row, "merchandise_name")?,
            quantity: integer(row, "quantity")?,
            unit_price: real(row, "unit_price")?,
            total: real(row, "total")?,
            sold_at: timestamp(row, "sold_at")?,
        })
    }
}

/// Aggregate view over the whole sales history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub count: u64,
    pub total_revenue: f64,
}

fn text(row: &Row, column: &str) -> LedgerResult<String> {
    row.require(column)?
        .as_text()
        .map(str::to_string)
        .ok_or_else(|| decode_error(column))
}

fn real(row: &Row, column: &str) -> LedgerResult<f64> {
    row.require(column)?
        .as_real()
        .ok_or_else(|| decode_error(column))
}

fn integer(row: &Row, column: &str) -> LedgerResult<i64> {
    row.require(column)?
        .as_integer()
        .ok_or_else(|| decode_error(column))
}

fn timestamp(row: &Row, column: &str) -> LedgerResult<Timestamp> {
    let raw = text(row, column)?;
    Timestamp::parse(&raw).map_err(|_| decode_error(column))
}

fn decode_error(column: &str) -> LedgerError {
    LedgerError::Internal(format!("unexpected value in column '{column}'"))
}
