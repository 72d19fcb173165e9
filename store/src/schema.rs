//! Table schemas for the ledger
//!
//! The engine owns exactly two tables. Their shapes are fixed here;
//! `sales.merchandise_id` references `merchandise.id` by application-level
//! convention (no deletes exist, so no cascade is needed).

use crate::value::Value;

/// Name of the merchandise table
pub const MERCHANDISE_TABLE: &str = "merchandise";

/// Name of the sales table
pub const SALES_TABLE: &str = "sales";

/// Declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    /// Whether `value` may be stored in a column of this type.
    /// Integers are accepted into real columns.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ColumnType::Integer, Value::Integer(_))
                | (ColumnType::Real, Value::Real(_))
                | (ColumnType::Real, Value::Integer(_))
                | (ColumnType::Text, Value::Text(_))
        )
    }
}

/// A column definition
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    /// Required columns reject Null and must be provided on insert
    pub required: bool,
}

impl ColumnDef {
    pub fn required(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            required: true,
        }
    }

    pub fn optional(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            required: false,
        }
    }
}

/// Shape of one table. Every table additionally carries an implicit
/// auto-assigned `id` column managed by the engine.
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

/// Schema of the merchandise table
pub fn merchandise_schema() -> TableSchema {
    TableSchema {
        name: MERCHANDISE_TABLE,
        columns: vec![
            ColumnDef::required("name", ColumnType::Text),
            ColumnDef::optional("description", ColumnType::Text),
            ColumnDef::required("price", ColumnType::Real),
            ColumnDef::required("quantity", ColumnType::Integer),
            ColumnDef::required("registered_at", ColumnType::Text),
        ],
    }
}

/// Schema of the sales table. Name and unit price are denormalized
/// snapshots so history stays accurate if merchandise is ever edited.
pub fn sales_schema() -> TableSchema {
    TableSchema {
        name: SALES_TABLE,
        columns: vec![
            ColumnDef::required("merchandise_id", ColumnType::Integer),
            ColumnDef::required("merchandise_name", ColumnType::Text),
            ColumnDef::required("quantity", ColumnType::Integer),
            ColumnDef::required("unit_price", ColumnType::Real),
            ColumnDef::required("total", ColumnType::Real),
            ColumnDef::required("sold_at", ColumnType::Text),
        ],
    }
}
