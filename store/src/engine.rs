//! The store engine: two tables, parameterized statements, full-result
//! queries.
//!
//! Statement execution validates everything before touching table state, so
//! a failed statement never leaves a table half-mutated. The environment has
//! no native transaction isolation; callers sequencing several statements
//! rely on that property to simulate atomicity.

use mercura_core::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::schema::{merchandise_schema, sales_schema, TableSchema};
use crate::value::Value;

/// One stored row: engine-assigned id plus values in schema column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRow {
    pub id: u64,
    pub values: Vec<Value>,
}

/// A query result row with column-name lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: u64,
    columns: Vec<&'static str>,
    values: Vec<Value>,
}

impl Row {
    pub fn get(&self, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| *c == column)?;
        self.values.get(idx)
    }

    /// Column-name lookup that fails with an internal error instead of
    /// returning an option; used when the schema guarantees presence.
    pub fn require(&self, column: &str) -> LedgerResult<&Value> {
        self.get(column)
            .ok_or_else(|| LedgerError::Internal(format!("row missing column '{column}'")))
    }
}

/// A parameterized mutating statement.
#[derive(Debug, Clone)]
pub enum Statement {
    /// Insert one row; the engine assigns the id. Missing optional columns
    /// are stored as Null.
    Insert {
        table: &'static str,
        values: Vec<(&'static str, Value)>,
    },
    /// Assign new values to columns of the row with the given id.
    Update {
        table: &'static str,
        id: u64,
        set: Vec<(&'static str, Value)>,
    },
}

/// Row filter for queries.
#[derive(Debug, Clone)]
pub enum Filter {
    All,
    ById(u64),
    /// Numeric comparison: keep rows where `column > value`.
    ColumnGt(&'static str, Value),
}

/// Result ordering. `IdAsc` is insertion order; ids are monotonic, so
/// `IdDesc` is newest-first.
#[derive(Debug, Clone)]
pub enum Order {
    IdAsc,
    IdDesc,
    ColumnAsc(&'static str),
}

/// A read-only query over one table.
#[derive(Debug, Clone)]
pub struct Query {
    pub table: &'static str,
    pub filter: Filter,
    pub order: Order,
}

impl Query {
    pub fn all(table: &'static str, order: Order) -> Self {
        Self {
            table,
            filter: Filter::All,
            order,
        }
    }

    pub fn by_id(table: &'static str, id: u64) -> Self {
        Self {
            table,
            filter: Filter::ById(id),
            order: Order::IdAsc,
        }
    }
}

/// One table: fixed schema, monotonic id counter, rows in insertion order.
#[derive(Debug, Clone)]
pub(crate) struct Table {
    pub(crate) schema: TableSchema,
    pub(crate) next_id: u64,
    pub(crate) rows: Vec<StoredRow>,
}

impl Table {
    fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            next_id: 1,
            rows: Vec::new(),
        }
    }

    fn find(&self, id: u64) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }
}

/// The embedded relational store.
///
/// Owns exactly the `merchandise` and `sales` tables once
/// [`initialize_schema`](StoreEngine::initialize_schema) or a snapshot load
/// has run.
#[derive(Debug, Clone, Default)]
pub struct StoreEngine {
    pub(crate) tables: BTreeMap<String, Table>,
}

impl StoreEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create both ledger tables if absent. Idempotent; existing rows are
    /// untouched.
    pub fn initialize_schema(&mut self) {
        for schema in [merchandise_schema(), sales_schema()] {
            self.tables
                .entry(schema.name.to_string())
                .or_insert_with(|| Table::new(schema));
        }
    }

    fn table(&self, name: &str) -> LedgerResult<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| LedgerError::Statement(format!("no such table: {name}")))
    }

    fn table_mut(&mut self, name: &str) -> LedgerResult<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| LedgerError::Statement(format!("no such table: {name}")))
    }

    /// Run a mutating statement. Returns the new row id for inserts and the
    /// affected row count for updates.
    pub fn execute(&mut self, statement: Statement) -> LedgerResult<u64> {
        match statement {
            Statement::Insert { table, values } => self.insert(table, values),
            Statement::Update { table, id, set } => self.update(table, id, set),
        }
    }

    fn insert(&mut self, name: &str, values: Vec<(&'static str, Value)>) -> LedgerResult<u64> {
        let table = self.table_mut(name)?;

        // Resolve every provided value against the schema before building
        // the row.
        for (i, (column, value)) in values.iter().enumerate() {
            let def = table.schema.column(column).ok_or_else(|| {
                LedgerError::Statement(format!("no column '{column}' in table {name}"))
            })?;
            check_assignable(name, def, value)?;
            if values[..i].iter().any(|(c, _)| c == column) {
                return Err(LedgerError::Statement(format!(
                    "column '{column}' bound more than once"
                )));
            }
        }

        let mut row_values = Vec::with_capacity(table.schema.columns.len());
        for def in &table.schema.columns {
            match values.iter().find(|(c, _)| *c == def.name) {
                Some((_, v)) => row_values.push(v.clone()),
                None if def.required => {
                    return Err(LedgerError::Statement(format!(
                        "required column '{}' missing in insert into {name}",
                        def.name
                    )))
                }
                None => row_values.push(Value::Null),
            }
        }

        let id = table.next_id;
        table.next_id += 1;
        table.rows.push(StoredRow {
            id,
            values: row_values,
        });
        tracing::debug!(table = name, id, "inserted row");
        Ok(id)
    }

    fn update(
        &mut self,
        name: &str,
        id: u64,
        set: Vec<(&'static str, Value)>,
    ) -> LedgerResult<u64> {
        let table = self.table_mut(name)?;
        let idx = table
            .find(id)
            .ok_or_else(|| LedgerError::Statement(format!("no row {id} in table {name}")))?;

        // Validate all assignments first; apply only once everything passed.
        let mut resolved = Vec::with_capacity(set.len());
        for (column, value) in set {
            let pos = table.schema.column_index(column).ok_or_else(|| {
                LedgerError::Statement(format!("no column '{column}' in table {name}"))
            })?;
            check_assignable(name, &table.schema.columns[pos], &value)?;
            resolved.push((pos, value));
        }

        for (pos, value) in resolved {
            table.rows[idx].values[pos] = value;
        }
        tracing::debug!(table = name, id, "updated row");
        Ok(1)
    }

    /// Run a read-only query. An empty result is an empty vec, never an
    /// error.
    pub fn query_all(&self, query: Query) -> LedgerResult<Vec<Row>> {
        let table = self.table(query.table)?;

        let mut selected: Vec<&StoredRow> = Vec::new();
        for row in &table.rows {
            let keep = match &query.filter {
                Filter::All => true,
                Filter::ById(id) => row.id == *id,
                Filter::ColumnGt(column, bound) => {
                    let pos = table.schema.column_index(column).ok_or_else(|| {
                        LedgerError::Statement(format!(
                            "no column '{column}' in table {}",
                            query.table
                        ))
                    })?;
                    match (row.values[pos].as_real(), bound.as_real()) {
                        (Some(cell), Some(bound)) => cell > bound,
                        _ => false,
                    }
                }
            };
            if keep {
                selected.push(row);
            }
        }

        match &query.order {
            Order::IdAsc => {}
            Order::IdDesc => selected.reverse(),
            Order::ColumnAsc(column) => {
                let pos = table.schema.column_index(column).ok_or_else(|| {
                    LedgerError::Statement(format!(
                        "no column '{column}' in table {}",
                        query.table
                    ))
                })?;
                selected.sort_by(|a, b| a.values[pos].compare(&b.values[pos]));
            }
        }

        let columns: Vec<&'static str> = table.schema.columns.iter().map(|c| c.name).collect();
        Ok(selected
            .into_iter()
            .map(|row| Row {
                id: row.id,
                columns: columns.clone(),
                values: row.values.clone(),
            })
            .collect())
    }

    /// Number of rows currently in `table`.
    pub fn row_count(&self, table: &str) -> LedgerResult<usize> {
        Ok(self.table(table)?.rows.len())
    }
}

fn check_assignable(
    table: &str,
    def: &crate::schema::ColumnDef,
    value: &Value,
) -> LedgerResult<()> {
    if value.is_null() {
        if def.required {
            return Err(LedgerError::Statement(format!(
                "column '{}' in table {table} is required",
                def.name
            )));
        }
        return Ok(());
    }
    if !def.ty.accepts(value) {
        return Err(LedgerError::Statement(format!(
            "type mismatch for column '{}' in table {table}: got {}",
            def.name,
            value.type_name()
        )));
    }
    Ok(())
}
