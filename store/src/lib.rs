//! Mercura Store Engine
//!
//! An embedded in-memory relational store owning the two ledger tables.
//! Provides schema definition, parameterized statement execution, ordered
//! full-result queries, and whole-store snapshot export/load.

pub mod engine;
pub mod schema;
pub mod snapshot;
pub mod value;

pub use engine::*;
pub use schema::*;
pub use snapshot::*;
pub use value::*;
