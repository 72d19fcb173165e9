//! Mercura Ledger
//!
//! The domain operations over the merchandise and sales tables: register
//! merchandise, execute a sale (insert plus stock decrement as one logical
//! unit), and the read-only listings the presentation layer consumes.

pub mod records;
pub mod service;
pub mod validation;

pub use records::*;
pub use service::*;
pub use validation::*;
