//! Mercura Core Library
//!
//! Core types, traits, and abstractions for the Mercura inventory and
//! point-of-sale ledger. This crate provides the foundation for all other
//! Mercura components.

pub mod config;
pub mod error;
pub mod escape;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::*;
pub use escape::*;
pub use traits::*;
pub use types::*;
