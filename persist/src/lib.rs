//! Mercura Persistence
//!
//! The bridge between the volatile store engine and durable storage: a
//! text-safe snapshot codec, string-keyed durable backends, and the
//! persistence manager owning the load-at-startup / persist-after-mutate
//! lifecycle.

pub mod codec;
pub mod durable;
pub mod manager;

pub use codec::*;
pub use durable::*;
pub use manager::*;
