//! Input validation for the ledger operations
//!
//! Validation failures carry the offending field and never touch the store.

use mercura_core::{LedgerError, LedgerResult};

/// Validate registration input. Returns the trimmed name.
pub fn validate_registration(name: &str, price: f64, quantity: i64) -> LedgerResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::validation("name", "must not be empty"));
    }
    if !price.is_finite() || price <= 0.0 {
        return Err(LedgerError::validation(
            "price",
            "must be a finite number greater than 0",
        ));
    }
    if quantity < 0 {
        return Err(LedgerError::validation("quantity", "must be 0 or greater"));
    }
    Ok(trimmed.to_string())
}

/// Validate the quantity requested for a sale. Stock availability is
/// checked separately against the live row.
pub fn validate_sale_quantity(quantity: i64) -> LedgerResult<()> {
    if quantity <= 0 {
        return Err(LedgerError::validation("quantity", "must be greater than 0"));
    }
    Ok(())
}
