//! Core types for Mercura
//!
//! Defines fundamental data structures used across the system.

use chrono::{DateTime, Duration, DurationRound, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a merchandise record, assigned by the store engine.
/// Monotonic within a table and preserved across snapshot round-trips.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MerchandiseId(pub u64);

impl MerchandiseId {
    pub fn new(value: u64) -> Self {
        MerchandiseId(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MerchandiseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for MerchandiseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MerchandiseId({})", self.0)
    }
}

/// Identity of a sale record, assigned by the store engine.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SaleId(pub u64);

impl SaleId {
    pub fn new(value: u64) -> Self {
        SaleId(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for SaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SaleId({})", self.0)
    }
}

/// UTC timestamp rendered as ISO-8601 (RFC 3339) text.
///
/// Assigned once at record creation and immutable afterwards; the textual
/// form is what the store engine persists.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    /// Current time, truncated to millisecond precision so a value always
    /// round-trips exactly through its textual form.
    pub fn now() -> Self {
        let now = Utc::now();
        Timestamp(now.duration_trunc(Duration::milliseconds(1)).unwrap_or(now))
    }

    /// Parse from RFC 3339 text, as stored in the `registered_at` and
    /// `sold_at` columns.
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        Ok(Timestamp(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc)))
    }

    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(MerchandiseId::new(7).to_string(), "7");
        assert_eq!(SaleId::new(3).to_string(), "3");
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let ts = Timestamp::now();
        let text = ts.to_rfc3339();
        let parsed = Timestamp::parse(&text).unwrap();
        assert_eq!(parsed.to_rfc3339(), text);
    }

    #[test]
    fn test_timestamp_rejects_garbage() {
        assert!(Timestamp::parse("not a date").is_err());
    }
}
