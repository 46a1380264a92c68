//! # Bionexa Core Domain Models
//!
//! Domain models for the Bionexa laboratory chemical inventory.
//!
//! ## Key Models
//!
//! - **Chemical**: one physical lot, keyed by article and batch number, with its
//!   stock status and client test annotations
//! - **Movement**: immutable receive/dispatch audit record for a lot
//! - **ExpiryStatus** / **ExpiryPolicy**: expiry classification relative to a date
//! - **InventoryRow** / **InventorySummary**: derived dashboard views
//!
//! Enum-like fields are closed types; their `FromStr` impls reject unknown
//! strings with [`UnknownVariant`].

use thiserror::Error;

pub mod chemical;
pub mod movement;
pub mod expiry;
pub mod stock;
pub mod dashboard;

#[cfg(test)]
mod property_tests;

pub use chemical::*;
pub use movement::*;
pub use expiry::*;
pub use stock::*;
pub use dashboard::*;

/// A stored string that does not name any variant of a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized {field} value: {value:?}")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}
