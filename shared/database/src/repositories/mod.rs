//! Repository module for database CRUD operations
//!
//! Provides typed repository implementations for the chemical ledger.

pub mod chemical;
pub mod movement;

pub use chemical::ChemicalRepository;
pub use movement::MovementRepository;
