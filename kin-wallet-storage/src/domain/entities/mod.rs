//! Domain entities and value objects
//!
//! This module contains the entities persisted by the storage layer.

pub mod account;
pub mod invoice;
pub mod transaction;

// Re-export entities
pub use account::*;
pub use invoice::*;
pub use transaction::*;
