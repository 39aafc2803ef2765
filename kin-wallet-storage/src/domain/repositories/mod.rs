//! Domain repositories
//!
//! Repository traits for account, transaction and invoice persistence.

pub mod account_repository;
pub mod invoice_repository;
pub mod transaction_repository;

// Re-export repositories
pub use account_repository::*;
pub use invoice_repository::*;
pub use transaction_repository::*;
