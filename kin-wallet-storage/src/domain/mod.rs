//! Domain layer - entities and repositories
//!
//! This module contains the persisted entities and the repository traits the
//! storage backends implement.

pub mod entities;
pub mod repositories;

// Re-export domain components
pub use entities::*;
pub use repositories::*;
