//! Infrastructure layer - platform integrations
//!
//! Secure key stores and process-wide settings used by the storage layer.

pub mod platform;
pub mod settings;

// Re-export infrastructure components
pub use platform::*;
pub use settings::*;
