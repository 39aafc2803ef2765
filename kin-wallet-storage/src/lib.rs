//! Kin Wallet Storage
//!
//! Local persistence for Kin wallet accounts, transaction history and
//! invoices, built on the filesystem and a platform secret store.
//!
//! ## Architecture
//!
//! - **Core**: record codec, file storage with its single access lane, store logic
//! - **Domain**: entities and repository traits
//! - **Infrastructure**: secure key stores and process-wide settings
//! - **Shared**: errors, configuration, constants and utilities
//!
//! ## Security Features
//!
//! - Private keys live only in the secure key store, never in account files
//! - Key material is zeroized on drop and redacted from debug output
//! - Atomic file replacement with 0600 permissions
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kin_wallet_storage::{
//!     Account, InMemoryKeyStore, InMemorySettingsStore, KeyPair, KinFileStorage, StorageConfig,
//! };
//!
//! # async fn run() -> Result<(), kin_wallet_storage::StorageError> {
//! let config = StorageConfig::from_env();
//! let storage = KinFileStorage::open(
//!     &config,
//!     Arc::new(InMemoryKeyStore::new()),
//!     Arc::new(InMemorySettingsStore::new()),
//! )?;
//!
//! let account = storage.add_account(Account::new(KeyPair::generate())).await?;
//! let stored = storage.get_account(account.id()).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export specific components
pub use core::storage::paths::PathResolver;
pub use core::storage::KinFileStorage;

// Re-export domain entities and repositories
pub use domain::entities::{
    Account, AccountId, AccountStatus, Invoice, InvoiceList, InvoiceListId, KeyPair, LineItem,
    PagingToken, PrivateKey, PublicKey, RecordType, TransactionHash, TransactionRecord,
    TransactionSet,
};
pub use domain::repositories::{AccountRepository, InvoiceRepository, TransactionRepository};

// Re-export infrastructure
pub use infrastructure::platform::{EncryptedFileKeyStore, InMemoryKeyStore, KdfParams, SecureKeyStore};
pub use infrastructure::settings::{FileSettingsStore, InMemorySettingsStore, SettingsStore};

// Re-export shared types
pub use shared::config::StorageConfig;
pub use shared::error::{KeyStoreError, StorageError, StorageResult};
pub use shared::types::{Network, Quarks, SequenceNumber};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize logging; safe to call more than once
pub fn init() {
    if env_logger::try_init().is_ok() {
        log::debug!("{} {} logging initialized", NAME, VERSION);
    }
}

/// Open storage from the environment with the encrypted file key store
///
/// The key store password comes from `KIN_KEYSTORE_PASSWORD` or a terminal prompt.
pub fn open_from_env() -> StorageResult<KinFileStorage> {
    let config = StorageConfig::from_env();
    let key_store = EncryptedFileKeyStore::from_env(&config.key_store_dir)?;
    let settings = FileSettingsStore::new(&config.settings_path);
    KinFileStorage::open(&config, Arc::new(key_store), Arc::new(settings))
}
