//! Error handling for the storage layer
//!
//! Filesystem and key store failures are passed through unchanged; the
//! remaining variants are raised by the storage layer itself when it detects
//! a precondition violation.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::entities::AccountId;

/// Storage error type
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Unknown storage error: {0}")]
    Unknown(String),

    #[error("Malformatted input: {0}")]
    MalformattedInput(String),

    #[error("Account not found: {0}")]
    MissingAccount(AccountId),

    #[error("Account is not registered: {0}")]
    UnregisteredAccount(AccountId),

    #[error("Corrupt record at {path}: {reason}")]
    CorruptRecord { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),
}

impl StorageError {
    /// Create an unknown (internal) error
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown(message.into())
    }

    /// Create a malformatted input error
    pub fn malformatted(message: impl Into<String>) -> Self {
        Self::MalformattedInput(message.into())
    }

    /// Create a corrupt record error for the file at `path`
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptRecord {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn is_missing_account(&self) -> bool {
        matches!(self, Self::MissingAccount(_))
    }

    pub fn is_unregistered_account(&self) -> bool {
        matches!(self, Self::UnregisteredAccount(_))
    }
}

/// Errors reported by a secure key store implementation
#[derive(Error, Debug)]
pub enum KeyStoreError {
    #[error("Key store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Key store cryptographic error: {0}")]
    Crypto(String),

    #[error("Key store password error: {0}")]
    Password(String),

    #[error("Invalid secret for {key}: {reason}")]
    InvalidSecret { key: String, reason: String },
}

impl KeyStoreError {
    /// Create a cryptographic error
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto(message.into())
    }

    /// Create a password error
    pub fn password(message: impl Into<String>) -> Self {
        Self::Password(message.into())
    }

    /// Create an invalid secret error
    pub fn invalid_secret(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSecret {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

impl From<argon2::password_hash::Error> for KeyStoreError {
    fn from(err: argon2::password_hash::Error) -> Self {
        Self::crypto(format!("Password hash error: {}", err))
    }
}

impl From<argon2::Error> for KeyStoreError {
    fn from(err: argon2::Error) -> Self {
        Self::crypto(format!("Argon2 error: {}", err))
    }
}

impl From<aes_gcm::Error> for KeyStoreError {
    fn from(err: aes_gcm::Error) -> Self {
        Self::crypto(format!("AES-GCM error: {}", err))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformatted(format!("JSON error: {}", err))
    }
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::unknown(format!("Task join error: {}", err))
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
