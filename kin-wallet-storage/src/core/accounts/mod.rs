//! Account store logic
//!
//! Combines two sources of truth for an account: the secure key store, which
//! holds the private key keyed by account id, and the `account_info` file,
//! which holds everything else. Functions here are synchronous and are run
//! on the access lane by `KinFileStorage`.

use std::path::Path;

use crate::core::codec::{self, AccountRecord};
use crate::core::storage::files;
use crate::core::storage::paths::PathResolver;
use crate::domain::entities::{Account, AccountId, KeyPair, PrivateKey};
use crate::infrastructure::platform::SecureKeyStore;
use crate::shared::constants::ACCOUNT_INFO_FILE;
use crate::shared::error::{KeyStoreError, StorageError, StorageResult};
use crate::shared::types::{Quarks, SequenceNumber};

/// Mirror the private key into the key store, then write the metadata file
pub fn add(paths: &PathResolver, key_store: &dyn SecureKeyStore, mut account: Account) -> StorageResult<Account> {
    account.sequence = account.registered_sequence();
    if let Some(private_key) = account.key().private_key() {
        key_store.put(account.id().as_str(), private_key.as_bytes())?;
    }

    let bytes = codec::encode_account(&account)?;
    files::write_atomic(&paths.account_info_file(account.id()), &bytes)?;
    log::debug!("Stored account {}", account.id());
    Ok(account)
}

pub fn read_record(paths: &PathResolver, id: &AccountId) -> StorageResult<Option<AccountRecord>> {
    read_record_file(&paths.account_info_file(id))
}

fn read_record_file(path: &Path) -> StorageResult<Option<AccountRecord>> {
    match files::read_optional(path)? {
        Some(bytes) => codec::decode_account(path, &bytes).map(Some),
        None => Ok(None),
    }
}

/// Key pair rebuilt from the secret held in the key store
pub fn read_stored_key(key_store: &dyn SecureKeyStore, id: &AccountId) -> StorageResult<Option<KeyPair>> {
    let secret = match key_store.get(id.as_str())? {
        Some(secret) => secret,
        None => return Ok(None),
    };

    let key = KeyPair::from_private_key(PrivateKey::from_secret(id.as_str(), &secret)?);
    if key.account_id() != *id {
        return Err(KeyStoreError::invalid_secret(id.as_str(), "secret does not match account id").into());
    }
    Ok(Some(key))
}

/// Merged account view; the stored key takes precedence over the metadata key
pub fn merge(record: Option<AccountRecord>, stored_key: Option<KeyPair>) -> Option<Account> {
    match (record, stored_key) {
        (Some(record), stored_key) => Some(record.into_account(stored_key)),
        (None, Some(key)) => Some(Account::new(key)),
        (None, None) => None,
    }
}

pub fn get(paths: &PathResolver, key_store: &dyn SecureKeyStore, id: &AccountId) -> StorageResult<Option<Account>> {
    let stored_key = read_stored_key(key_store, id)?;
    let record = read_record(paths, id)?;
    Ok(merge(record, stored_key))
}

pub fn update(paths: &PathResolver, key_store: &dyn SecureKeyStore, account: Account) -> StorageResult<Account> {
    let account = match get(paths, key_store, account.id())? {
        Some(stored) => keep_private_key(&stored, account),
        None => account,
    };
    add(paths, key_store, account)
}

// A public-only update never erases a private key already held for the account
fn keep_private_key(stored: &Account, incoming: Account) -> Account {
    if incoming.key().has_private_key() || !stored.key().has_private_key() {
        incoming
    } else {
        incoming.with_key(stored.key().clone())
    }
}

pub fn remove(paths: &PathResolver, key_store: &dyn SecureKeyStore, id: &AccountId) -> StorageResult<()> {
    key_store.delete(id.as_str())?;
    if files::remove_dir_if_exists(&paths.account_dir(id))? {
        log::debug!("Removed account {}", id);
    } else {
        log::debug!("Account {} had no stored files", id);
    }
    Ok(())
}

pub fn advance_sequence(
    paths: &PathResolver,
    key_store: &dyn SecureKeyStore,
    id: &AccountId,
) -> StorageResult<Account> {
    let (mut account, sequence) = require_registered(get(paths, key_store, id)?, id)?;
    account.sequence = Some(
        sequence
            .checked_add(1)
            .ok_or_else(|| StorageError::malformatted(format!("Sequence overflow for {}", id)))?,
    );
    // Already merged with the stored key, so it is written back as is
    add(paths, key_store, account)
}

/// No floor check: negative balances are representable
pub fn deduct_balance(
    paths: &PathResolver,
    key_store: &dyn SecureKeyStore,
    id: &AccountId,
    amount: Quarks,
) -> StorageResult<Account> {
    let (mut account, _) = require_registered(get(paths, key_store, id)?, id)?;
    account.balance = account
        .balance
        .checked_sub(amount)
        .ok_or_else(|| StorageError::malformatted(format!("Balance overflow for {}", id)))?;
    add(paths, key_store, account)
}

fn require_registered(account: Option<Account>, id: &AccountId) -> StorageResult<(Account, SequenceNumber)> {
    let account = account.ok_or_else(|| StorageError::MissingAccount(id.clone()))?;
    let sequence = account
        .registered_sequence()
        .ok_or_else(|| StorageError::UnregisteredAccount(id.clone()))?;
    Ok((account, sequence))
}

/// Best-effort listing; unreadable entries are skipped
pub fn all_ids(paths: &PathResolver) -> StorageResult<Vec<AccountId>> {
    let mut ids = Vec::new();
    for dir in files::list_subdirectories(paths.accounts_dir())? {
        let path = dir.join(ACCOUNT_INFO_FILE);
        match read_record_file(&path) {
            Ok(Some(record)) => ids.push(AccountId::from_public_key(&record.public_key)),
            Ok(None) => log::debug!("No account metadata in {}", dir.display()),
            Err(e) => log::warn!("Skipping unreadable account entry {}: {}", dir.display(), e),
        }
    }
    Ok(ids)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Key store that rejects every call
    pub struct FailingKeyStore;

    impl SecureKeyStore for FailingKeyStore {
        fn put(&self, _key: &str, _secret: &[u8]) -> Result<(), KeyStoreError> {
            Err(KeyStoreError::crypto("vault locked"))
        }

        fn get(&self, _key: &str) -> Result<Option<crate::shared::types::SecretBytes>, KeyStoreError> {
            Err(KeyStoreError::crypto("vault locked"))
        }

        fn delete(&self, _key: &str) -> Result<(), KeyStoreError> {
            Err(KeyStoreError::crypto("vault locked"))
        }
    }

    /// In-memory key store that counts reads
    #[derive(Default)]
    pub struct CountingKeyStore {
        inner: crate::infrastructure::platform::InMemoryKeyStore,
        reads: std::sync::atomic::AtomicUsize,
    }

    impl CountingKeyStore {
        pub fn reads(&self) -> usize {
            self.reads.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    impl SecureKeyStore for CountingKeyStore {
        fn put(&self, key: &str, secret: &[u8]) -> Result<(), KeyStoreError> {
            self.inner.put(key, secret)
        }

        fn get(&self, key: &str) -> Result<Option<crate::shared::types::SecretBytes>, KeyStoreError> {
            self.reads.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.get(key)
        }

        fn delete(&self, key: &str) -> Result<(), KeyStoreError> {
            self.inner.delete(key)
        }
    }
}
