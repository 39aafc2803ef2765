//! Account repository
//!
//! Account metadata persistence merged with the secure key store.

use async_trait::async_trait;

use crate::core::storage::KinFileStorage;
use crate::domain::entities::{Account, AccountId};
use crate::shared::error::StorageResult;
use crate::shared::types::Quarks;

/// Account repository trait
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Persist a new account, mirroring its private key into the key store
    async fn add_account(&self, account: Account) -> StorageResult<Account>;

    /// Merged view of the key store and the metadata file; `None` when neither knows the id
    async fn get_account(&self, id: &AccountId) -> StorageResult<Option<Account>>;

    /// Read-merge-write that never drops a stored private key
    async fn update_account(&self, account: Account) -> StorageResult<Account>;

    /// Remove the key store entry and the account directory
    async fn remove_account(&self, id: &AccountId) -> StorageResult<()>;

    /// Increment the sequence number of a registered account by one
    async fn advance_sequence(&self, id: &AccountId) -> StorageResult<Account>;

    /// Subtract `amount` from the balance of a registered account
    async fn deduct_from_account_balance(&self, id: &AccountId, amount: Quarks) -> StorageResult<Account>;

    /// Ids of every readable account in storage
    async fn get_all_account_ids(&self) -> StorageResult<Vec<AccountId>>;
}

#[async_trait]
impl AccountRepository for KinFileStorage {
    async fn add_account(&self, account: Account) -> StorageResult<Account> {
        KinFileStorage::add_account(self, account).await
    }
    async fn get_account(&self, id: &AccountId) -> StorageResult<Option<Account>> {
        KinFileStorage::get_account(self, id).await
    }
    async fn update_account(&self, account: Account) -> StorageResult<Account> {
        KinFileStorage::update_account(self, account).await
    }
    async fn remove_account(&self, id: &AccountId) -> StorageResult<()> {
        KinFileStorage::remove_account(self, id).await
    }
    async fn advance_sequence(&self, id: &AccountId) -> StorageResult<Account> {
        KinFileStorage::advance_sequence(self, id).await
    }
    async fn deduct_from_account_balance(&self, id: &AccountId, amount: Quarks) -> StorageResult<Account> {
        KinFileStorage::deduct_from_account_balance(self, id, amount).await
    }
    async fn get_all_account_ids(&self) -> StorageResult<Vec<AccountId>> {
        KinFileStorage::get_all_account_ids(self).await
    }
}
