//! Transaction repository
//!
//! Per-account transaction history with paging-token bookkeeping and
//! hash-based deduplication.

use async_trait::async_trait;

use crate::core::storage::KinFileStorage;
use crate::domain::entities::{AccountId, TransactionRecord, TransactionSet};
use crate::shared::error::StorageResult;

/// Transaction repository trait
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Replace the stored history with `items`
    async fn store_transactions(&self, id: &AccountId, items: Vec<TransactionRecord>) -> StorageResult<TransactionSet>;

    /// Stored history, `None` when nothing was stored yet
    async fn get_stored_transactions(&self, id: &AccountId) -> StorageResult<Option<TransactionSet>>;

    /// Append one record to the stored history
    async fn insert_new_transaction(&self, id: &AccountId, transaction: TransactionRecord) -> StorageResult<TransactionSet>;

    /// Place fresher records before the stored ones, replacing duplicates
    async fn upsert_new_transactions(&self, id: &AccountId, items: Vec<TransactionRecord>) -> StorageResult<TransactionSet>;

    /// Place older records after the stored ones, replacing duplicates
    async fn upsert_old_transactions(&self, id: &AccountId, items: Vec<TransactionRecord>) -> StorageResult<TransactionSet>;
}

#[async_trait]
impl TransactionRepository for KinFileStorage {
    async fn store_transactions(&self, id: &AccountId, items: Vec<TransactionRecord>) -> StorageResult<TransactionSet> {
        KinFileStorage::store_transactions(self, id, items).await
    }
    async fn get_stored_transactions(&self, id: &AccountId) -> StorageResult<Option<TransactionSet>> {
        KinFileStorage::get_stored_transactions(self, id).await
    }
    async fn insert_new_transaction(&self, id: &AccountId, transaction: TransactionRecord) -> StorageResult<TransactionSet> {
        KinFileStorage::insert_new_transaction(self, id, transaction).await
    }
    async fn upsert_new_transactions(&self, id: &AccountId, items: Vec<TransactionRecord>) -> StorageResult<TransactionSet> {
        KinFileStorage::upsert_new_transactions(self, id, items).await
    }
    async fn upsert_old_transactions(&self, id: &AccountId, items: Vec<TransactionRecord>) -> StorageResult<TransactionSet> {
        KinFileStorage::upsert_old_transactions(self, id, items).await
    }
}
